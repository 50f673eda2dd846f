//! Cell perturbation
//!
//! The mutation applied to each planned table column: bold numeric cells
//! are multiplied by a factor drawn from a Gaussian distribution and
//! rounded back to the column's precision, italic cells are cleared, and
//! the consumed font flags are removed so a second run leaves the output
//! untouched.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::{PipelineError, PipelineResult};
use tablewash_core::{CellRange, CellValue, Worksheet};

/// A Gaussian distribution of multiplicative factors
#[derive(Debug, Clone, Copy)]
pub struct GaussianFactor {
    dist: Normal<f64>,
}

impl GaussianFactor {
    /// Create a factor distribution with the given mean and standard deviation
    ///
    /// A standard deviation of zero is valid and always yields the mean.
    pub fn new(mean: f64, std_dev: f64) -> PipelineResult<Self> {
        let dist = Normal::new(mean, std_dev)
            .map_err(|e| PipelineError::Factor(format!("mean {}, std dev {}: {}", mean, std_dev, e)))?;
        Ok(Self { dist })
    }

    /// Draw a factor
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng)
    }
}

/// Counts of cells changed by a perturbation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerturbStats {
    /// Bold numeric cells that were scaled
    pub scaled: usize,
    /// Italic cells that were cleared
    pub cleared: usize,
}

impl PerturbStats {
    /// Merge another pass's counts into this one
    pub fn merge(&mut self, other: PerturbStats) {
        self.scaled += other.scaled;
        self.cleared += other.cleared;
    }
}

/// The largest number of decimal places any value displays with
///
/// Precision is taken from the shortest decimal rendering of each value,
/// so `[1.5, 2.25, 3.0]` has two decimal places.
pub fn max_decimal_places(values: &[f64]) -> u32 {
    values
        .iter()
        .map(|v| {
            let s = v.to_string();
            match s.find('.') {
                Some(pos) => (s.len() - pos - 1) as u32,
                None => 0,
            }
        })
        .max()
        .unwrap_or(0)
}

/// Perturb one column range of a worksheet
///
/// Scaled values are rounded to the precision of the column as a whole,
/// measured before any cell is changed. Bold and italic are judged from
/// each cell's original font, so a cell that is both bold and italic is
/// scaled and then cleared, and ends up with neither flag.
pub fn perturb_column<R: Rng + ?Sized>(
    sheet: &mut Worksheet,
    range: CellRange,
    factor: &GaussianFactor,
    rng: &mut R,
) -> PipelineResult<PerturbStats> {
    // First pass: the column's display precision
    let numeric: Vec<f64> = range
        .cells()
        .filter_map(|addr| match sheet.cell_value(addr) {
            CellValue::Number(n) => Some(n),
            _ => None,
        })
        .collect();
    let places = max_decimal_places(&numeric);

    let mut stats = PerturbStats::default();

    for addr in range.cells() {
        let style = sheet.cell_style(addr);
        let was_bold = style.font.bold;
        let was_italic = style.font.italic;
        if !was_bold && !was_italic {
            continue;
        }

        let mut new_style = style;
        let mut font_changed = false;

        if was_bold {
            if let CellValue::Number(n) = sheet.cell_value(addr) {
                match scale_value(n, factor.sample(rng), places) {
                    Some(scaled) => {
                        sheet.set_cell_value(addr, scaled)?;
                        new_style.font.bold = false;
                        font_changed = true;
                        stats.scaled += 1;
                    }
                    None => {
                        log::warn!(
                            "cell {} on '{}' exceeds decimal precision, leaving unchanged",
                            addr,
                            sheet.name()
                        );
                    }
                }
            }
        }

        if was_italic {
            sheet.set_cell_value(addr, CellValue::Empty)?;
            new_style.font.italic = false;
            font_changed = true;
            stats.cleared += 1;
        }

        if font_changed {
            sheet.set_cell_style(addr, &new_style)?;
        }
    }

    Ok(stats)
}

/// Multiply a value by a factor in decimal arithmetic and round to `places`
///
/// Returns None when the value or product falls outside the decimal range.
fn scale_value(value: f64, factor: f64, places: u32) -> Option<f64> {
    let value = Decimal::from_f64(value)?;
    let factor = Decimal::from_f64(factor)?;
    let scaled = value.checked_mul(factor)?.round_dp(places);
    scaled.to_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tablewash_core::{CellAddress, Style};

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_max_decimal_places() {
        assert_eq!(max_decimal_places(&[1.5, 2.25, 3.0]), 2);
        assert_eq!(max_decimal_places(&[1.0, 2.0]), 0);
        assert_eq!(max_decimal_places(&[]), 0);
        assert_eq!(max_decimal_places(&[0.125]), 3);
    }

    #[test]
    fn test_zero_std_dev_scales_by_mean_exactly() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value(addr("A1"), 10.5).unwrap();
        sheet
            .set_cell_style(addr("A1"), &Style::new().bold(true))
            .unwrap();

        let factor = GaussianFactor::new(2.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let range = CellRange::parse("A1").unwrap();
        let stats = perturb_column(&mut sheet, range, &factor, &mut rng).unwrap();

        assert_eq!(stats, PerturbStats { scaled: 1, cleared: 0 });
        assert_eq!(sheet.cell_value(addr("A1")), CellValue::Number(21.0));
        assert!(!sheet.cell_style(addr("A1")).font.bold);
    }

    #[test]
    fn test_rounding_uses_column_precision() {
        let mut sheet = Worksheet::new("Sheet1");
        // Column precision is 2 (from A2), so A1's product rounds to 2 places
        sheet.set_cell_value(addr("A1"), 3.0).unwrap();
        sheet.set_cell_value(addr("A2"), 1.25).unwrap();
        sheet
            .set_cell_style(addr("A1"), &Style::new().bold(true))
            .unwrap();

        let factor = GaussianFactor::new(1.0 / 3.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let range = CellRange::parse("A1:A2").unwrap();
        perturb_column(&mut sheet, range, &factor, &mut rng).unwrap();

        assert_eq!(sheet.cell_value(addr("A1")), CellValue::Number(1.0));
        // Non-bold cells are untouched
        assert_eq!(sheet.cell_value(addr("A2")), CellValue::Number(1.25));
    }

    #[test]
    fn test_italic_cells_are_cleared() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value(addr("A1"), "scratch note").unwrap();
        sheet
            .set_cell_style(addr("A1"), &Style::new().italic(true))
            .unwrap();

        let factor = GaussianFactor::new(1.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let range = CellRange::parse("A1").unwrap();
        let stats = perturb_column(&mut sheet, range, &factor, &mut rng).unwrap();

        assert_eq!(stats, PerturbStats { scaled: 0, cleared: 1 });
        assert_eq!(sheet.cell_value(addr("A1")), CellValue::Empty);
        assert!(!sheet.cell_style(addr("A1")).font.italic);
    }

    #[test]
    fn test_bold_italic_cell_is_scaled_then_cleared() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value(addr("A1"), 4.0).unwrap();
        sheet
            .set_cell_style(addr("A1"), &Style::new().bold(true).italic(true))
            .unwrap();

        let factor = GaussianFactor::new(1.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let range = CellRange::parse("A1").unwrap();
        let stats = perturb_column(&mut sheet, range, &factor, &mut rng).unwrap();

        // Both branches ran: the scale counted, then the clear emptied the cell
        assert_eq!(stats, PerturbStats { scaled: 1, cleared: 1 });
        assert_eq!(sheet.cell_value(addr("A1")), CellValue::Empty);
        let font = sheet.cell_style(addr("A1")).font;
        assert!(!font.bold);
        assert!(!font.italic);
    }

    #[test]
    fn test_bold_string_cell_is_untouched() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_cell_value(addr("A1"), "Header").unwrap();
        sheet
            .set_cell_style(addr("A1"), &Style::new().bold(true))
            .unwrap();

        let factor = GaussianFactor::new(1.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let range = CellRange::parse("A1").unwrap();
        let stats = perturb_column(&mut sheet, range, &factor, &mut rng).unwrap();

        assert_eq!(stats, PerturbStats::default());
        assert_eq!(sheet.cell_value(addr("A1")).as_string(), Some("Header"));
        assert!(sheet.cell_style(addr("A1")).font.bold);
    }

    #[test]
    fn test_negative_std_dev_is_rejected() {
        assert!(matches!(
            GaussianFactor::new(1.0, -0.5),
            Err(PipelineError::Factor(_))
        ));
    }
}
