//! Number format types

/// Number display format for a cell
///
/// Only the format identity is carried; the toolkit never renders values
/// through it, it just round-trips formats so output files keep their
/// display formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// The built-in "General" format (numFmtId 0)
    #[default]
    General,
    /// Another built-in format, identified by its numFmtId (1-163)
    BuiltIn(u32),
    /// A custom format code (e.g., "0.00", "#,##0")
    Custom(String),
}

impl NumberFormat {
    /// Build from a format code string
    pub fn from_code(code: &str) -> Self {
        if code.is_empty() || code.eq_ignore_ascii_case("general") {
            NumberFormat::General
        } else {
            NumberFormat::Custom(code.to_string())
        }
    }

    /// Check if this is the General format
    pub fn is_general(&self) -> bool {
        matches!(self, NumberFormat::General)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(NumberFormat::from_code("General"), NumberFormat::General);
        assert_eq!(NumberFormat::from_code(""), NumberFormat::General);
        assert_eq!(
            NumberFormat::from_code("0.00"),
            NumberFormat::Custom("0.00".into())
        );
    }
}
