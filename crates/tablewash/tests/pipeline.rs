//! End-to-end tests for the batch pipeline (plan -> perturb -> write)

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tablewash::prelude::*;

fn addr(s: &str) -> CellAddress {
    CellAddress::parse(s).unwrap()
}

/// Build the fixture workbook used across these tests:
/// a "Data" sheet with a Sales table at B2:E5 where the Units column is
/// bold numbers and one Price cell is an italic note.
fn write_fixture(path: &Path) {
    let mut wb = Workbook::empty();
    let sheet = wb.add_worksheet("Data").unwrap();

    for (cell, header) in [("B2", "Region"), ("C2", "Units"), ("D2", "Price"), ("E2", "Total")] {
        sheet.set_cell_value(addr(cell), header).unwrap();
    }

    let bold = Style::new().bold(true);
    let italic = Style::new().italic(true);

    let rows: [(&str, f64, f64, f64); 3] = [
        ("North", 10.0, 1.5, 15.0),
        ("South", 20.5, 2.0, 41.0),
        ("West", 30.0, 2.25, 67.5),
    ];
    for (i, (region, units, price, total)) in rows.iter().enumerate() {
        let row = 3 + i;
        sheet
            .set_cell_value(addr(&format!("B{}", row)), *region)
            .unwrap();
        sheet
            .set_cell_value(addr(&format!("C{}", row)), *units)
            .unwrap();
        sheet
            .set_cell_style(addr(&format!("C{}", row)), &bold)
            .unwrap();
        sheet
            .set_cell_value(addr(&format!("D{}", row)), *price)
            .unwrap();
        sheet
            .set_cell_value(addr(&format!("E{}", row)), *total)
            .unwrap();
    }

    // One italic scratch note in the Price column
    sheet.set_cell_value(addr("D4"), "check this").unwrap();
    sheet.set_cell_style(addr("D4"), &italic).unwrap();

    let table = Table::new(
        "Sales",
        "B2:E5",
        1,
        vec![
            "Region".into(),
            "Units".into(),
            "Price".into(),
            "Total".into(),
        ],
    )
    .unwrap();
    sheet.add_table(table).unwrap();

    wb.save(path).unwrap();
}

fn units_values(wb: &Workbook) -> Vec<f64> {
    let sheet = wb.worksheet_by_name("Data").unwrap();
    ["C3", "C4", "C5"]
        .iter()
        .map(|c| sheet.cell_value(addr(c)).as_number().unwrap())
        .collect()
}

#[test]
fn test_read_structure_plans_books_sheets_tables() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(&dir.path().join("sales.xlsx"));

    let structure = read_structure(dir.path(), 2, 1001).unwrap();

    assert_eq!(structure.book_count(), 1);
    let book = &structure.books[0];
    assert_eq!(
        book.outputs,
        vec![
            dir.path().join("sales").join("sales_1002.xlsx"),
            dir.path().join("sales").join("sales_1003.xlsx"),
        ]
    );

    assert_eq!(book.sheets.len(), 1);
    let sheet = &book.sheets[0];
    assert_eq!(sheet.name, "Data");
    assert_eq!(sheet.tables.len(), 1);
    assert_eq!(sheet.tables[0].name, "Sales");
    assert_eq!(
        sheet.tables[0].columns,
        ["Region", "Units", "Price", "Total"]
    );
}

#[test]
fn test_read_structure_empty_dir() {
    let dir = tempfile::tempdir().unwrap();
    let structure = read_structure(dir.path(), 1, 1001).unwrap();
    assert!(structure.is_empty());
}

#[test]
fn test_read_structure_names_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.xlsx"), b"this is not a zip archive").unwrap();

    let err = read_structure(dir.path(), 1, 1001).unwrap_err();
    assert!(matches!(err, PipelineError::OpenWorkbook { .. }));
    assert!(
        err.to_string().contains("bad.xlsx"),
        "error does not name the file: {}",
        err
    );
}

#[test]
fn test_batch_scales_bold_and_clears_italic() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(&dir.path().join("sales.xlsx"));

    // Mean 2, std dev 0: every factor is exactly 2
    let options = BatchOptions {
        copies_per_file: 1,
        factor_mean: 2.0,
        factor_std_dev: 0.0,
        seed: Some(7),
        ..BatchOptions::default()
    };
    let summary = run_batch(dir.path(), &options).unwrap();

    assert_eq!(summary.files_written, 1);
    assert_eq!(summary.stats.scaled, 3);
    assert_eq!(summary.stats.cleared, 1);

    let out = Workbook::open(dir.path().join("sales").join("sales_1002.xlsx")).unwrap();
    assert_eq!(units_values(&out), vec![20.0, 41.0, 60.0]);

    let sheet = out.worksheet_by_name("Data").unwrap();

    // Consumed font flags are gone
    for c in ["C3", "C4", "C5"] {
        assert!(!sheet.cell_style(addr(c)).font.bold, "{} still bold", c);
    }
    assert_eq!(sheet.cell_value(addr("D4")), CellValue::Empty);
    assert!(!sheet.cell_style(addr("D4")).font.italic);

    // Untargeted cells are untouched
    assert_eq!(sheet.cell_value(addr("B3")).as_string(), Some("North"));
    assert_eq!(sheet.cell_value(addr("D3")), CellValue::Number(1.5));
    assert_eq!(sheet.cell_value(addr("C2")).as_string(), Some("Units"));

    // The input file itself is unchanged
    let input = Workbook::open(dir.path().join("sales.xlsx")).unwrap();
    assert_eq!(units_values(&input), vec![10.0, 20.5, 30.0]);
}

#[test]
fn test_batch_copies_are_distinct() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(&dir.path().join("sales.xlsx"));

    // A wide distribution so the two copies cannot round to the same values
    let options = BatchOptions {
        copies_per_file: 2,
        factor_std_dev: 10.0,
        seed: Some(42),
        ..BatchOptions::default()
    };
    let summary = run_batch(dir.path(), &options).unwrap();
    assert_eq!(summary.files_written, 2);

    let out1 = Workbook::open(dir.path().join("sales").join("sales_1002.xlsx")).unwrap();
    let out2 = Workbook::open(dir.path().join("sales").join("sales_1003.xlsx")).unwrap();
    assert_ne!(units_values(&out1), units_values(&out2));
}

#[test]
fn test_batch_is_deterministic_with_seed() {
    let dir1 = tempfile::tempdir().unwrap();
    let dir2 = tempfile::tempdir().unwrap();
    write_fixture(&dir1.path().join("sales.xlsx"));
    write_fixture(&dir2.path().join("sales.xlsx"));

    let options = BatchOptions {
        factor_std_dev: 0.5,
        seed: Some(9),
        ..BatchOptions::default()
    };
    run_batch(dir1.path(), &options).unwrap();
    run_batch(dir2.path(), &options).unwrap();

    let out1 = Workbook::open(dir1.path().join("sales").join("sales_1002.xlsx")).unwrap();
    let out2 = Workbook::open(dir2.path().join("sales").join("sales_1002.xlsx")).unwrap();
    assert_eq!(units_values(&out1), units_values(&out2));
}

#[test]
fn test_rounding_respects_column_precision() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(&dir.path().join("sales.xlsx"));

    let options = BatchOptions {
        factor_std_dev: 0.5,
        seed: Some(11),
        ..BatchOptions::default()
    };
    run_batch(dir.path(), &options).unwrap();

    // Units values display with at most one decimal place (from 20.5),
    // so every scaled value must round to one place
    let out = Workbook::open(dir.path().join("sales").join("sales_1002.xlsx")).unwrap();
    for v in units_values(&out) {
        assert_eq!(v, (v * 10.0).round() / 10.0, "{} has extra precision", v);
    }
}

#[test]
fn test_tables_survive_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(&dir.path().join("sales.xlsx"));

    run_batch(dir.path(), &BatchOptions::default()).unwrap();

    let out = Workbook::open(dir.path().join("sales").join("sales_1002.xlsx")).unwrap();
    let table = out
        .worksheet_by_name("Data")
        .unwrap()
        .table("Sales")
        .expect("table lost during batch");
    assert_eq!(table.range().to_string(), "B2:E5");
}
