//! End-to-end conversion tests: CSV + mapping + template → output workbook

mod common;

use common::{all_cells, read_cell, sheet_names, Fixture};
use csv2xlsx::core::convert_file;
use csv2xlsx::diagnostics::MemoryDiagnostics;
use pretty_assertions::assert_eq;
use std::fs;

const ORDERS_MAPPING: &str = r#"{
    "sheetName": "Data",
    "startRow": 3,
    "columnMappings": { "Name": "A", "Qty": "C" },
    "cellMappings": [
        { "csvColumn": "Total", "csvRow": 1, "excelColumn": "D", "excelRow": 1 },
        { "csvColumn": "Name", "csvRow": 2, "excelColumn": "B", "offsetFromEnd": 1 }
    ]
}"#;

const ORDERS_CSV: &str = "Name,Qty,Total\nalpha,5,12\nbeta,7\n";

// ═══════════════════════════════════════════════════════════════════════════
// FULL PIPELINE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_convert_fills_repeating_block_and_cells() {
    let fx = Fixture::new(&["Summary", "Data"], ORDERS_MAPPING);
    let input = fx.input("orders.csv", ORDERS_CSV);
    let diag = MemoryDiagnostics::new();

    let report = convert_file(&input, &fx.settings(), &diag).unwrap();

    assert_eq!(report.output, fx.output_for("orders.csv"));
    assert_eq!(report.summary.rows_consumed, 2);
    assert_eq!(report.summary.end_row, 5);
    assert_eq!(report.summary.cells_written, 6);
    assert_eq!(report.summary.cells_skipped, 0);

    let out = &report.output;
    assert_eq!(read_cell(out, "Data", 3, 1).as_deref(), Some("alpha"));
    assert_eq!(read_cell(out, "Data", 3, 3).as_deref(), Some("5"));
    assert_eq!(read_cell(out, "Data", 4, 1).as_deref(), Some("beta"));
    assert_eq!(read_cell(out, "Data", 4, 3).as_deref(), Some("7"));
    assert_eq!(read_cell(out, "Data", 1, 4).as_deref(), Some("12"));
    // endRow 5 + offset 1
    assert_eq!(read_cell(out, "Data", 6, 2).as_deref(), Some("beta"));
}

#[test]
fn test_convert_preserves_template_content() {
    let fx = Fixture::new(&["Summary", "Data"], ORDERS_MAPPING);
    let input = fx.input("orders.csv", ORDERS_CSV);

    let report = convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap();

    assert_eq!(sheet_names(&report.output), vec!["Summary", "Data"]);
    assert_eq!(
        read_cell(&report.output, "Data", 1, 1).as_deref(),
        Some("Template title")
    );
    assert_eq!(
        read_cell(&report.output, "Data", 2, 1).as_deref(),
        Some("Data sheet")
    );
    // Untargeted sheet untouched
    assert_eq!(
        all_cells(&report.output, "Summary"),
        vec![
            (1, 1, "Template title".to_string()),
            (2, 1, "Summary sheet".to_string()),
        ]
    );
}

#[test]
fn test_template_file_is_never_modified() {
    let fx = Fixture::new(&["Summary", "Data"], ORDERS_MAPPING);
    let input = fx.input("orders.csv", ORDERS_CSV);
    let before = fs::read(&fx.template).unwrap();

    convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap();

    assert_eq!(fs::read(&fx.template).unwrap(), before);
}

#[test]
fn test_convert_twice_gives_same_cells() {
    let fx = Fixture::new(&["Summary", "Data"], ORDERS_MAPPING);
    let input = fx.input("orders.csv", ORDERS_CSV);
    let settings = fx.settings();

    let first = convert_file(&input, &settings, &MemoryDiagnostics::new()).unwrap();
    let first_cells = all_cells(&first.output, "Data");
    let second = convert_file(&input, &settings, &MemoryDiagnostics::new()).unwrap();

    assert_eq!(all_cells(&second.output, "Data"), first_cells);
}

// ═══════════════════════════════════════════════════════════════════════════
// SHEET RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_without_sheet_name_first_sheet_is_used() {
    let mapping = r#"{ "startRow": 5, "columnMappings": { "Name": "B" } }"#;
    let fx = Fixture::new(&["First", "Second"], mapping);
    let input = fx.input("people.csv", "Name\nann\n");

    let report = convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap();

    assert_eq!(read_cell(&report.output, "First", 5, 2).as_deref(), Some("ann"));
    assert_eq!(read_cell(&report.output, "Second", 5, 2), None);
}

#[test]
fn test_missing_sheet_fails_without_output() {
    let mapping = r#"{ "sheetName": "Nope", "startRow": 1, "columnMappings": { "Name": "A" } }"#;
    let fx = Fixture::new(&["Summary"], mapping);
    let input = fx.input("people.csv", "Name\nann\n");

    let err = convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap_err();

    assert!(err.is_config());
    assert!(err.to_string().contains("Nope"));
    assert!(!fx.output_for("people.csv").exists());
}

#[test]
fn test_blank_sheet_name_is_looked_up_literally() {
    let mapping = r#"{ "sheetName": "   ", "startRow": 1, "columnMappings": { "Name": "A" } }"#;
    let fx = Fixture::new(&["Summary"], mapping);
    let input = fx.input("people.csv", "Name\nann\n");

    let err = convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap_err();

    assert!(err.is_config());
    assert!(!fx.output_for("people.csv").exists());
}

// ═══════════════════════════════════════════════════════════════════════════
// MISSING DATA AND BAD MAPPINGS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_header_only_input_writes_only_cells_with_data() {
    let fx = Fixture::new(&["Summary", "Data"], ORDERS_MAPPING);
    let input = fx.input("empty.csv", "Name,Qty,Total\n");

    let report = convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap();

    assert_eq!(report.summary.rows_consumed, 0);
    assert_eq!(report.summary.end_row, 3);
    assert_eq!(report.summary.cells_written, 0);
    assert_eq!(report.summary.cells_skipped, 2);
    assert_eq!(all_cells(&report.output, "Data").len(), 2);
}

#[test]
fn test_bad_column_label_fails_without_output() {
    let mapping = r#"{ "startRow": 1, "columnMappings": { "Name": "A1" } }"#;
    let fx = Fixture::new(&["Summary"], mapping);
    let input = fx.input("people.csv", "Name\nann\n");

    let err = convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap_err();

    assert!(err.is_config());
    assert!(!fx.output_for("people.csv").exists());
}

#[test]
fn test_cell_mapping_without_row_directive_fails_when_value_exists() {
    let mapping = r#"{
        "startRow": 1,
        "cellMappings": [ { "csvColumn": "Name", "csvRow": 1, "excelColumn": "A" } ]
    }"#;
    let fx = Fixture::new(&["Summary"], mapping);
    let input = fx.input("people.csv", "Name\nann\n");

    let err = convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap_err();

    assert!(err.is_config());
    assert!(err.to_string().contains("target row"));
}

#[test]
fn test_missing_start_row_is_config_error() {
    let mapping = r#"{ "columnMappings": { "Name": "A" } }"#;
    let fx = Fixture::new(&["Summary"], mapping);
    let input = fx.input("people.csv", "Name\nann\n");

    let err = convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap_err();

    assert!(err.is_config());
    assert!(err.to_string().contains("startRow"));
}

#[test]
fn test_missing_mapping_file_is_io_error() {
    let fx = Fixture::new(&["Summary"], "{}");
    fs::remove_file(&fx.mapping).unwrap();
    let input = fx.input("people.csv", "Name\nann\n");

    let err = convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap_err();

    assert!(err.is_io());
}

#[test]
fn test_pascal_case_mapping_is_accepted() {
    let mapping = r#"{
        "SheetName": "Data",
        "StartRow": 2,
        "ColumnMappings": { "Name": "A" },
        "CellMappings": [
            { "CsvColumn": "Name", "CsvRow": 1, "ExcelColumn": "C", "ExcelRow": 1 }
        ]
    }"#;
    let fx = Fixture::new(&["Data"], mapping);
    let input = fx.input("people.csv", "Name\nann\n");

    let report = convert_file(&input, &fx.settings(), &MemoryDiagnostics::new()).unwrap();

    assert_eq!(read_cell(&report.output, "Data", 2, 1).as_deref(), Some("ann"));
    assert_eq!(read_cell(&report.output, "Data", 1, 3).as_deref(), Some("ann"));
}
