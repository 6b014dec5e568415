//! Shared fixtures for integration tests
#![allow(dead_code)]

use calamine::{open_workbook, Data, Reader, Xlsx};
use csv2xlsx::core::ConversionSettings;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch service layout: template, mapping, input and output folders
pub struct Fixture {
    pub dir: TempDir,
    pub template: PathBuf,
    pub mapping: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Fixture {
    /// Template with the given sheets and a mapping file with `mapping_json`
    pub fn new(sheets: &[&str], mapping_json: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("ExcelTemplate.xlsx");
        let mapping = dir.path().join("mapping.json");
        let input_dir = dir.path().join("InputCsv");
        let output_dir = dir.path().join("OutputExcel");

        write_template(&template, sheets);
        fs::write(&mapping, mapping_json).unwrap();
        fs::create_dir_all(&input_dir).unwrap();
        fs::create_dir_all(&output_dir).unwrap();

        Self {
            dir,
            template,
            mapping,
            input_dir,
            output_dir,
        }
    }

    pub fn settings(&self) -> ConversionSettings {
        ConversionSettings::new(&self.template, &self.mapping, &self.output_dir)
    }

    /// Write an input file into the input folder
    pub fn input(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.input_dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn output_for(&self, input_name: &str) -> PathBuf {
        let stem = Path::new(input_name).file_stem().unwrap().to_string_lossy();
        self.output_dir.join(format!("{}_output.xlsx", stem))
    }

    /// `appsettings.json` pointing at this layout
    pub fn write_settings(&self) -> PathBuf {
        let path = self.dir.path().join("appsettings.json");
        let json = r#"{
            "FilePaths": {
                "TemplatePath": "ExcelTemplate.xlsx",
                "CsvFolderPath": "InputCsv",
                "MappingPath": "mapping.json",
                "OutputFolderPath": "OutputExcel"
            },
            "Encoding": { "CsvEncoding": "utf-8" },
            "Watcher": { "SettleDelayMs": 20, "MaxWorkers": 2 }
        }"#;
        fs::write(&path, json).unwrap();
        path
    }
}

/// Template workbook: every sheet carries a title in A1 and a label in A2
pub fn write_template(path: &Path, sheets: &[&str]) {
    let mut workbook = Workbook::new();
    for name in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        worksheet.write_string(0, 0, "Template title").unwrap();
        worksheet.write_string(1, 0, format!("{} sheet", name)).unwrap();
    }
    workbook.save(path).unwrap();
}

/// Cell text at 1-based (row, column); `None` when the cell is empty
pub fn read_cell(path: &Path, sheet: &str, row: u32, column: u32) -> Option<String> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    match range.get_value((row - 1, column - 1)) {
        None | Some(Data::Empty) => None,
        Some(value) => Some(value.to_string()),
    }
}

/// Sheet names of a workbook
pub fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.sheet_names().to_vec()
}

/// Every non-empty cell as (row, column, text), 1-based, row-major
pub fn all_cells(path: &Path, sheet: &str) -> Vec<(u32, u32, String)> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    range
        .cells()
        .filter(|(_, _, v)| !matches!(v, Data::Empty))
        .map(|(r, c, v)| (r as u32 + start_row + 1, c as u32 + start_col + 1, v.to_string()))
        .collect()
}
