//! Template-based output document
//!
//! The template is read once into memory and never written back; all cell
//! writes go to the in-memory copy, which is saved under a new path.

use crate::error::{ConvertError, ConvertResult};
use crate::excel::column::{self, MAX_COLUMN};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use umya_spreadsheet::{Spreadsheet, Worksheet};

/// Last row of a worksheet
pub const MAX_ROW: u32 = 1_048_576;

/// Destination for resolved cell values, addressed with 1-based (row, column)
pub trait SheetWriter {
    fn write(&mut self, row: u32, column: u32, value: &str) -> ConvertResult<()>;
}

fn check_address(row: u32, column: u32) -> ConvertResult<()> {
    if row == 0 || row > MAX_ROW {
        return Err(ConvertError::Config(format!(
            "target row {} is outside 1..={}",
            row, MAX_ROW
        )));
    }
    if column == 0 || column > MAX_COLUMN {
        return Err(ConvertError::Config(format!(
            "target column {} is outside 1..={}",
            column, MAX_COLUMN
        )));
    }
    Ok(())
}

/// A workbook opened from a template
pub struct TemplateDocument {
    template_path: PathBuf,
    book: Spreadsheet,
}

impl TemplateDocument {
    /// Open the template read-only
    pub fn open<P: AsRef<Path>>(template: P) -> ConvertResult<Self> {
        let template_path = template.as_ref().to_path_buf();
        let book = umya_spreadsheet::reader::xlsx::read(&template_path).map_err(|e| {
            ConvertError::io_at(&template_path, format!("failed to open template: {}", e))
        })?;

        Ok(Self {
            template_path,
            book,
        })
    }

    /// Worksheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.book
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect()
    }

    /// Mutable handle to the named sheet, or to the first sheet when `name` is `None`
    pub fn sheet_mut(&mut self, name: Option<&str>) -> ConvertResult<SheetHandle<'_>> {
        let available = self.sheet_names();
        let sheet = match name {
            Some(name) => self.book.get_sheet_by_name_mut(name).ok_or_else(|| {
                ConvertError::Config(format!(
                    "sheet '{}' not found in template (available: {})",
                    name,
                    available.join(", ")
                ))
            })?,
            None => self.book.get_sheet_mut(&0).ok_or_else(|| {
                ConvertError::Config("template has no worksheets".to_string())
            })?,
        };

        Ok(SheetHandle { sheet })
    }

    /// Read back a cell value (1-based), empty string when unset
    pub fn cell_value(&self, sheet: Option<&str>, row: u32, column: u32) -> Option<String> {
        let worksheet = match sheet {
            Some(name) => self.book.get_sheet_by_name(name)?,
            None => self.book.get_sheet(&0)?,
        };
        Some(worksheet.get_value((column, row)))
    }

    /// Save the document under `output`.
    ///
    /// The workbook is written to a hidden sibling file first and then renamed,
    /// so `output` only ever appears complete.
    pub fn save_as<P: AsRef<Path>>(&self, output: P) -> ConvertResult<()> {
        let output = output.as_ref();
        if same_file(output, &self.template_path) {
            return Err(ConvertError::io_at(
                output,
                "refusing to overwrite the template",
            ));
        }

        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| ConvertError::io_at(&parent, e))?;

        let file_name = output
            .file_name()
            .ok_or_else(|| ConvertError::io_at(output, "output path has no file name"))?;
        let staging = parent.join(format!(".~{}", file_name.to_string_lossy()));

        if let Err(e) = umya_spreadsheet::writer::xlsx::write(&self.book, &staging) {
            let _ = fs::remove_file(&staging);
            return Err(ConvertError::io_at(output, format!("failed to write workbook: {}", e)));
        }

        fs::rename(&staging, output).map_err(|e| {
            let _ = fs::remove_file(&staging);
            ConvertError::io_at(output, e)
        })
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Mutable view of one worksheet of a `TemplateDocument`
pub struct SheetHandle<'a> {
    sheet: &'a mut Worksheet,
}

impl SheetHandle<'_> {
    pub fn name(&self) -> &str {
        self.sheet.get_name()
    }
}

impl SheetWriter for SheetHandle<'_> {
    fn write(&mut self, row: u32, column: u32, value: &str) -> ConvertResult<()> {
        check_address(row, column)?;
        self.sheet
            .get_cell_mut((column, row))
            .set_value_string(value);
        Ok(())
    }
}

/// In-memory sheet for exercising the engine without a workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySheet {
    cells: BTreeMap<(u32, u32), String>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: u32, column: u32) -> Option<&str> {
        self.cells.get(&(row, column)).map(String::as_str)
    }

    /// Value at an A1-style column label
    pub fn get_at(&self, row: u32, label: &str) -> Option<&str> {
        let column = column::decode(label).ok()?;
        self.get(row, column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl SheetWriter for MemorySheet {
    fn write(&mut self, row: u32, column: u32, value: &str) -> ConvertResult<()> {
        check_address(row, column)?;
        self.cells.insert((row, column), value.to_string());
        Ok(())
    }
}
