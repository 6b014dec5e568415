use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

//==============================================================================
// Input rows
//==============================================================================

/// One parsed data line: header name → raw field value, in header order
pub type Row = IndexMap<String, String>;

//==============================================================================
// Mapping model
//==============================================================================

/// Declarative description of how input rows land in the template.
///
/// Every field defaults when absent so that a sparse mapping file still loads;
/// values are checked where they are used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mapping {
    /// Target sheet; empty selects the first sheet of the template
    #[serde(alias = "SheetName")]
    pub sheet_name: Option<String>,

    /// Source header → target column label, applied to every input row
    #[serde(alias = "ColumnMappings")]
    pub column_mappings: HashMap<String, String>,

    /// Individually addressed cells, applied after the repeating rows
    #[serde(alias = "CellMappings")]
    pub cell_mappings: Vec<CellMapping>,

    /// First target row for the repeating column mappings (1-based)
    #[serde(alias = "StartRow")]
    pub start_row: i64,
}

impl Mapping {
    /// Sheet name to look up, or `None` for "first sheet"
    pub fn target_sheet(&self) -> Option<&str> {
        self.sheet_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// A single source cell copied to a single target cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellMapping {
    #[serde(alias = "CsvColumn")]
    pub csv_column: String,

    /// 1-based data row in the input file (the header is not counted)
    #[serde(alias = "CsvRow")]
    pub csv_row: i64,

    #[serde(alias = "ExcelColumn")]
    pub excel_column: String,

    /// Absolute target row; wins over `offset_from_end` when both are set
    #[serde(alias = "ExcelRow", skip_serializing_if = "Option::is_none")]
    pub excel_row: Option<i64>,

    /// Target row relative to the row after the last repeated row
    #[serde(alias = "OffsetFromEnd", skip_serializing_if = "Option::is_none")]
    pub offset_from_end: Option<i64>,
}

/// Where a cell mapping's target row comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    Absolute(i64),
    FromEnd(i64),
}

impl CellMapping {
    pub fn row_target(&self) -> Option<RowTarget> {
        match (self.excel_row, self.offset_from_end) {
            (Some(row), _) => Some(RowTarget::Absolute(row)),
            (None, Some(offset)) => Some(RowTarget::FromEnd(offset)),
            (None, None) => None,
        }
    }
}
