//! Mapping-driven transform
//!
//! Two phases over one sheet:
//! 1. Repeating phase: every input row is written at a row cursor that starts at
//!    `startRow` and moves down one row per input row, whether or not the row
//!    produced any cell.
//! 2. Cell phase: each cell mapping copies one source value to one target cell,
//!    addressed absolutely (`excelRow`) or relative to the cursor's final value
//!    (`endRow + offsetFromEnd`).
//!
//! Missing source data is never an error: absent rows, absent columns and empty
//! values are skipped.

use crate::diagnostics::Diagnostics;
use crate::error::{ConvertError, ConvertResult};
use crate::excel::{column, SheetWriter, TemplateDocument, MAX_ROW};
use crate::types::{CellMapping, Mapping, Row, RowTarget};
use std::path::Path;

/// What one transform did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformSummary {
    /// Cursor value after the repeating phase (`startRow + rows`)
    pub end_row: i64,
    pub rows_consumed: usize,
    pub cells_written: usize,
    /// Cell mappings skipped for lack of source data
    pub cells_skipped: usize,
}

/// A filled document that has not been saved yet
pub struct Transformed {
    pub document: TemplateDocument,
    pub summary: TransformSummary,
}

/// Open `template`, resolve the target sheet and apply `mapping` to `rows`.
///
/// Nothing is written to disk; the caller persists the returned document.
pub fn transform(
    rows: &[Row],
    mapping: &Mapping,
    template: &Path,
    diagnostics: &dyn Diagnostics,
) -> ConvertResult<Transformed> {
    let mut document = TemplateDocument::open(template)?;

    let summary = {
        let mut sheet = document.sheet_mut(mapping.target_sheet())?;
        diagnostics.debug(&format!("Writing to sheet '{}'", sheet.name()));
        apply(rows, mapping, &mut sheet, diagnostics)?
    };

    Ok(Transformed { document, summary })
}

/// Apply both phases of `mapping` to an already resolved sheet
pub fn apply(
    rows: &[Row],
    mapping: &Mapping,
    sheet: &mut dyn SheetWriter,
    diagnostics: &dyn Diagnostics,
) -> ConvertResult<TransformSummary> {
    if mapping.start_row < 1 {
        return Err(ConvertError::Config(format!(
            "startRow must be at least 1, got {}",
            mapping.start_row
        )));
    }

    let mut summary = TransformSummary::default();
    let mut cursor = mapping.start_row;

    for row in rows {
        for (source_header, target_label) in &mapping.column_mappings {
            let value = match row.get(source_header) {
                Some(v) if !v.is_empty() => v,
                _ => continue,
            };
            let target_column = column::decode(target_label)?;
            sheet.write(to_row(cursor)?, target_column, value)?;
            summary.cells_written += 1;
        }
        cursor = cursor.checked_add(1).ok_or_else(|| {
            ConvertError::Config(format!(
                "startRow {} leaves no room for {} rows",
                mapping.start_row,
                rows.len()
            ))
        })?;
        summary.rows_consumed += 1;
    }

    let end_row = cursor;
    summary.end_row = end_row;

    for (position, cell) in mapping.cell_mappings.iter().enumerate() {
        let value = match source_value(rows, cell) {
            Some(v) => v,
            None => {
                diagnostics.debug(&format!(
                    "cellMappings[{}]: no value for '{}' in data row {}, skipped",
                    position, cell.csv_column, cell.csv_row
                ));
                summary.cells_skipped += 1;
                continue;
            }
        };

        let target_row = resolve_target_row(cell, end_row).map_err(|e| match e {
            ConvertError::Config(msg) => {
                ConvertError::Config(format!("cellMappings[{}]: {}", position, msg))
            }
            other => other,
        })?;
        let target_column = column::decode(&cell.excel_column)?;
        sheet.write(to_row(target_row)?, target_column, value)?;
        summary.cells_written += 1;
    }

    Ok(summary)
}

/// Non-empty source value for a cell mapping, if the data has one
fn source_value<'a>(rows: &'a [Row], cell: &CellMapping) -> Option<&'a str> {
    let index = usize::try_from(cell.csv_row.checked_sub(1)?).ok()?;
    rows.get(index)?
        .get(&cell.csv_column)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Target row of a cell mapping; `excelRow` wins over `offsetFromEnd`
pub fn resolve_target_row(cell: &CellMapping, end_row: i64) -> ConvertResult<i64> {
    match cell.row_target() {
        Some(RowTarget::Absolute(row)) => Ok(row),
        Some(RowTarget::FromEnd(offset)) => end_row.checked_add(offset).ok_or_else(|| {
            ConvertError::Config(format!(
                "offsetFromEnd {} from end row {} is outside the sheet",
                offset, end_row
            ))
        }),
        None => Err(ConvertError::Config(
            "mapping must specify an absolute or offset target row".to_string(),
        )),
    }
}

fn to_row(row: i64) -> ConvertResult<u32> {
    u32::try_from(row)
        .ok()
        .filter(|r| (1..=MAX_ROW).contains(r))
        .ok_or_else(|| {
            ConvertError::Config(format!("target row {} is outside 1..={}", row, MAX_ROW))
        })
}
