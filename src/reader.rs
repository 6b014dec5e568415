//! Delimited text input → rows
//!
//! Fields are split on a single delimiter character without any quoting or
//! escaping, so a field can never contain the delimiter itself.

use crate::diagnostics::Diagnostics;
use crate::error::{ConvertError, ConvertResult};
use crate::types::Row;
use encoding_rs::{Encoding, UTF_8};
use std::fs;
use std::path::Path;

pub const DEFAULT_DELIMITER: char = ',';

/// Look up an encoding by label, falling back to UTF-8 with a warning
pub fn resolve_encoding(label: Option<&str>, diagnostics: &dyn Diagnostics) -> &'static Encoding {
    let label = match label.map(str::trim) {
        Some(l) if !l.is_empty() => l,
        _ => return UTF_8,
    };

    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) => encoding,
        None => {
            diagnostics.warn(&format!(
                "Encoding '{}' not found. Using UTF-8 instead.",
                label
            ));
            UTF_8
        }
    }
}

/// Read a delimited file: the first line is the header, every later line a row
pub fn read_rows(
    path: &Path,
    encoding_label: Option<&str>,
    delimiter: char,
    diagnostics: &dyn Diagnostics,
) -> ConvertResult<Vec<Row>> {
    let bytes = fs::read(path).map_err(|e| ConvertError::io_at(path, e))?;
    let encoding = resolve_encoding(encoding_label, diagnostics);

    // decode() sniffs and strips a BOM, which may override the configured encoding
    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        diagnostics.warn(&format!(
            "{}: malformed {} sequences replaced",
            path.display(),
            used.name()
        ));
    }

    parse_rows(&text, delimiter).map_err(|e| match e {
        ConvertError::Format(msg) => ConvertError::Format(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Split already-decoded text into rows
pub fn parse_rows(text: &str, delimiter: char) -> ConvertResult<Vec<Row>> {
    let mut lines = text.lines();

    let header_line = lines
        .next()
        .ok_or_else(|| ConvertError::Format("file is empty, no header line".to_string()))?;
    let headers: Vec<&str> = header_line.split(delimiter).collect();

    let rows = lines
        .map(|line| {
            headers
                .iter()
                .zip(line.split(delimiter))
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect::<Row>()
        })
        .collect();

    Ok(rows)
}
