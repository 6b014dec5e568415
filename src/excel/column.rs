//! Column labels (A, B, ..., Z, AA, ...) ⇄ 1-based column numbers
//!
//! Labels use bijective base-26: there is no zero digit, so `Z` is 26 and
//! `AA` is 27.

use crate::error::{ConvertError, ConvertResult};

/// Last column of a worksheet (`XFD`)
pub const MAX_COLUMN: u32 = 16_384;

/// Convert a 1-based column number to its label (1→A, 26→Z, 27→AA)
pub fn encode(index: u32) -> ConvertResult<String> {
    if index == 0 {
        return Err(ConvertError::Config(
            "column numbers start at 1".to_string(),
        ));
    }

    let mut label = Vec::new();
    let mut num = index;
    while num > 0 {
        let remainder = (num - 1) % 26;
        label.push(b'A' + remainder as u8);
        num = (num - 1) / 26;
    }
    label.reverse();

    Ok(label.into_iter().map(char::from).collect())
}

/// Convert a column label to its 1-based number (case-insensitive)
pub fn decode(label: &str) -> ConvertResult<u32> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ConvertError::Config("empty column label".to_string()));
    }

    let mut index: u32 = 0;
    for c in trimmed.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(ConvertError::Config(format!(
                "invalid column label '{}': '{}' is not a letter",
                label, c
            )));
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index * 26 + digit;
        if index > MAX_COLUMN {
            return Err(ConvertError::Config(format!(
                "column label '{}' is beyond the last column (XFD)",
                label
            )));
        }
    }

    Ok(index)
}
