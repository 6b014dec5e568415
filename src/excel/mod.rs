//! Excel side of the conversion
//!
//! - Column labels ⇄ numbers
//! - Template workbook opened, filled in memory, saved under a new name

pub mod column;
mod document;

pub use document::{MemorySheet, SheetHandle, SheetWriter, TemplateDocument, MAX_ROW};
