//! csv2xlsx - fill delimited text files into an Excel template
//!
//! A JSON mapping describes where input values go:
//!
//! - `columnMappings` repeat for every input row, starting at `startRow` and
//!   moving one row down per input row
//! - `cellMappings` copy single values, either to a fixed row or to a row
//!   relative to the end of the repeated block
//!
//! The template is never modified; each input produces
//! `<name>_output.xlsx` in the output folder.
//!
//! # Example
//!
//! ```no_run
//! use csv2xlsx::core::{convert_file, ConversionSettings};
//! use csv2xlsx::diagnostics::TracingDiagnostics;
//! use std::path::Path;
//!
//! let settings = ConversionSettings::new("template.xlsx", "mapping.json", "out")
//!     .with_encoding("windows-1255");
//! let report = convert_file(Path::new("orders.csv"), &settings, &TracingDiagnostics)?;
//!
//! println!("Wrote {}", report.output.display());
//! # Ok::<(), csv2xlsx::error::ConvertError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod excel;
pub mod mapping;
pub mod reader;
pub mod types;
pub mod watch;

// Re-export commonly used types
pub use error::{ConvertError, ConvertResult};
pub use types::{CellMapping, Mapping, Row};
