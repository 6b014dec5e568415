//! Conversion core: the transform engine and the per-file pipeline around it

pub mod convert;
pub mod engine;

pub use convert::{convert_file, convert_file_to, output_path_for, ConversionReport, ConversionSettings};
pub use engine::{apply, transform, TransformSummary, Transformed};
