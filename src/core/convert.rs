//! One input file → one output workbook
//!
//! This is the conversion boundary: every failure of a single file surfaces
//! here as a `ConvertError`, and the output is only written once the whole
//! transform succeeded.

use crate::core::engine::{self, TransformSummary};
use crate::diagnostics::Diagnostics;
use crate::error::{ConvertError, ConvertResult};
use crate::mapping::load_mapping;
use crate::reader::{self, DEFAULT_DELIMITER};
use std::path::{Path, PathBuf};

/// Suffix appended to the input's base name
pub const OUTPUT_SUFFIX: &str = "_output";
pub const OUTPUT_EXTENSION: &str = "xlsx";

/// Everything a conversion needs besides the input path
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSettings {
    pub template_path: PathBuf,
    pub mapping_path: PathBuf,
    pub output_folder: PathBuf,
    /// Encoding label of the input files; `None` means UTF-8
    pub encoding: Option<String>,
    pub delimiter: char,
}

impl ConversionSettings {
    pub fn new(
        template_path: impl Into<PathBuf>,
        mapping_path: impl Into<PathBuf>,
        output_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            template_path: template_path.into(),
            mapping_path: mapping_path.into(),
            output_folder: output_folder.into(),
            encoding: None,
            delimiter: DEFAULT_DELIMITER,
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Where the output for `input` goes
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        output_path_for(input, &self.output_folder)
    }
}

/// `<output_folder>/<input base name>_output.xlsx`
pub fn output_path_for(input: &Path, output_folder: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_folder.join(format!("{}{}.{}", stem, OUTPUT_SUFFIX, OUTPUT_EXTENSION))
}

/// Result of a successful conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub summary: TransformSummary,
}

/// Convert `input` into its default output path
pub fn convert_file(
    input: &Path,
    settings: &ConversionSettings,
    diagnostics: &dyn Diagnostics,
) -> ConvertResult<ConversionReport> {
    let output = settings.output_path_for(input);
    convert_file_to(input, &output, settings, diagnostics)
}

/// Convert `input` into an explicit output path
pub fn convert_file_to(
    input: &Path,
    output: &Path,
    settings: &ConversionSettings,
    diagnostics: &dyn Diagnostics,
) -> ConvertResult<ConversionReport> {
    diagnostics.info(&format!("Processing file: {}", input.display()));

    if !input.is_file() {
        return Err(ConvertError::io_at(input, "input file not found"));
    }

    // Reloaded per file so mapping edits apply without a restart
    let mapping = load_mapping(&settings.mapping_path)?;
    let rows = reader::read_rows(
        input,
        settings.encoding.as_deref(),
        settings.delimiter,
        diagnostics,
    )?;
    diagnostics.debug(&format!(
        "{}: {} data rows",
        input.display(),
        rows.len()
    ));

    let transformed = engine::transform(&rows, &mapping, &settings.template_path, diagnostics)?;
    transformed.document.save_as(output)?;

    diagnostics.info(&format!(
        "Excel file generated successfully: {} ({} cells)",
        output.display(),
        transformed.summary.cells_written
    ));

    Ok(ConversionReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        summary: transformed.summary,
    })
}
