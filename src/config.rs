//! Service settings (`appsettings.json`)
//!
//! ```json
//! {
//!   "FilePaths": {
//!     "TemplatePath": "ExcelTemplate.xlsx",
//!     "CsvFolderPath": "InputCsv",
//!     "MappingPath": "mapping.json",
//!     "OutputFolderPath": "OutputExcel"
//!   },
//!   "Encoding": { "CsvEncoding": "windows-1255" },
//!   "Watcher": { "SettleDelayMs": 500, "MaxWorkers": 4, "Delimiter": "," },
//!   "Logging": { "Directory": "logs" }
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the settings file.

use crate::core::ConversionSettings;
use crate::diagnostics::Diagnostics;
use crate::error::{ConvertError, ConvertResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";

//==============================================================================
// File layout
//==============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct SettingsFile {
    file_paths: FilePathsSection,
    encoding: EncodingSection,
    watcher: WatcherSection,
    logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct FilePathsSection {
    template_path: String,
    csv_folder_path: String,
    mapping_path: String,
    output_folder_path: String,
}

impl Default for FilePathsSection {
    fn default() -> Self {
        Self {
            template_path: "ExcelTemplate.xlsx".to_string(),
            csv_folder_path: "InputCsv".to_string(),
            mapping_path: "mapping.json".to_string(),
            output_folder_path: "OutputExcel".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct EncodingSection {
    csv_encoding: Option<String>,
}

impl Default for EncodingSection {
    fn default() -> Self {
        Self {
            csv_encoding: Some("utf-8".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct WatcherSection {
    settle_delay_ms: u64,
    max_workers: usize,
    delimiter: String,
}

impl Default for WatcherSection {
    fn default() -> Self {
        Self {
            settle_delay_ms: 500,
            max_workers: 4,
            delimiter: ",".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct LoggingSection {
    directory: Option<String>,
}

//==============================================================================
// Resolved settings
//==============================================================================

/// Fully resolved service settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub template_path: PathBuf,
    pub input_folder: PathBuf,
    pub mapping_path: PathBuf,
    pub output_folder: PathBuf,
    pub encoding: Option<String>,
    pub delimiter: String,
    pub settle_delay: Duration,
    pub max_workers: usize,
    pub log_dir: Option<PathBuf>,
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub template_path: Option<PathBuf>,
    pub input_folder: Option<PathBuf>,
    pub mapping_path: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
    pub encoding: Option<String>,
    pub max_workers: Option<usize>,
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// With `path` unset, `appsettings.json` in the working directory is used
    /// when present; otherwise built-in defaults relative to the working directory.
    pub fn load(path: Option<&Path>) -> ConvertResult<Self> {
        match path {
            Some(p) => Self::load_file(p),
            None => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if default.is_file() {
                    Self::load_file(default)
                } else {
                    let cwd = std::env::current_dir()?;
                    Ok(Self::from_file(SettingsFile::default(), &cwd))
                }
            }
        }
    }

    fn load_file(path: &Path) -> ConvertResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConvertError::io_at(path, e))?;
        let base_dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        Self::from_json_str(&content, &base_dir).map_err(|e| match e {
            ConvertError::Config(msg) => {
                ConvertError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse settings JSON, resolving relative paths against `base_dir`
    pub fn from_json_str(json: &str, base_dir: &Path) -> ConvertResult<Self> {
        let file: SettingsFile = serde_json::from_str(json)
            .map_err(|e| ConvertError::Config(format!("invalid settings JSON: {}", e)))?;
        Ok(Self::from_file(file, base_dir))
    }

    fn from_file(file: SettingsFile, base_dir: &Path) -> Self {
        let resolve = |p: &str| resolve_path(base_dir, Path::new(p));
        Self {
            template_path: resolve(&file.file_paths.template_path),
            input_folder: resolve(&file.file_paths.csv_folder_path),
            mapping_path: resolve(&file.file_paths.mapping_path),
            output_folder: resolve(&file.file_paths.output_folder_path),
            encoding: file
                .encoding
                .csv_encoding
                .filter(|e| !e.trim().is_empty()),
            delimiter: file.watcher.delimiter,
            settle_delay: Duration::from_millis(file.watcher.settle_delay_ms),
            max_workers: file.watcher.max_workers,
            log_dir: file
                .logging
                .directory
                .filter(|d| !d.trim().is_empty())
                .map(|d| resolve(&d)),
        }
    }

    /// Apply command line / environment overrides
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(p) = overrides.template_path {
            self.template_path = p;
        }
        if let Some(p) = overrides.input_folder {
            self.input_folder = p;
        }
        if let Some(p) = overrides.mapping_path {
            self.mapping_path = p;
        }
        if let Some(p) = overrides.output_folder {
            self.output_folder = p;
        }
        if let Some(e) = overrides.encoding {
            self.encoding = Some(e);
        }
        if let Some(n) = overrides.max_workers {
            self.max_workers = n;
        }
        self
    }

    /// Check the values the conversion core relies on
    pub fn validate(&self) -> ConvertResult<()> {
        if !self.template_path.is_file() {
            return Err(ConvertError::Config(format!(
                "template not found: {}",
                self.template_path.display()
            )));
        }
        if !self.mapping_path.is_file() {
            return Err(ConvertError::Config(format!(
                "mapping file not found: {}",
                self.mapping_path.display()
            )));
        }
        if self.max_workers == 0 {
            return Err(ConvertError::Config(
                "MaxWorkers must be at least 1".to_string(),
            ));
        }
        self.delimiter_char()?;
        Ok(())
    }

    pub fn delimiter_char(&self) -> ConvertResult<char> {
        let mut chars = self.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConvertError::Config(format!(
                "Delimiter must be exactly one character, got '{}'",
                self.delimiter
            ))),
        }
    }

    /// Create the input and output folders if they are missing
    pub fn ensure_folders(&self, diagnostics: &dyn Diagnostics) -> ConvertResult<()> {
        for folder in [&self.input_folder, &self.output_folder] {
            if !folder.is_dir() {
                fs::create_dir_all(folder).map_err(|e| ConvertError::io_at(folder, e))?;
                diagnostics.info(&format!("Created missing folder: {}", folder.display()));
            }
        }
        Ok(())
    }

    /// Settings handed to each conversion
    pub fn conversion(&self) -> ConvertResult<ConversionSettings> {
        let mut settings = ConversionSettings::new(
            &self.template_path,
            &self.mapping_path,
            &self.output_folder,
        )
        .with_delimiter(self.delimiter_char()?);
        settings.encoding = self.encoding.clone();
        Ok(settings)
    }
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
