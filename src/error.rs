use std::path::Path;
use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error: {0}")]
    IoPath(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Wrap an I/O failure together with the path it happened on
    pub fn io_at(path: &Path, err: impl std::fmt::Display) -> Self {
        ConvertError::IoPath(format!("{}: {}", path.display(), err))
    }

    pub fn is_io(&self) -> bool {
        matches!(self, ConvertError::Io(_) | ConvertError::IoPath(_))
    }

    pub fn is_format(&self) -> bool {
        matches!(self, ConvertError::Format(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, ConvertError::Config(_))
    }
}
