use crate::error::{ConvertError, ConvertResult};
use crate::types::Mapping;
use std::path::Path;

/// Load a mapping file from disk
pub fn load_mapping(path: &Path) -> ConvertResult<Mapping> {
    let content = std::fs::read_to_string(path).map_err(|e| ConvertError::io_at(path, e))?;
    Mapping::from_json_str(&content).map_err(|e| match e {
        ConvertError::Config(msg) => {
            ConvertError::Config(format!("mapping '{}': {}", path.display(), msg))
        }
        other => other,
    })
}

impl Mapping {
    /// Parse mapping JSON. Field values are not checked here.
    pub fn from_json_str(json: &str) -> ConvertResult<Mapping> {
        let parsed: Option<Mapping> = serde_json::from_str(json)
            .map_err(|e| ConvertError::Config(format!("invalid mapping JSON: {}", e)))?;
        parsed.ok_or_else(|| ConvertError::Config("mapping document is empty".to_string()))
    }
}
