//! JSON file helpers

use crate::error::BundleError;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Reads and parses a JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, BundleError> {
    let content = std::fs::read_to_string(path).map_err(|e| BundleError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| BundleError::json(path, e))
}

/// Writes a JSON document pretty-printed with 2-space indent
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), BundleError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| BundleError::json(path, e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BundleError::io(parent, e))?;
    }

    std::fs::write(path, json).map_err(|e| BundleError::io(path, e))
}
