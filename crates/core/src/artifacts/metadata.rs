//! Compiler metadata embedded in a Foundry artifact
//!
//! Only the three top-level keys consumed by the bundler are modelled;
//! their contents stay opaque JSON.

use serde_json::Value;

/// The `metadata` object of a compiler artifact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub language: Value,
    pub sources: Option<Value>,
    pub settings: Option<Value>,
}

impl Metadata {
    /// Extracts metadata from an artifact's `metadata` value
    ///
    /// Returns `None` unless the value is a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        Some(Self {
            language: object.get("language").cloned().unwrap_or(Value::Null),
            sources: object.get("sources").cloned(),
            settings: object.get("settings").cloned(),
        })
    }
}
