//! Compiler settings reduced to what a verifier needs to recompile

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Outputs requested for every contract in every file
pub const OUTPUT_SELECTION: &[&str] = &[
    "abi",
    "devdoc",
    "userdoc",
    "storageLayout",
    "evm.bytecode.object",
    "evm.bytecode.sourceMap",
    "evm.bytecode.linkReferences",
    "evm.deployedBytecode.object",
    "evm.deployedBytecode.sourceMap",
    "evm.deployedBytecode.linkReferences",
    "evm.deployedBytecode.immutableReferences",
    "metadata",
];

/// `outputSelection` as file pattern -> contract pattern -> outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSelection(pub BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl Default for OutputSelection {
    fn default() -> Self {
        let outputs = OUTPUT_SELECTION.iter().map(|s| s.to_string()).collect();
        let contracts = BTreeMap::from([("*".to_string(), outputs)]);
        Self(BTreeMap::from([("*".to_string(), contracts)]))
    }
}

/// Settings block of a verification payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libraries: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<Value>,
    #[serde(default)]
    pub output_selection: OutputSelection,
    #[serde(default)]
    pub remappings: Vec<Value>,
}

/// Builds verification settings from `metadata.settings`
///
/// `outputSelection` is always replaced by [`OutputSelection::default`],
/// even when `settings` is absent or not an object.
pub fn normalize_settings(settings: Option<&Value>) -> VerificationSettings {
    let field = |key: &str| {
        settings
            .and_then(|s| s.get(key))
            .filter(|v| !v.is_null())
            .cloned()
    };

    VerificationSettings {
        evm_version: field("evmVersion"),
        metadata: field("metadata"),
        libraries: field("libraries"),
        optimizer: field("optimizer"),
        output_selection: OutputSelection::default(),
        remappings: resolve_remappings(settings.and_then(|s| s.get("remappings"))),
    }
}

/// Returns the remapping array as is, or empty for anything else
pub fn resolve_remappings(remappings: Option<&Value>) -> Vec<Value> {
    match remappings {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}
