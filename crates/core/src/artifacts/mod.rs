//! Compiler artifacts and the verification payloads rebuilt from them

use crate::{
    error::BundleError,
    settings::{normalize_settings, VerificationSettings},
    sources::{ResolvedSources, SourceContent, SourceResolver},
    utils,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, path::Path};

pub mod locator;
pub mod metadata;
pub mod writer;

pub use locator::{find_artifacts, locate_artifact, ArtifactIndex};
pub use metadata::Metadata;

/// Solidity ABI kept as raw JSON
pub type Abi = Value;

/// A `{ContractName}.json` file from the compiler output directory
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompilerArtifact {
    #[serde(default)]
    pub bytecode: Value,
    #[serde(default)]
    pub abi: Abi,
    #[serde(default)]
    pub metadata: Value,
}

impl CompilerArtifact {
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        utils::read_json(path)
    }
}

/// Everything a verification service needs to recompile one contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationArtifact {
    #[serde(default)]
    pub deployed_bytecode: Value,
    #[serde(default)]
    pub abi: Abi,
    #[serde(default)]
    pub language: Value,
    pub settings: VerificationSettings,
    #[serde(default)]
    pub sources: BTreeMap<String, SourceContent>,
}

/// A built payload plus what happened to its sources
#[derive(Debug, Clone)]
pub struct BuiltArtifact {
    pub artifact: VerificationArtifact,
    pub sources: ResolvedSources,
}

impl VerificationArtifact {
    /// Rebuilds the payload from a compiler artifact
    ///
    /// Fails only when the artifact carries no metadata object.
    pub fn build(
        compiled: &CompilerArtifact,
        resolver: &SourceResolver,
        path: &Path,
    ) -> Result<BuiltArtifact, BundleError> {
        let metadata =
            Metadata::from_value(&compiled.metadata).ok_or_else(|| BundleError::MissingMetadata {
                path: path.to_path_buf(),
            })?;

        let resolved = resolver.resolve(metadata.sources.as_ref());

        let artifact = Self {
            deployed_bytecode: compiled.bytecode.clone(),
            abi: compiled.abi.clone(),
            language: metadata.language,
            settings: normalize_settings(metadata.settings.as_ref()),
            sources: resolved.sources.clone(),
        };

        Ok(BuiltArtifact {
            artifact,
            sources: resolved,
        })
    }
}
