//! Typed failures that the binder absorbs per item or per directory

use std::path::PathBuf;

/// Error type for recoverable bundling failures
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error reading broadcast directory {}: {source}", path.display())]
    BroadcastRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact not found for contract {contract} under {}", out_dir.display())]
    ArtifactNotFound { contract: String, out_dir: PathBuf },

    #[error("Missing or malformed metadata in artifact {}", path.display())]
    MissingMetadata { path: PathBuf },

    #[error("Invalid deployment record {}: {reason}", path.display())]
    InvalidDeploymentRecord { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BundleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
