//! Verification payloads rebuilt from Foundry broadcasts and compiler artifacts
#[cfg(feature = "api")]
pub mod api;
pub mod artifacts;
mod bundler;
pub mod config;
pub mod deployment;
mod error;
pub mod grouping;
pub mod settings;
pub mod sources;
mod utils;

#[cfg(feature = "api")]
pub use api::{ApiError, VerificationClient};
pub use artifacts::{
    find_artifacts, locate_artifact, ArtifactIndex, CompilerArtifact, Metadata,
    VerificationArtifact,
};
pub use bundler::{bundle, BundleOutput};
pub use config::{BundleConfig, BundleConfigBuilder, FoundryProfile, PayloadKind};
pub use deployment::{bind, AllContracts, BindReport, Binder, ContractRecord, DirectoryKey};
pub use error::BundleError;
pub use grouping::{group_by_name, ContractGroup, GroupedContracts};
pub use settings::{normalize_settings, OutputSelection, VerificationSettings};
pub use sources::{resolve_sources, ResolvedSources, SourceContent, SourceResolver};
pub use utils::{read_json, write_json};
