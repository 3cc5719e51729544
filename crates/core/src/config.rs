//! Configuration types for bundling and submission

use crate::{
    artifacts::writer::DEFAULT_OUTPUT_FILE, deployment::DirectoryKey, error::BundleError,
    sources::SourceResolver,
};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FOUNDRY_TOML: &str = "foundry.toml";
const DEFAULT_PROFILE: &str = "default";

/// Main configuration for a bundling run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleConfig {
    /// Project root; relative paths below are resolved against it,
    /// and so are relative source paths in compiler metadata
    pub project_root: PathBuf,

    /// Root of the Foundry broadcast records
    pub broadcast_dir: PathBuf,

    /// Root of the compiler artifacts
    pub out_dir: PathBuf,

    /// Where the per-directory results are written
    pub output_path: PathBuf,

    /// How chain directories become result keys
    pub directory_key: DirectoryKey,

    /// Verification endpoint; submission is skipped when unset
    pub api_url: Option<String>,

    /// Which view is submitted to the endpoint
    pub payload: PayloadKind,
}

/// Result view sent to the verification endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// Contracts keyed by name, with addresses per directory
    #[default]
    Grouped,
    /// Contracts keyed by directory
    Raw,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            broadcast_dir: PathBuf::from("broadcast"),
            out_dir: PathBuf::from("out"),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            directory_key: DirectoryKey::Chain,
            api_url: None,
            payload: PayloadKind::Grouped,
        }
    }
}

impl BundleConfig {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Returns the broadcast directory relative to the project root
    pub fn broadcast_directory(&self) -> PathBuf {
        self.resolve(&self.broadcast_dir)
    }

    /// Returns the artifacts directory relative to the project root
    pub fn out_directory(&self) -> PathBuf {
        self.resolve(&self.out_dir)
    }

    /// Returns the results file relative to the project root
    pub fn output_file(&self) -> PathBuf {
        self.resolve(&self.output_path)
    }

    pub fn source_resolver(&self) -> SourceResolver {
        SourceResolver::new(&self.project_root)
    }

    /// Validates the entire configuration
    pub fn validate(&self) -> Result<(), BundleError> {
        if self.output_path.as_os_str().is_empty() {
            return Err(BundleError::InvalidConfig(
                "output path cannot be empty".to_string(),
            ));
        }

        if let Some(url) = &self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(BundleError::InvalidConfig(format!(
                    "API URL must start with http:// or https://, got '{url}'"
                )));
            }
        }

        Ok(())
    }

    /// Create a new builder for BundleConfig
    pub fn builder() -> BundleConfigBuilder {
        BundleConfigBuilder::default()
    }
}

/// Builder for creating BundleConfig with a fluent API
#[derive(Default)]
pub struct BundleConfigBuilder {
    config: BundleConfig,
}

impl BundleConfigBuilder {
    pub fn project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.project_root = path.into();
        self
    }

    pub fn broadcast_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.broadcast_dir = path.into();
        self
    }

    pub fn out_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.out_dir = path.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn directory_key(mut self, directory_key: DirectoryKey) -> Self {
        self.config.directory_key = directory_key;
        self
    }

    pub fn api_url(mut self, url: Option<String>) -> Self {
        self.config.api_url = url;
        self
    }

    pub fn payload(mut self, payload: PayloadKind) -> Self {
        self.config.payload = payload;
        self
    }

    /// Take `out` and `broadcast` from a Foundry profile
    pub fn foundry_profile(mut self, profile: &FoundryProfile) -> Self {
        if let Some(out) = &profile.out {
            self.config.out_dir = out.clone();
        }
        if let Some(broadcast) = &profile.broadcast {
            self.config.broadcast_dir = broadcast.clone();
        }
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<BundleConfig, BundleError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Directory settings read from a `foundry.toml` profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoundryProfile {
    pub out: Option<PathBuf>,
    pub broadcast: Option<PathBuf>,
}

impl FoundryProfile {
    /// Reads `[profile.<name>]` from `project_root/foundry.toml`
    ///
    /// Returns `None` when the file does not exist. Keys missing from the
    /// named profile fall back to `[profile.default]`.
    pub fn load(project_root: &Path, name: Option<&str>) -> Result<Option<Self>> {
        let path = project_root.join(FOUNDRY_TOML);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let toml: toml::Value = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let profiles = toml.get("profile").and_then(|p| p.as_table());
        let lookup = |profile: &str, key: &str| {
            profiles
                .and_then(|p| p.get(profile))
                .and_then(|p| p.get(key))
                .and_then(|v| v.as_str())
                .map(PathBuf::from)
        };
        let name = name.unwrap_or(DEFAULT_PROFILE);
        let field = |key: &str| lookup(name, key).or_else(|| lookup(DEFAULT_PROFILE, key));

        Ok(Some(Self {
            out: field("out"),
            broadcast: field("broadcast"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = BundleConfig::default();
        assert_eq!(config.broadcast_directory(), PathBuf::from("./broadcast"));
        assert_eq!(config.out_directory(), PathBuf::from("./out"));
        assert_eq!(config.output_file(), PathBuf::from("./processed-contracts.json"));
        assert_eq!(config.directory_key, DirectoryKey::Chain);
        assert_eq!(config.payload, PayloadKind::Grouped);
        assert!(config.api_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_basic() {
        let config = BundleConfig::builder()
            .project_root("/project")
            .broadcast_dir("deployments")
            .out_dir("/abs/out")
            .output_path("results/contracts.json")
            .directory_key(DirectoryKey::ScriptAndChain)
            .api_url(Some("https://verify.example.com/api".to_string()))
            .payload(PayloadKind::Raw)
            .build()
            .unwrap();

        assert_eq!(config.broadcast_directory(), PathBuf::from("/project/deployments"));
        assert_eq!(config.out_directory(), PathBuf::from("/abs/out"));
        assert_eq!(
            config.output_file(),
            PathBuf::from("/project/results/contracts.json")
        );
        assert_eq!(config.source_resolver().root(), Path::new("/project"));
        assert_eq!(config.payload, PayloadKind::Raw);
    }

    #[test]
    fn test_validation() {
        let err = BundleConfig::builder().output_path("").build().unwrap_err();
        assert!(matches!(err, BundleError::InvalidConfig(_)));

        let err = BundleConfig::builder()
            .api_url(Some("ftp://example.com".to_string()))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_foundry_profile() {
        let temp_dir = TempDir::new().unwrap();
        assert!(FoundryProfile::load(temp_dir.path(), None).unwrap().is_none());

        std::fs::write(
            temp_dir.path().join(FOUNDRY_TOML),
            r#"
[profile.default]
src = "src"
out = "artifacts"
libs = ["lib"]

[profile.ci]
broadcast = "ci-broadcast"
"#,
        )
        .unwrap();

        let default = FoundryProfile::load(temp_dir.path(), None).unwrap().unwrap();
        assert_eq!(default.out, Some(PathBuf::from("artifacts")));
        assert_eq!(default.broadcast, None);

        let ci = FoundryProfile::load(temp_dir.path(), Some("ci"))
            .unwrap()
            .unwrap();
        assert_eq!(ci.out, Some(PathBuf::from("artifacts")));
        assert_eq!(ci.broadcast, Some(PathBuf::from("ci-broadcast")));

        let config = BundleConfig::builder()
            .foundry_profile(&ci)
            .build()
            .unwrap();
        assert_eq!(config.out_dir, PathBuf::from("artifacts"));
        assert_eq!(config.broadcast_dir, PathBuf::from("ci-broadcast"));
    }

    #[test]
    fn test_invalid_foundry_toml() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(FOUNDRY_TOML), "[profile.default\n").unwrap();
        assert!(FoundryProfile::load(temp_dir.path(), None).is_err());
    }
}
