//! Binding Foundry broadcast records to compiler artifacts
//!
//! The broadcast tree is expected to look like:
//! ```text
//! broadcast/
//!   Deploy.s.sol/
//!     11155111/
//!       run-latest.json
//!     1/
//!       run-latest.json
//! ```
//! Every `transactions[]` entry carrying both `contractName` and
//! `contractAddress` becomes one [`ContractRecord`].

use crate::{
    artifacts::{ArtifactIndex, CompilerArtifact, VerificationArtifact},
    error::BundleError,
    sources::SourceResolver,
    utils,
};
use eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// File name of the record written for the latest run of a script
pub const RUN_LATEST_FILE: &str = "run-latest.json";

/// Per-directory contract records, keyed by [`DirectoryKey`]
pub type AllContracts = BTreeMap<String, Vec<ContractRecord>>;

/// A deployed contract with its rebuilt verification payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    pub contract_address: String,
    pub contract_name: String,
    pub artifact: VerificationArtifact,
}

/// A `run-latest.json` document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentRecord {
    pub transactions: Vec<Value>,
}

impl DeploymentRecord {
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let value: Value = utils::read_json(path)?;
        let transactions = match value.get("transactions") {
            Some(Value::Array(transactions)) => transactions.clone(),
            _ => {
                return Err(BundleError::InvalidDeploymentRecord {
                    path: path.to_path_buf(),
                    reason: "missing or invalid `transactions` array".to_string(),
                })
            }
        };
        Ok(Self { transactions })
    }

    /// Deployed `(name, address)` pairs in record order
    pub fn deployments(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.transactions.iter().filter_map(|tx| {
            let entry = TransactionEntry::deserialize(tx).ok()?;
            Some((entry.contract_name?, entry.contract_address?))
        })
    }
}

/// The fields of a broadcast transaction used for binding
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
}

/// How chain directories are turned into result keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectoryKey {
    /// Chain directory name only; records from different scripts merge
    #[default]
    Chain,
    /// `{script}/{chain}`
    ScriptAndChain,
}

impl DirectoryKey {
    pub fn key(&self, script: &str, chain: &str) -> String {
        match self {
            DirectoryKey::Chain => chain.to_string(),
            DirectoryKey::ScriptAndChain => format!("{script}/{chain}"),
        }
    }
}

/// A failure absorbed while binding
#[derive(Debug)]
pub struct Skipped {
    pub directory: String,
    pub contract: Option<String>,
    pub error: BundleError,
}

/// Two script directories mapped to the same key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: String,
    pub first_script: String,
    pub script: String,
}

/// Outcome of [`Binder::bind`]
#[derive(Debug, Default)]
pub struct BindReport {
    pub contracts: AllContracts,
    pub skipped: Vec<Skipped>,
    pub collisions: Vec<KeyCollision>,
    /// Sources that ended up with placeholder content, as `(key, contract, path)`
    pub unavailable_sources: Vec<(String, String, String)>,
}

impl BindReport {
    pub fn contract_count(&self) -> usize {
        self.contracts.values().map(Vec::len).sum()
    }
}

/// Walks a broadcast directory and rebuilds payloads from an output directory
#[derive(Debug, Clone)]
pub struct Binder {
    pub broadcast_dir: PathBuf,
    pub out_dir: PathBuf,
    pub resolver: SourceResolver,
    pub directory_key: DirectoryKey,
}

impl Binder {
    pub fn new(broadcast_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            broadcast_dir: broadcast_dir.into(),
            out_dir: out_dir.into(),
            resolver: SourceResolver::from_current_dir(),
            directory_key: DirectoryKey::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: SourceResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_directory_key(mut self, directory_key: DirectoryKey) -> Self {
        self.directory_key = directory_key;
        self
    }

    /// Binds every `run-latest.json` found two levels below the broadcast root
    ///
    /// Only failing to list the broadcast root itself is an error.
    pub fn bind(&self) -> Result<BindReport> {
        let scripts =
            list_subdirs(&self.broadcast_dir).map_err(|source| BundleError::BroadcastRoot {
                path: self.broadcast_dir.clone(),
                source,
            })?;

        let index = ArtifactIndex::build(&self.out_dir);
        let mut state = BindState {
            index,
            report: BindReport::default(),
            key_owner: HashMap::new(),
            loaded: HashMap::new(),
        };

        for (script, script_path) in scripts {
            let chains = match list_subdirs(&script_path) {
                Ok(chains) => chains,
                Err(source) => {
                    let error = BundleError::io(&script_path, source);
                    warn!("Error reading directory {}: {}", script, error);
                    state.report.skipped.push(Skipped {
                        directory: script,
                        contract: None,
                        error,
                    });
                    continue;
                }
            };

            for (chain, chain_path) in chains {
                let record_path = chain_path.join(RUN_LATEST_FILE);
                if !record_path.is_file() {
                    continue;
                }

                info!("Found {} in {}/{}", RUN_LATEST_FILE, script, chain);
                let key = self.directory_key.key(&script, &chain);
                state.claim_key(&key, &script);
                self.process_directory(&mut state, &key, &record_path);
            }
        }

        Ok(state.report)
    }

    fn process_directory(&self, state: &mut BindState, key: &str, record_path: &Path) {
        state.report.contracts.entry(key.to_string()).or_default();

        let record = match DeploymentRecord::load(record_path) {
            Ok(record) => record,
            Err(error) => {
                warn!("Failed to read {} for {}: {}", RUN_LATEST_FILE, key, error);
                state.report.skipped.push(Skipped {
                    directory: key.to_string(),
                    contract: None,
                    error,
                });
                return;
            }
        };

        for (contract_name, contract_address) in record.deployments() {
            match self.build_record(state, key, &contract_name, &contract_address) {
                Ok(record) => {
                    debug!("Bound {} at {} in {}", contract_name, contract_address, key);
                    state
                        .report
                        .contracts
                        .entry(key.to_string())
                        .or_default()
                        .push(record);
                }
                Err(error) => {
                    warn!("Skipping {} in {}: {}", contract_name, key, error);
                    state.report.skipped.push(Skipped {
                        directory: key.to_string(),
                        contract: Some(contract_name),
                        error,
                    });
                }
            }
        }
    }

    fn build_record(
        &self,
        state: &mut BindState,
        key: &str,
        contract_name: &str,
        contract_address: &str,
    ) -> Result<ContractRecord, BundleError> {
        let path = state.index.locate(contract_name)?;
        let compiled = state.load_artifact(&path)?;
        let built = VerificationArtifact::build(&compiled, &self.resolver, &path)?;

        for source in &built.sources.remapped {
            debug!("Read {} from node_modules for {}", source, contract_name);
        }
        for source in &built.sources.malformed {
            warn!("Ignoring malformed source entry {} for {}", source, contract_name);
        }
        for source in &built.sources.unavailable {
            warn!("Content for {} not available ({})", source, contract_name);
            state.report.unavailable_sources.push((
                key.to_string(),
                contract_name.to_string(),
                source.clone(),
            ));
        }

        Ok(ContractRecord {
            contract_address: contract_address.to_string(),
            contract_name: contract_name.to_string(),
            artifact: built.artifact,
        })
    }
}

/// Binds `broadcast_dir` against `out_dir` with default options
pub fn bind(broadcast_dir: &Path, out_dir: &Path) -> Result<AllContracts> {
    Ok(Binder::new(broadcast_dir, out_dir).bind()?.contracts)
}

struct BindState {
    index: ArtifactIndex,
    report: BindReport,
    key_owner: HashMap<String, String>,
    loaded: HashMap<PathBuf, CompilerArtifact>,
}

impl BindState {
    fn claim_key(&mut self, key: &str, script: &str) {
        match self.key_owner.get(key) {
            Some(first) if first != script => {
                warn!(
                    "Directory key {} from {} is already used by {}; merging records",
                    key, script, first
                );
                self.report.collisions.push(KeyCollision {
                    key: key.to_string(),
                    first_script: first.clone(),
                    script: script.to_string(),
                });
            }
            Some(_) => {}
            None => {
                self.key_owner.insert(key.to_string(), script.to_string());
            }
        }
    }

    fn load_artifact(&mut self, path: &Path) -> Result<CompilerArtifact, BundleError> {
        if let Some(artifact) = self.loaded.get(path) {
            return Ok(artifact.clone());
        }
        let artifact = CompilerArtifact::load(path)?;
        self.loaded.insert(path.to_path_buf(), artifact.clone());
        Ok(artifact)
    }
}

/// Immediate subdirectories of `dir` as `(name, path)`, sorted by name
fn list_subdirs(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }

    dirs.sort();
    Ok(dirs)
}
