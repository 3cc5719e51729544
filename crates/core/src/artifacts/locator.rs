//! Lookup of `{ContractName}.json` artifacts under an output directory

use crate::error::BundleError;
use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

fn artifact_file_name(contract_name: &str) -> OsString {
    OsString::from(format!("{contract_name}.json"))
}

/// Walks `out_dir` in file-name order, yielding files and links to files
fn artifact_files(out_dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(out_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("Skipping unreadable output entry: {}", err);
                None
            }
        })
        .filter(|e| e.path().is_file())
}

/// Returns every artifact file for `contract_name`, in traversal order
pub fn find_artifacts(out_dir: &Path, contract_name: &str) -> Vec<PathBuf> {
    let file_name = artifact_file_name(contract_name);
    artifact_files(out_dir)
        .filter(|e| e.file_name() == file_name)
        .map(|e| e.into_path())
        .collect()
}

fn pick_first(
    candidates: &[PathBuf],
    out_dir: &Path,
    contract_name: &str,
) -> Result<PathBuf, BundleError> {
    match candidates {
        [] => Err(BundleError::ArtifactNotFound {
            contract: contract_name.to_string(),
            out_dir: out_dir.to_path_buf(),
        }),
        [only] => Ok(only.clone()),
        [first, ..] => {
            tracing::warn!(
                "Found {} artifacts for {}, using {}: {:?}",
                candidates.len(),
                contract_name,
                first.display(),
                candidates
            );
            Ok(first.clone())
        }
    }
}

/// Finds the artifact for `contract_name`
///
/// When several files match, the first in sorted traversal order wins.
pub fn locate_artifact(out_dir: &Path, contract_name: &str) -> Result<PathBuf, BundleError> {
    let candidates = find_artifacts(out_dir, contract_name);
    pick_first(&candidates, out_dir, contract_name)
}

/// All `*.json` files under an output directory, indexed by file name
#[derive(Debug, Clone, Default)]
pub struct ArtifactIndex {
    out_dir: PathBuf,
    by_name: BTreeMap<OsString, Vec<PathBuf>>,
}

impl ArtifactIndex {
    /// Walks `out_dir` once and records every JSON file
    pub fn build(out_dir: &Path) -> Self {
        let mut by_name: BTreeMap<OsString, Vec<PathBuf>> = BTreeMap::new();

        for entry in artifact_files(out_dir) {
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                by_name
                    .entry(entry.file_name().to_os_string())
                    .or_default()
                    .push(entry.into_path());
            }
        }

        tracing::debug!(
            "Indexed {} artifact names under {}",
            by_name.len(),
            out_dir.display()
        );

        Self {
            out_dir: out_dir.to_path_buf(),
            by_name,
        }
    }

    /// Same answer as [`locate_artifact`] without walking the tree again
    pub fn locate(&self, contract_name: &str) -> Result<PathBuf, BundleError> {
        let candidates = self
            .by_name
            .get(&artifact_file_name(contract_name))
            .map(Vec::as_slice)
            .unwrap_or_default();
        pick_first(candidates, &self.out_dir, contract_name)
    }

    pub fn candidates(&self, contract_name: &str) -> &[PathBuf] {
        self.by_name
            .get(&artifact_file_name(contract_name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
