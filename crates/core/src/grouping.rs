//! Regrouping per-directory results by contract name

use crate::{artifacts::VerificationArtifact, deployment::AllContracts};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One contract name with every address it was deployed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractGroup {
    pub artifact: VerificationArtifact,
    /// Directory key -> address
    pub contract_addresses: BTreeMap<String, String>,
}

pub type GroupedContracts = BTreeMap<String, ContractGroup>;

/// Groups records by contract name
///
/// Directory keys are visited in sorted order, so the stored artifact is the
/// one from the last record of the greatest key. Addresses from every key
/// are kept.
pub fn group_by_name(contracts: &AllContracts) -> GroupedContracts {
    let mut grouped = GroupedContracts::new();

    for (key, records) in contracts {
        for record in records {
            let group = grouped
                .entry(record.contract_name.clone())
                .and_modify(|group| group.artifact = record.artifact.clone())
                .or_insert_with(|| ContractGroup {
                    artifact: record.artifact.clone(),
                    contract_addresses: BTreeMap::new(),
                });
            group
                .contract_addresses
                .insert(key.clone(), record.contract_address.clone());
        }
    }

    grouped
}
