//! Full bundling run: bind, persist, group

use crate::{
    artifacts::writer::save_contracts,
    config::{BundleConfig, PayloadKind},
    deployment::{AllContracts, BindReport, Binder},
    grouping::{group_by_name, GroupedContracts},
};
use eyre::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

/// Everything produced by one run
#[derive(Debug)]
pub struct BundleOutput {
    pub contracts: AllContracts,
    pub grouped: GroupedContracts,
    pub report: BindReport,
}

impl BundleOutput {
    /// The JSON document sent to the verification endpoint
    pub fn payload(&self, kind: PayloadKind) -> Result<Value> {
        let value = match kind {
            PayloadKind::Grouped => serde_json::to_value(&self.grouped),
            PayloadKind::Raw => serde_json::to_value(&self.contracts),
        };
        value.context("Failed to serialize payload")
    }
}

/// Binds the configured broadcast tree and writes the per-directory results
pub fn bundle(config: &BundleConfig) -> Result<BundleOutput> {
    config.validate()?;

    info!(
        "Processing all directories with run-latest.json in {}",
        config.broadcast_directory().display()
    );

    let mut report = Binder::new(config.broadcast_directory(), config.out_directory())
        .with_resolver(config.source_resolver())
        .with_directory_key(config.directory_key)
        .bind()?;

    let count = report.contract_count();
    let contracts = std::mem::take(&mut report.contracts);
    save_contracts(&contracts, &config.output_file())?;

    if !report.skipped.is_empty() {
        warn!("Skipped {} entries while binding", report.skipped.len());
    }
    info!(
        "Bound {} contracts across {} directories",
        count,
        contracts.len()
    );

    let grouped = group_by_name(&contracts);

    Ok(BundleOutput {
        contracts,
        grouped,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{artifacts::writer::load_contracts, settings::OutputSelection};
    use serde_json::json;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn write_json(path: &Path, value: &Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn create_project(root: &Path) {
        write_json(
            &root.join("broadcast/Script/Sepolia/run-latest.json"),
            &json!({"transactions": [{"contractName": "Token", "contractAddress": "0xAAA"}]}),
        );
        write_json(
            &root.join("out/Token.json"),
            &json!({
                "bytecode": "0x60",
                "abi": [],
                "metadata": {
                    "language": "Solidity",
                    "sources": {"src/Token.sol": {"content": "contract Token{}"}},
                    "settings": {"evmVersion": "paris", "optimizer": {"enabled": true}}
                }
            }),
        );
    }

    #[test]
    fn test_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        create_project(temp_dir.path());

        let config = BundleConfig::builder()
            .project_root(temp_dir.path())
            .build()
            .unwrap();
        let output = bundle(&config).unwrap();

        let written: Value = serde_json::from_str(
            &fs::read_to_string(temp_dir.path().join("processed-contracts.json")).unwrap(),
        )
        .unwrap();

        let expected = json!({
            "Sepolia": [{
                "contractAddress": "0xAAA",
                "contractName": "Token",
                "artifact": {
                    "deployedBytecode": "0x60",
                    "abi": [],
                    "language": "Solidity",
                    "settings": {
                        "evmVersion": "paris",
                        "optimizer": {"enabled": true},
                        "outputSelection": serde_json::to_value(OutputSelection::default()).unwrap(),
                        "remappings": []
                    },
                    "sources": {"src/Token.sol": {"content": "contract Token{}"}}
                }
            }]
        });

        assert_eq!(written, expected);
        assert_eq!(load_contracts(&config.output_file()).unwrap(), output.contracts);
        assert_eq!(output.grouped["Token"].contract_addresses["Sepolia"], "0xAAA");
        assert!(output.report.skipped.is_empty());
    }

    #[test]
    fn test_payload_kinds() {
        let temp_dir = TempDir::new().unwrap();
        create_project(temp_dir.path());

        let config = BundleConfig::builder()
            .project_root(temp_dir.path())
            .output_path("results/out.json")
            .build()
            .unwrap();
        let output = bundle(&config).unwrap();

        let grouped = output.payload(PayloadKind::Grouped).unwrap();
        assert_eq!(grouped["Token"]["contractAddresses"], json!({"Sepolia": "0xAAA"}));

        let raw = output.payload(PayloadKind::Raw).unwrap();
        assert_eq!(raw["Sepolia"][0]["contractName"], "Token");
        assert!(temp_dir.path().join("results/out.json").is_file());
    }

    #[test]
    fn test_missing_broadcast_is_fatal() {
        let temp_dir = TempDir::new().unwrap();

        let config = BundleConfig::builder()
            .project_root(temp_dir.path())
            .build()
            .unwrap();

        assert!(bundle(&config).is_err());
        assert!(!temp_dir.path().join("processed-contracts.json").exists());
    }
}
