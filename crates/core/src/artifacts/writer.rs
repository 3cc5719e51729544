//! Persisting bundling results to disk

use crate::{deployment::AllContracts, grouping::GroupedContracts, utils};
use eyre::{Context, Result};
use std::path::Path;
use tracing::info;

/// Default file name for the per-directory results
pub const DEFAULT_OUTPUT_FILE: &str = "processed-contracts.json";

/// Writes the per-directory contract list, pretty-printed
pub fn save_contracts(contracts: &AllContracts, output_path: &Path) -> Result<()> {
    utils::write_json(output_path, contracts)
        .with_context(|| format!("Failed to write results: {}", output_path.display()))?;

    info!("Results written to {}", output_path.display());
    Ok(())
}

/// Reads back a file written by [`save_contracts`]
pub fn load_contracts(path: &Path) -> Result<AllContracts> {
    utils::read_json(path).with_context(|| format!("Failed to read results: {}", path.display()))
}

/// Renders the grouped view for display
pub fn render_grouped(grouped: &GroupedContracts) -> Result<String> {
    serde_json::to_string_pretty(grouped).context("Failed to serialize grouped contracts")
}
