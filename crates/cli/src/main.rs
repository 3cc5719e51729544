//! CLI for the broadcast-bundler library
//!
//! Rebuilds verification payloads from Foundry broadcasts and optionally
//! submits them to a verification endpoint.

use broadcast_bundler::{
    artifacts::writer::render_grouped, bundle, ApiError, BundleConfig, BundleError,
    DirectoryKey, FoundryProfile, PayloadKind, VerificationClient,
};
use clap::Parser;
use eyre::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

const FOUNDRY_PROFILE_ENV: &str = "FOUNDRY_PROFILE";

/// Foundry broadcast verification bundler
#[derive(Parser, Debug)]
#[command(name = "broadcast-bundler")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Deployment-record root [default: ./broadcast, or foundry.toml]
    #[arg(long)]
    broadcast: Option<PathBuf>,

    /// Compiler-output root [default: ./out, or foundry.toml]
    #[arg(long)]
    out: Option<PathBuf>,

    /// Verification endpoint; nothing is submitted when omitted
    #[arg(long)]
    api: Option<String>,

    /// File receiving the per-directory results
    #[arg(long, default_value = "processed-contracts.json")]
    output: PathBuf,

    /// Submit the per-directory results instead of the grouped view
    #[arg(long)]
    raw: bool,

    /// Key results by `script/chain` instead of the chain directory alone
    #[arg(long)]
    key_by_script: bool,

    /// Project root holding foundry.toml and the compiled sources
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// foundry.toml profile [default: $FOUNDRY_PROFILE, or "default"]
    #[arg(long)]
    profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all logging except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::ERROR
        } else if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }

    /// Flags win over foundry.toml, which wins over built-in defaults
    fn bundle_config(&self) -> Result<BundleConfig> {
        let profile = self
            .profile
            .clone()
            .or_else(|| std::env::var(FOUNDRY_PROFILE_ENV).ok());
        let foundry = FoundryProfile::load(&self.root, profile.as_deref())?.unwrap_or_default();

        let mut builder = BundleConfig::builder()
            .project_root(&self.root)
            .foundry_profile(&foundry)
            .output_path(&self.output)
            .api_url(self.api.clone())
            .payload(if self.raw {
                PayloadKind::Raw
            } else {
                PayloadKind::Grouped
            })
            .directory_key(if self.key_by_script {
                DirectoryKey::ScriptAndChain
            } else {
                DirectoryKey::Chain
            });

        if let Some(broadcast) = &self.broadcast {
            builder = builder.broadcast_dir(broadcast);
        }
        if let Some(out) = &self.out {
            builder = builder.out_dir(out);
        }

        Ok(builder.build()?)
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status")]
enum Output {
    #[serde(rename = "error")]
    Error {
        error_type: &'static str,
        message: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        output_error(e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.bundle_config()?;
    let output = bundle(&config)?;

    println!("{}", render_grouped(&output.grouped)?);

    let Some(url) = &config.api_url else {
        info!("No API URL provided, skipping submission");
        return Ok(());
    };

    let payload = output.payload(config.payload)?;
    let client = VerificationClient::new(url.as_str());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    info!("Submitting {} payload to {}", payload_name(config.payload), url);
    runtime.block_on(client.submit(&payload))?;
    info!("Successfully sent data to API");

    Ok(())
}

fn payload_name(kind: PayloadKind) -> &'static str {
    match kind {
        PayloadKind::Grouped => "grouped",
        PayloadKind::Raw => "raw",
    }
}

fn error_type(error: &eyre::Report) -> &'static str {
    if error.downcast_ref::<ApiError>().is_some() {
        return "api_error";
    }
    if error.downcast_ref::<toml::de::Error>().is_some() {
        return "config_error";
    }

    match error.downcast_ref::<BundleError>() {
        Some(BundleError::BroadcastRoot { .. }) => "broadcast_error",
        Some(BundleError::InvalidConfig(_)) => "config_error",
        Some(BundleError::Io { .. } | BundleError::Json { .. }) => "output_error",
        _ => "unknown_error",
    }
}

fn output_error(error: eyre::Report) {
    let output = Output::Error {
        error_type: error_type(&error),
        message: format!("{error:#}"),
    };

    match serde_json::to_string(&output) {
        Ok(line) => eprintln!("{line}"),
        Err(_) => eprintln!("{error:#}"),
    }
}
