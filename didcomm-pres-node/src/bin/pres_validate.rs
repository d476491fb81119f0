//! Validates a present-proof message read from a file or stdin.
//!
//! Usage: `pres-validate [MESSAGE_FILE]`
//!
//! The node configuration is read from the JSON file named by
//! `PRES_NODE_CONFIG` when set. Accepted messages print a one-line summary;
//! rejected ones print their problem report and exit with an error.

use std::io::Read;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use didcomm_pres_core::{FormatRegistry, SharedFormatRegistry};
use didcomm_pres_node::{NodeConfig, PresentationNode, Reception};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "PRES_NODE_CONFIG";

fn load_config() -> Result<NodeConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => NodeConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.to_string_lossy())),
        None => Ok(NodeConfig::default()),
    }
}

fn read_input() -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match std::env::args_os().nth(1) {
        Some(path) => {
            bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
        }
        None => {
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read stdin")?;
        }
    }
    Ok(bytes)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    let registry = Arc::new(SharedFormatRegistry::new(FormatRegistry::with_defaults()));
    let node = PresentationNode::new(config, registry);

    let bytes = read_input()?;
    info!(size = bytes.len(), "Validating message");

    match node.decode(&bytes)? {
        Reception::Accepted(message) => {
            println!("accepted {} {}", message.message_type(), message.id().as_str());
            Ok(())
        }
        Reception::Rejected(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            bail!(
                "message rejected: {}",
                report.code().unwrap_or("unknown")
            )
        }
    }
}
