//! # Quantum-Chain Interop Node
//!
//! Runs the interoperability engine as a standalone process.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (from env)
//! 2. Load configuration (file, then env overrides)
//! 3. Validate the seal key is not default (unless `--dev`)
//! 4. Wire the container
//! 5. Start background tasks and wait for Ctrl+C

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use interop_node::{HttpOracleFetcher, InteropContainer, InteropNode, NodeConfig};
use interop_telemetry::{init_telemetry, TelemetryConfig};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "interop-node", version, about = "Quantum-Chain interoperability node")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "QC_CONFIG")]
    config: Option<PathBuf>,

    /// Override the admin endpoint bind address.
    #[arg(long)]
    admin_addr: Option<String>,

    /// Allow the default zero seal key (development only).
    #[arg(long)]
    dev: bool,
}

/// Load configuration from file and environment.
fn load_config(args: &Args) -> Result<NodeConfig> {
    let mut config = NodeConfig::load(args.config.as_deref()).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            args.config
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults".to_string())
        )
    })?;
    config.apply_env_overrides();
    if let Some(addr) = &args.admin_addr {
        config.runtime.admin_addr = addr.clone();
    }

    if args.dev {
        config.validate().context("Invalid configuration")?;
        warn!("Running in development mode: production checks skipped");
    } else {
        config
            .validate_for_production()
            .context("Configuration failed production validation")?;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let config = load_config(&args)?;

    // The blocking HTTP client owns its own runtime and must be built outside tokio.
    let fetcher = HttpOracleFetcher::new(
        config.runtime.oracle_timeout(),
        config.interop.oracle_max_content_bytes,
    )
        .context("Failed to build HTTP oracle client")?;
    let container = InteropContainer::new(config, Arc::new(fetcher))
        .context("Failed to wire interop components")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    let container = runtime.block_on(async move {
        let mut node = InteropNode::new(container);
        node.start().await.context("Failed to start interop node")?;

        info!("Node is running. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;

        // Hand the container back so the HTTP client is dropped outside the runtime.
        let container = node.container();
        node.shutdown().await;
        Ok::<_, anyhow::Error>(container)
    })?;
    drop(container);
    Ok(())
}
