// Carbon Telemetry Node
// Streams simulated emissions telemetry through the classifier and prints the
// final dashboard snapshot as JSON

use anyhow::{Context, Result};
use clap::Parser;
use node::logging::init_logging;
use node::{ConfigOverrides, DashboardRunner, NodeConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "telemetry-node")]
#[command(about = "Simulated carbon telemetry feed with threshold classification", long_about = None)]
struct Args {
    /// TOML configuration file (defaults to ./telemetry.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base RNG seed for the feed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long, value_name = "SECS")]
    run_for: Option<u64>,

    /// Log level used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", toml::to_string_pretty(&NodeConfig::default())?);
        return Ok(());
    }

    let mut config = NodeConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    config.apply_overrides(ConfigOverrides {
        seed: args.seed,
        run_for_secs: args.run_for,
        log_level: args.log_level,
    });
    config.validate()?;

    init_logging(&config.log_level)?;
    info!(
        "Starting telemetry node v{} with {} metrics (seed {})",
        telemetry_core::VERSION,
        config.feed.metrics.len(),
        config.feed.seed
    );

    let mut runner = DashboardRunner::new(&config)?;
    let (reason, snapshot) = runner.run(config.run_for()).await?;
    info!(
        "Run ended ({:?}): {}/{} sensors online, {} pending alerts",
        reason, snapshot.sensors_online, snapshot.sensors_total, snapshot.pending_alerts
    );

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
