//! `keepalived-signal`: resolve and send keepalived dump signals.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use despatch_core::{DespatchConfig, LogicalSignal, Result, SignalDespatcher};
use tracing_subscriber::EnvFilter;

/// Sends DATA, STATS or JSON dump signals to a keepalived instance.
#[derive(Parser)]
#[command(name = "keepalived-signal", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (local defaults when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Signals to send, in order.
    #[arg(value_name = "SIGNAL", required = true)]
    signals: Vec<LogicalSignal>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("keepalived-signal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let despatcher = SignalDespatcher::from_config(&config)?;
    tracing::info!(transport = %despatcher.transport(), "despatching");

    for &signal in &cli.signals {
        let number = despatcher.despatch(signal).await?;
        println!("{signal} {number}");
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DespatchConfig> {
    match path {
        Some(path) => DespatchConfig::load(path),
        None => {
            tracing::debug!("no config given, using local defaults");
            Ok(DespatchConfig::default())
        }
    }
}
