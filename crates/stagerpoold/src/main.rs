//! stagerpoold — the stager pool daemon.
//!
//! Hosts a single `StagerPool` and replays stager heartbeats and staging
//! requests through it, printing one JSON outcome per request.
//!
//! # Usage
//!
//! ```text
//! stagerpoold replay --config stagerpoold.toml --input events.jsonl
//! stagerpoold check-config --config stagerpoold.toml
//! ```

mod config;
mod replay;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use stagerpool_placement::StagerPool;

use crate::config::{DaemonConfig, LogConfig};

#[derive(Parser)]
#[command(name = "stagerpoold", about = "Stager pool daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay newline-delimited JSON events through a stager pool.
    Replay {
        /// Configuration file (TOML).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Event file; reads stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Override the advertisement timeout in seconds.
        #[arg(long)]
        advertisement_timeout: Option<u64>,

        /// Override the top-stager percentage (0-100).
        #[arg(long)]
        top_stager_percentage: Option<u32>,
    },
    /// Validate a configuration file and print the effective settings.
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            config,
            input,
            advertisement_timeout,
            top_stager_percentage,
        } => {
            let config = load_config(config)?
                .with_overrides(advertisement_timeout, top_stager_percentage)?;
            init_tracing(&config.log);
            run_replay(config, input).await
        }
        Command::CheckConfig { config } => {
            let config = DaemonConfig::from_file(&config)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<DaemonConfig> {
    match path {
        Some(path) => DaemonConfig::from_file(&path),
        None => Ok(DaemonConfig::default()),
    }
}

fn init_tracing(log: &LogConfig) {
    // Outcomes go to stdout, so logs go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_replay(config: DaemonConfig, input: Option<PathBuf>) -> anyhow::Result<()> {
    let pool = StagerPool::new(config.pool)?;
    info!(
        advertisement_timeout_secs = config.pool.advertisement_timeout_secs,
        top_stager_percentage = config.pool.top_stager_percentage,
        "stager pool ready"
    );

    let emit = |outcome: &replay::Outcome| -> anyhow::Result<()> {
        println!("{}", serde_json::to_string(outcome)?);
        Ok(())
    };

    match input {
        Some(path) => {
            let file = tokio::fs::File::open(&path).await?;
            info!(path = ?path, "replaying events from file");
            replay::run(&pool, file, emit).await?;
        }
        None => {
            info!("replaying events from stdin");
            replay::run(&pool, tokio::io::stdin(), emit).await?;
        }
    }
    Ok(())
}
