// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! keeper - run actor scenarios from the command line

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{bank, counter, pingpong};
use keeper::{Config, Settings};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "keeper",
    version,
    about = "keeper runs workloads against actors that own their state"
)]
struct Cli {
    /// Actor settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log engine activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Many callers incrementing one counter
    Counter(counter::CounterArgs),
    /// Withdrawals against a single account
    Bank(bank::BankArgs),
    /// Balls bounced between a ring of actors
    Pingpong(pingpong::PingpongArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded actor configuration");

    match cli.command {
        Commands::Counter(args) => counter::run(args, config, cli.format).await,
        Commands::Bank(args) => bank::run(args, config, cli.format).await,
        Commands::Pingpong(args) => pingpong::run(args, config, cli.format).await,
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::new());
    };
    let settings = Settings::load(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    let config = Config::from_settings(settings);
    config
        .validate()
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(config)
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fallback = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("KEEPER_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
