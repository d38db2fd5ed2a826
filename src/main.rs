mod app;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use p2parb::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "P2P stablecoin price comparison and arbitrage scanner")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fiat currencies to scan (comma-separated, overrides config)
    #[arg(long)]
    currencies: Option<String>,

    /// Minimum profit percentage for a qualifying opportunity
    #[arg(long)]
    min_profit_pct: Option<Decimal>,

    /// Only query these sources, by name (comma-separated)
    #[arg(long)]
    sources: Option<String>,

    /// Query sources concurrently
    #[arg(long)]
    concurrent: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = app::OutputFormat::Text)]
    format: app::OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    // Priority: CLI args > Config file > Defaults
    let mut cfg = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(currencies) = &args.currencies {
        cfg.pipeline.currencies = split_list(currencies);
    }
    if let Some(min_profit_pct) = args.min_profit_pct {
        cfg.pipeline.min_profit_pct = min_profit_pct;
    }
    if args.concurrent {
        cfg.pipeline.concurrent = true;
    }
    if let Some(names) = &args.sources {
        let names = split_list(names);
        for name in &names {
            if !cfg.sources.iter().any(|s| &s.display_name() == name) {
                anyhow::bail!("unknown source name: {}", name);
            }
        }
        cfg.sources.retain(|s| names.contains(&s.display_name()));
    }

    app::run(
        cfg,
        app::RunOptions {
            format: args.format,
            output: args.output,
        },
    )
    .await
}
