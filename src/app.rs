// src/app.rs
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use p2parb::application::{Orchestrator, PipelineConfig};
use p2parb::config::Config;
use p2parb::exchanges::{create_adapter, SourceAdapter};
use p2parb::infrastructure::build_rate_provider;
use p2parb::report::ArbitrageReport;
use p2parb::shared::utils::{dedupe_currencies, normalize_currency};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// One full scan: build sources and rates from `cfg`, run, render the report
pub async fn run(cfg: Config, opts: RunOptions) -> Result<()> {
    let report = scan(&cfg).await?;

    let rendered = match opts.format {
        OutputFormat::Text => report.render_text(),
        OutputFormat::Json => report.to_json().context("serialize report")?,
    };

    match &opts.output {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

async fn scan(cfg: &Config) -> Result<ArbitrageReport> {
    cfg.validate()?;

    let asset = normalize_currency(&cfg.pipeline.asset);
    let common_unit = normalize_currency(&cfg.pipeline.common_unit);
    let min_profit_pct = cfg.min_profit_pct()?;

    let sources = cfg
        .sources
        .iter()
        .map(|source| create_adapter(source, &asset))
        .collect::<Result<Vec<Arc<dyn SourceAdapter>>, _>>()?;
    let rates = build_rate_provider(cfg)?;

    let pipeline = PipelineConfig {
        currencies: dedupe_currencies(&cfg.pipeline.currencies),
        min_profit_pct,
        concurrent: cfg.pipeline.concurrent,
        max_concurrency: cfg.pipeline.max_concurrency,
        adapter_timeout: cfg
            .pipeline
            .adapter_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
    };

    info!("Starting {} P2P price comparison for arbitrage opportunities", asset);
    info!(
        "Sources: {}",
        sources.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
    );
    info!("Currencies: {}", pipeline.currencies.join(", "));
    info!("Min profit threshold: {}%", min_profit_pct);

    let outcome = Orchestrator::new(sources, rates, pipeline).run().await;
    Ok(ArbitrageReport::new(outcome, &asset, &common_unit, min_profit_pct))
}
