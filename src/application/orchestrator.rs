//! Run orchestration: query every source, normalize, search for opportunities

use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::domain::arbitrage::{find_opportunities, DEFAULT_MIN_PROFIT_PCT};
use crate::domain::price::{normalize, RateProvider};
use crate::exchanges::SourceAdapter;
use crate::shared::errors::{AdapterError, RateError};
use crate::shared::types::{BestQuote, BestQuotes, Direction, NormalizedQuote, OpportunitySet};
use crate::shared::utils::{dedupe_currencies, normalize_currency};

const DIRECTIONS: [Direction; 2] = [Direction::Buy, Direction::Sell];

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Currencies to scan, in scan order
    pub currencies: Vec<String>,
    pub min_profit_pct: Decimal,
    pub concurrent: bool,
    pub max_concurrency: usize,
    /// Per-call limit; `None` waits for the adapter's own HTTP timeout
    pub adapter_timeout: Option<Duration>,
}

impl PipelineConfig {
    pub fn new<I, S>(currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            currencies: currencies.into_iter().map(|c| c.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            currencies: Vec::new(),
            min_profit_pct: DEFAULT_MIN_PROFIT_PCT,
            concurrent: false,
            max_concurrency: 4,
            adapter_timeout: Some(Duration::from_secs(120)),
        }
    }
}

/// Everything the pipeline reports while it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    UnsupportedSkipped {
        source: String,
        currency: String,
    },
    AdapterFailed {
        source: String,
        currency: String,
        error: AdapterError,
    },
    NoLiquidity {
        source: String,
        currency: String,
        direction: Direction,
    },
    QuoteCollected {
        quote: NormalizedQuote,
    },
    RateUnavailable {
        source: String,
        currency: String,
        direction: Direction,
        error: RateError,
    },
    ContractViolation {
        source: String,
        currency: String,
        detail: String,
    },
    ScanStarted {
        jobs: usize,
        width: usize,
    },
    ScanFinished {
        buys: usize,
        sells: usize,
        qualifying: usize,
    },
}

/// Receiver for pipeline diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: &PipelineEvent);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&PipelineEvent) + Send + Sync,
{
    fn record(&self, event: &PipelineEvent) {
        self(event)
    }
}

/// Forwards pipeline events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::UnsupportedSkipped { source, currency } => {
                debug!("{} does not support {}, skipping", source, currency)
            }
            PipelineEvent::AdapterFailed { source, currency, error } => {
                warn!("{} {}: source failed: {}", source, currency, error)
            }
            PipelineEvent::NoLiquidity { source, currency, direction } => {
                info!("{} {} {}: no offers found", source, currency, direction)
            }
            PipelineEvent::QuoteCollected { quote } => info!(
                "{} {} {}: {} {} (≈{:.3}), merchant {}",
                quote.source(),
                quote.currency(),
                quote.quote.direction,
                quote.quote.local_price,
                quote.currency(),
                quote.common_price,
                quote.quote.merchant
            ),
            PipelineEvent::RateUnavailable { source, currency, direction, error } => {
                warn!("{} {} {}: dropped, {}", source, currency, direction, error)
            }
            PipelineEvent::ContractViolation { source, currency, detail } => {
                error!("{} {}: contract violation, quote dropped: {}", source, currency, detail)
            }
            PipelineEvent::ScanStarted { jobs, width } => {
                info!("Scanning {} source/currency pairs ({} at a time)", jobs, width)
            }
            PipelineEvent::ScanFinished { buys, sells, qualifying } => info!(
                "Collected {} buy / {} sell quotes, {} qualifying opportunities",
                buys, sells, qualifying
            ),
        }
    }
}

/// A (source, currency[, direction]) contribution left out of the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedContribution {
    pub source: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub buys: Vec<NormalizedQuote>,
    pub sells: Vec<NormalizedQuote>,
    pub opportunities: OpportunitySet,
    pub skipped: Vec<SkippedContribution>,
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Drives one scan over a fixed set of sources
pub struct Orchestrator {
    sources: Vec<Arc<dyn SourceAdapter>>,
    rates: Arc<dyn RateProvider>,
    config: PipelineConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl Orchestrator {
    pub fn new(sources: Vec<Arc<dyn SourceAdapter>>, rates: Arc<dyn RateProvider>, config: PipelineConfig) -> Self {
        Self {
            sources,
            rates,
            config,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Run the scan to completion. Source failures never abort the run.
    pub async fn run(&self) -> ScanOutcome {
        let currencies = dedupe_currencies(&self.config.currencies);

        // source-major, then currency; results are folded in this order
        let mut jobs = Vec::new();
        for adapter in &self.sources {
            for currency in &currencies {
                if adapter.supports(currency) {
                    jobs.push((Arc::clone(adapter), currency.clone()));
                } else {
                    self.sink.record(&PipelineEvent::UnsupportedSkipped {
                        source: adapter.name().to_string(),
                        currency: currency.clone(),
                    });
                }
            }
        }

        let width = if self.config.concurrent {
            self.config.max_concurrency.max(1)
        } else {
            1
        };
        self.sink.record(&PipelineEvent::ScanStarted {
            jobs: jobs.len(),
            width,
        });

        let timeout = self.config.adapter_timeout;
        let results: Vec<_> = stream::iter(jobs)
            .map(|(adapter, currency)| async move {
                let result = invoke(Arc::clone(&adapter), currency.clone(), timeout).await;
                (adapter, currency, result)
            })
            .buffered(width)
            .collect()
            .await;

        let mut outcome = ScanOutcome::default();
        for (adapter, currency, result) in results {
            self.collect(adapter.name(), &currency, result, &mut outcome).await;
        }

        outcome.opportunities = find_opportunities(&outcome.buys, &outcome.sells, self.config.min_profit_pct);
        self.sink.record(&PipelineEvent::ScanFinished {
            buys: outcome.buys.len(),
            sells: outcome.sells.len(),
            qualifying: outcome.opportunities.qualifying.len(),
        });
        outcome
    }

    async fn collect(
        &self,
        source: &str,
        currency: &str,
        result: Result<BestQuotes, AdapterError>,
        outcome: &mut ScanOutcome,
    ) {
        let quotes = match result {
            Ok(quotes) => quotes,
            Err(error) => {
                outcome.skipped.push(SkippedContribution {
                    source: source.to_string(),
                    currency: currency.to_string(),
                    direction: None,
                    reason: error.to_string(),
                });
                self.sink.record(&PipelineEvent::AdapterFailed {
                    source: source.to_string(),
                    currency: currency.to_string(),
                    error,
                });
                return;
            }
        };

        for direction in DIRECTIONS {
            let Some(quote) = quotes.get(direction) else {
                self.sink.record(&PipelineEvent::NoLiquidity {
                    source: source.to_string(),
                    currency: currency.to_string(),
                    direction,
                });
                continue;
            };

            if let Some(detail) = contract_violation(quote, source, currency, direction) {
                if cfg!(debug_assertions) {
                    panic!("contract violation by {} for {}: {}", source, currency, detail);
                }
                outcome.skipped.push(SkippedContribution {
                    source: source.to_string(),
                    currency: currency.to_string(),
                    direction: Some(direction),
                    reason: detail.clone(),
                });
                self.sink.record(&PipelineEvent::ContractViolation {
                    source: source.to_string(),
                    currency: currency.to_string(),
                    detail,
                });
                continue;
            }

            match normalize(quote.clone(), self.rates.as_ref()).await {
                Ok(normalized) => {
                    self.sink.record(&PipelineEvent::QuoteCollected {
                        quote: normalized.clone(),
                    });
                    match direction {
                        Direction::Buy => outcome.buys.push(normalized),
                        Direction::Sell => outcome.sells.push(normalized),
                    }
                }
                Err(error) => {
                    outcome.skipped.push(SkippedContribution {
                        source: source.to_string(),
                        currency: currency.to_string(),
                        direction: Some(direction),
                        reason: error.to_string(),
                    });
                    self.sink.record(&PipelineEvent::RateUnavailable {
                        source: source.to_string(),
                        currency: currency.to_string(),
                        direction,
                        error,
                    });
                }
            }
        }
    }
}

/// Call one adapter on its own task so a panic or hang stays contained
async fn invoke(
    adapter: Arc<dyn SourceAdapter>,
    currency: String,
    timeout: Option<Duration>,
) -> Result<BestQuotes, AdapterError> {
    let handle = tokio::spawn(async move {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, adapter.fetch_best_quotes(&currency))
                .await
                .unwrap_or(Err(AdapterError::Timeout(limit))),
            None => adapter.fetch_best_quotes(&currency).await,
        }
    });
    let _guard = AbortOnDrop(handle.abort_handle());

    match handle.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => Err(AdapterError::Panicked(panic_message(err.into_panic()))),
        Err(err) => Err(AdapterError::Panicked(err.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn contract_violation(quote: &BestQuote, source: &str, currency: &str, direction: Direction) -> Option<String> {
    if quote.source != source {
        return Some(format!("quote attributed to source {}", quote.source));
    }
    if normalize_currency(&quote.currency) != currency {
        return Some(format!("quote for currency {}", quote.currency));
    }
    if quote.direction != direction {
        return Some(format!("{} quote returned as {}", quote.direction, direction));
    }
    None
}
