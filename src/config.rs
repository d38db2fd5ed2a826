use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Duration;
use std::{fs, path::Path};

use crate::domain::arbitrage::DEFAULT_MIN_PROFIT_PCT;
use crate::domain::price::DEFAULT_COMMON_UNIT;
use crate::exchanges::fixture::FixtureBook;
use crate::exchanges::http::HttpSettings;
use crate::exchanges::types::{SourceKind, DEFAULT_ASSET, DEFAULT_FIATS};
use crate::shared::errors::AppError;
use crate::shared::types::Observation;
use crate::shared::utils::{dedupe_currencies, normalize_currency};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineCfg {
    pub asset: String,
    pub common_unit: String,
    pub currencies: Vec<String>,
    /// Accepts a TOML number or a decimal string
    pub min_profit_pct: Decimal,
    pub concurrent: bool,
    pub max_concurrency: usize,
    pub adapter_timeout_secs: Option<u64>,
}

impl Default for PipelineCfg {
    fn default() -> Self {
        Self {
            asset: DEFAULT_ASSET.to_string(),
            common_unit: DEFAULT_COMMON_UNIT.to_string(),
            currencies: DEFAULT_FIATS.iter().map(|c| c.to_string()).collect(),
            min_profit_pct: DEFAULT_MIN_PROFIT_PCT,
            concurrent: false,
            max_concurrency: 4,
            adapter_timeout_secs: Some(120),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateProviderKind {
    OpenErApi,
    Fixed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RatesCfg {
    pub provider: RateProviderKind,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Units of each currency per common unit
    pub table: BTreeMap<String, Decimal>,
}

impl Default for RatesCfg {
    fn default() -> Self {
        Self {
            provider: RateProviderKind::OpenErApi,
            base_url: "https://open.er-api.com/v6/latest".to_string(),
            timeout_secs: 15,
            table: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationCfg {
    pub price: String,
    #[serde(default)]
    pub merchant: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureBookCfg {
    #[serde(default)]
    pub buy: Vec<ObservationCfg>,
    #[serde(default)]
    pub sell: Vec<ObservationCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceCfg {
    pub kind: SourceKind,
    pub name: Option<String>,
    pub currencies: Option<Vec<String>>,
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default)]
    pub retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub base_url: Option<String>,
    /// Fixture order books keyed by currency
    #[serde(default)]
    pub quotes: BTreeMap<String, FixtureBookCfg>,
    /// Fixture currencies that always fail
    #[serde(default)]
    pub fail_currencies: Vec<String>,
}

fn default_pages() -> u32 {
    1
}

fn default_rows() -> u32 {
    10
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    20
}

impl SourceCfg {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            name: None,
            currencies: None,
            pages: default_pages(),
            rows: default_rows(),
            retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
            quotes: BTreeMap::new(),
            fail_currencies: Vec::new(),
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(self.kind.as_str())
            .to_string()
    }

    /// Currencies this source declares; marketplaces default to the standard fiat list,
    /// fixtures to the currencies they carry books for.
    pub fn currency_set(&self) -> BTreeSet<String> {
        match (&self.currencies, self.kind) {
            (Some(list), _) => dedupe_currencies(list).into_iter().collect(),
            (None, SourceKind::Fixture) => self
                .quotes
                .keys()
                .chain(self.fail_currencies.iter())
                .map(|c| normalize_currency(c))
                .collect(),
            (None, _) => DEFAULT_FIATS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| self.kind.default_base_url().to_string()),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            retries: self.retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn fixture_books(&self) -> Vec<(String, FixtureBook)> {
        let to_obs = |list: &[ObservationCfg]| -> Vec<Observation> {
            list.iter()
                .map(|o| Observation::new(o.price.as_str(), o.merchant.as_str()))
                .collect()
        };

        self.quotes
            .iter()
            .map(|(code, book)| {
                (
                    normalize_currency(code),
                    FixtureBook {
                        buy: to_obs(&book.buy),
                        sell: to_obs(&book.sell),
                    },
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineCfg,
    pub rates: RatesCfg,
    pub sources: Vec<SourceCfg>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineCfg::default(),
            rates: RatesCfg::default(),
            sources: vec![SourceCfg::new(SourceKind::Binance), SourceCfg::new(SourceKind::Okx)],
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        let cfg = Self::from_toml(&s).context("parse config")?;
        Ok(cfg)
    }

    pub fn from_toml(s: &str) -> Result<Self, AppError> {
        let cfg: Self = toml::from_str(s)?;
        Ok(cfg)
    }

    /// Threshold as a decimal percentage
    pub fn min_profit_pct(&self) -> Result<Decimal, AppError> {
        let pct = self.pipeline.min_profit_pct;
        if pct < Decimal::ZERO {
            return Err(AppError::ConfigError(format!(
                "min_profit_pct must be non-negative, got {}",
                pct
            )));
        }
        Ok(pct.normalize())
    }

    /// Rate table keyed by canonical currency code
    pub fn rate_table(&self) -> Result<Vec<(String, Decimal)>, AppError> {
        self.rates
            .table
            .iter()
            .map(|(code, rate)| {
                if *rate <= Decimal::ZERO {
                    return Err(AppError::ConfigError(format!("invalid rate for {}: {}", code, rate)));
                }
                Ok((normalize_currency(code), *rate))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.sources.is_empty() {
            return Err(AppError::ConfigError("no sources configured".to_string()));
        }
        if dedupe_currencies(&self.pipeline.currencies).is_empty() {
            return Err(AppError::ConfigError("no currencies configured".to_string()));
        }
        if normalize_currency(&self.pipeline.common_unit).is_empty() {
            return Err(AppError::ConfigError("common_unit is empty".to_string()));
        }
        if self.pipeline.max_concurrency == 0 {
            return Err(AppError::ConfigError("max_concurrency must be at least 1".to_string()));
        }
        self.min_profit_pct()?;
        self.rate_table()?;

        let mut names = HashSet::new();
        for source in &self.sources {
            let name = source.display_name();
            if !names.insert(name.clone()) {
                return Err(AppError::ConfigError(format!("duplicate source name: {}", name)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::default();
        assert_eq!(cfg.pipeline.asset, "USDT");
        assert_eq!(cfg.pipeline.common_unit, "USD");
        assert_eq!(cfg.pipeline.currencies.len(), 8);
        assert_eq!(cfg.min_profit_pct().unwrap(), dec!(50));
        assert_eq!(cfg.sources.len(), 2);
        assert_eq!(cfg.rates.provider, RateProviderKind::OpenErApi);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let cfg = Config::from_toml(
            r#"
            [pipeline]
            currencies = ["ngn", "USD"]
            min_profit_pct = 12.5
            concurrent = true

            [rates]
            provider = "fixed"
            table = { NGN = 1550.0, KES = "129.35" }

            [[sources]]
            kind = "binance"
            rows = 20
            pages = 2
            retries = 1

            [[sources]]
            kind = "fixture"
            name = "demo"

            [sources.quotes.NGN]
            buy = [{ price = "1500", merchant = "a" }]
            sell = [{ price = "1,700.00" }]
            "#,
        )
        .unwrap();

        assert!(cfg.pipeline.concurrent);
        assert_eq!(cfg.pipeline.asset, "USDT");
        assert_eq!(cfg.min_profit_pct().unwrap(), dec!(12.5));
        assert_eq!(cfg.rates.provider, RateProviderKind::Fixed);
        assert_eq!(
            cfg.rate_table().unwrap(),
            vec![("KES".to_string(), dec!(129.35)), ("NGN".to_string(), dec!(1550))]
        );

        let binance = &cfg.sources[0];
        assert_eq!(binance.display_name(), "binance");
        assert_eq!((binance.rows, binance.pages, binance.retries), (20, 2, 1));
        assert_eq!(binance.currency_set().len(), 8);

        let demo = &cfg.sources[1];
        assert_eq!(demo.display_name(), "demo");
        assert_eq!(demo.currency_set(), BTreeSet::from(["NGN".to_string()]));
        let books = demo.fixture_books();
        assert_eq!(books[0].1.sell[0].merchant, "Unknown");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_threshold_and_rates_stay_decimal() {
        let cfg = Config::from_toml(
            r#"
            [pipeline]
            min_profit_pct = "33.333333333333333333"

            [rates]
            provider = "fixed"
            table = { BRL = 5.4321, CAD = "1.3699999999999999" }
            "#,
        )
        .unwrap();

        assert_eq!(cfg.min_profit_pct().unwrap(), dec!(33.333333333333333333));
        let table = cfg.rate_table().unwrap();
        assert_eq!(table[0], ("BRL".to_string(), dec!(5.4321)));
        assert_eq!(table[1], ("CAD".to_string(), dec!(1.3699999999999999)));
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let mut cfg = Config::default();
        cfg.pipeline.min_profit_pct = dec!(-1);
        assert!(matches!(cfg.validate(), Err(AppError::ConfigError(_))));

        let mut cfg = Config::default();
        cfg.sources.push(SourceCfg::new(SourceKind::Okx));
        assert!(matches!(cfg.validate(), Err(AppError::ConfigError(msg)) if msg.contains("duplicate")));

        let mut cfg = Config::default();
        cfg.rates.table.insert("NGN".to_string(), Decimal::ZERO);
        assert!(matches!(cfg.validate(), Err(AppError::ConfigError(msg)) if msg.contains("NGN")));

        let mut cfg = Config::default();
        cfg.pipeline.currencies = vec![" ".to_string()];
        assert!(cfg.validate().is_err());

        assert!(Config::from_toml("[[sources]]\nkind = \"paxful\"").is_err());
    }
}
