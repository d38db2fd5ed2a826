//! Fiat exchange rates from the open.er-api.com public feed

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::{Config, RateProviderKind};
use crate::domain::price::{FixedRateProvider, RateProvider};
use crate::shared::errors::{AppError, RateError};
use crate::shared::utils::normalize_currency;

#[derive(Debug, Deserialize)]
pub struct LatestRatesResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(rename = "error-type", default)]
    pub error_type: Option<String>,
    /// Parsed straight into decimals from the JSON numbers
    #[serde(default)]
    pub rates: HashMap<String, Decimal>,
}

/// Turn a `latest` payload into a rate table keyed by upper-case code
pub fn parse_rate_table(response: LatestRatesResponse) -> Result<HashMap<String, Decimal>, RateError> {
    if let Some(result) = response.result.as_deref() {
        if result != "success" {
            let reason = response.error_type.unwrap_or_else(|| result.to_string());
            return Err(RateError::Fetch(reason));
        }
    }
    if response.rates.is_empty() {
        return Err(RateError::Fetch("response carried no rates".to_string()));
    }

    Ok(response
        .rates
        .into_iter()
        .map(|(code, rate)| (normalize_currency(&code), rate))
        .collect())
}

/// Rate provider backed by `GET {base_url}/{COMMON_UNIT}`.
///
/// The table is fetched on the first lookup and reused for the rest of the
/// run. A failed fetch is not remembered, so a later lookup retries it.
pub struct OpenErApiRateProvider {
    common_unit: String,
    url: String,
    http: Client,
    table: OnceCell<HashMap<String, Decimal>>,
}

impl OpenErApiRateProvider {
    pub fn new(base_url: &str, common_unit: &str, timeout: Duration) -> Result<Self, AppError> {
        let common_unit = normalize_currency(common_unit);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: format!("{}/{}", base_url.trim_end_matches('/'), common_unit),
            common_unit,
            http,
            table: OnceCell::new(),
        })
    }

    async fn fetch_table(&self) -> Result<HashMap<String, Decimal>, RateError> {
        info!("Fetching exchange rates from {}", self.url);
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RateError::Fetch(e.to_string()))?;
        let body = response
            .json::<LatestRatesResponse>()
            .await
            .map_err(|e| RateError::Fetch(e.to_string()))?;

        let table = parse_rate_table(body)?;
        info!("Loaded {} exchange rates", table.len());
        Ok(table)
    }
}

#[async_trait]
impl RateProvider for OpenErApiRateProvider {
    fn common_unit(&self) -> &str {
        &self.common_unit
    }

    async fn rate(&self, currency: &str) -> Result<Decimal, RateError> {
        let code = normalize_currency(currency);
        if code == self.common_unit {
            return Ok(Decimal::ONE);
        }

        let table = self.table.get_or_try_init(|| self.fetch_table()).await.map_err(|e| {
            warn!("Exchange rate lookup for {} failed: {}", code, e);
            e
        })?;

        table.get(&code).copied().ok_or(RateError::Missing(code))
    }
}

pub fn build_rate_provider(config: &Config) -> Result<Arc<dyn RateProvider>, AppError> {
    let common_unit = &config.pipeline.common_unit;
    match config.rates.provider {
        RateProviderKind::OpenErApi => Ok(Arc::new(OpenErApiRateProvider::new(
            &config.rates.base_url,
            common_unit,
            Duration::from_secs(config.rates.timeout_secs.max(1)),
        )?)),
        RateProviderKind::Fixed => Ok(Arc::new(FixedRateProvider::from_table(
            common_unit,
            config.rate_table()?,
        ))),
    }
}
