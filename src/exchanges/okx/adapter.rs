use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeSet;
use tracing::info;

use super::parser::{BooksResponse, OkxP2pParser};
use crate::domain::quote::reduce_both;
use crate::exchanges::http::{with_retries, HttpSettings};
use crate::exchanges::SourceAdapter;
use crate::shared::errors::{AdapterError, AppError};
use crate::shared::types::{BestQuotes, Direction, Observation};

const BOOKS_PATH: &str = "/v3/c2c/tradingOrders/books";

/// OKX P2P order books
pub struct OkxP2pAdapter {
    name: String,
    asset: String,
    currencies: BTreeSet<String>,
    settings: HttpSettings,
    http: Client,
    parser: OkxP2pParser,
}

impl OkxP2pAdapter {
    pub fn new(
        name: String,
        asset: String,
        currencies: BTreeSet<String>,
        settings: HttpSettings,
    ) -> Result<Self, AppError> {
        let http = settings.build_client()?;
        Ok(Self {
            name,
            asset,
            currencies,
            settings,
            http,
            parser: OkxP2pParser,
        })
    }

    async fn fetch_side(&self, currency: &str, direction: Direction) -> Result<Vec<Observation>, AdapterError> {
        let url = format!("{}{}", self.settings.base_url.trim_end_matches('/'), BOOKS_PATH);
        let label = format!("{} {} {}", self.name, currency, direction);
        let query = [
            ("quoteCurrency", currency.to_lowercase()),
            ("baseCurrency", self.asset.to_lowercase()),
            ("side", OkxP2pParser::merchant_side(direction).to_string()),
            ("paymentMethod", "all".to_string()),
            ("userType", "all".to_string()),
            ("showTrade", "false".to_string()),
            ("showFollow", "false".to_string()),
            ("showAlreadyTraded", "false".to_string()),
            ("isAbleFilter", "false".to_string()),
        ];

        let http = &self.http;
        let url = url.as_str();
        let query = &query;
        let response = with_retries(&label, self.settings.retries, self.settings.retry_backoff, move || async move {
            let resp = http.get(url).query(query).send().await?.error_for_status()?;
            resp.json::<BooksResponse>().await.map_err(AdapterError::from)
        })
        .await?;

        self.parser.parse_observations(response, direction)
    }
}

#[async_trait]
impl SourceAdapter for OkxP2pAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_currencies(&self) -> &BTreeSet<String> {
        &self.currencies
    }

    async fn fetch_best_quotes(&self, currency: &str) -> Result<BestQuotes, AdapterError> {
        if !self.supports(currency) {
            return Err(AdapterError::UnsupportedCurrency(currency.to_string()));
        }

        let buys = self.fetch_side(currency, Direction::Buy).await?;
        let sells = self.fetch_side(currency, Direction::Sell).await?;
        info!(
            "{} {}: {} buy / {} sell orders",
            self.name,
            currency,
            buys.len(),
            sells.len()
        );

        Ok(reduce_both(&self.name, currency, &buys, &sells))
    }
}
