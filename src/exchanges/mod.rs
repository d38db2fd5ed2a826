pub mod binance;
pub mod okx;
pub mod fixture;
pub mod http;
pub mod types;
pub mod utils;

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::SourceCfg;
use crate::exchanges::types::SourceKind;
use crate::shared::errors::{AdapterError, AppError};
use crate::shared::types::BestQuotes;

/// Uniform contract for every market-data source.
///
/// `fetch_best_quotes` is only called for currencies in
/// `supported_currencies`. A missing side in the result means no liquidity;
/// an `Err` means the marketplace could not be queried at all.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &str;

    fn supported_currencies(&self) -> &BTreeSet<String>;

    fn supports(&self, currency: &str) -> bool {
        self.supported_currencies().contains(currency)
    }

    async fn fetch_best_quotes(&self, currency: &str) -> Result<BestQuotes, AdapterError>;
}

pub fn create_adapter(source: &SourceCfg, asset: &str) -> Result<Arc<dyn SourceAdapter>, AppError> {
    let name = source.display_name();
    let currencies = source.currency_set();

    match source.kind {
        SourceKind::Binance => Ok(Arc::new(binance::BinanceP2pAdapter::new(
            name,
            asset.to_string(),
            currencies,
            source.pages,
            source.rows,
            source.http_settings(),
        )?)),
        SourceKind::Okx => Ok(Arc::new(okx::OkxP2pAdapter::new(
            name,
            asset.to_string(),
            currencies,
            source.http_settings(),
        )?)),
        SourceKind::Fixture => {
            let adapter = source
                .fixture_books()
                .into_iter()
                .fold(fixture::FixtureAdapter::new(&name), |adapter, (code, book)| {
                    adapter.with_book(&code, book)
                });
            let adapter = currencies
                .iter()
                .fold(adapter, |adapter, code| adapter.supporting(code));
            let adapter = source.fail_currencies.iter().fold(adapter, |adapter, code| {
                adapter.failing_with(code, AdapterError::Network("simulated outage".to_string()))
            });
            Ok(Arc::new(adapter))
        }
    }
}
