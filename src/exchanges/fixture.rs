//! In-memory marketplace backed by preloaded observations

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::domain::quote::reduce_both;
use crate::exchanges::SourceAdapter;
use crate::shared::errors::AdapterError;
use crate::shared::types::{BestQuotes, Observation};
use crate::shared::utils::normalize_currency;

#[derive(Debug, Clone, Default)]
pub struct FixtureBook {
    pub buy: Vec<Observation>,
    pub sell: Vec<Observation>,
}

/// Source adapter that serves fixed order books, used for offline runs and tests
#[derive(Debug, Clone)]
pub struct FixtureAdapter {
    name: String,
    currencies: BTreeSet<String>,
    books: HashMap<String, FixtureBook>,
    failing: HashMap<String, AdapterError>,
}

impl FixtureAdapter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            currencies: BTreeSet::new(),
            books: HashMap::new(),
            failing: HashMap::new(),
        }
    }

    /// Declare support for `currency` without publishing any offers
    pub fn supporting(mut self, currency: &str) -> Self {
        self.currencies.insert(normalize_currency(currency));
        self
    }

    pub fn with_book(mut self, currency: &str, book: FixtureBook) -> Self {
        let code = normalize_currency(currency);
        self.currencies.insert(code.clone());
        self.books.insert(code, book);
        self
    }

    /// Single best buy and sell offer, as (price, merchant)
    pub fn with_quotes(self, currency: &str, buy: Option<(&str, &str)>, sell: Option<(&str, &str)>) -> Self {
        let book = FixtureBook {
            buy: buy.map(|(p, m)| Observation::new(p, m)).into_iter().collect(),
            sell: sell.map(|(p, m)| Observation::new(p, m)).into_iter().collect(),
        };
        self.with_book(currency, book)
    }

    /// Make every query for `currency` fail with `error`
    pub fn failing_with(mut self, currency: &str, error: AdapterError) -> Self {
        let code = normalize_currency(currency);
        self.currencies.insert(code.clone());
        self.failing.insert(code, error);
        self
    }
}

#[async_trait]
impl SourceAdapter for FixtureAdapter {
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
        if let Some(error) = self.failing.get(currency) {
            return Err(error.clone());
        }

        let Some(book) = self.books.get(currency) else {
            return Ok(BestQuotes::default());
        };
        debug!("{} {}: {} buy / {} sell fixture offers", self.name, currency, book.buy.len(), book.sell.len());

        Ok(reduce_both(&self.name, currency, &book.buy, &book.sell))
    }
}
