//! Common types used across the application

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::utils::parse_price;

/// Merchant name used when a marketplace does not publish one
pub const UNKNOWN_MERCHANT: &str = "Unknown";

/// Trade direction from the point of view of the person running the scan.
/// `Buy` quotes are asks (we pay them), `Sell` quotes are bids (we receive them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One advertised price as scraped from a marketplace, before any validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Raw price text in the local currency
    pub price: String,
    pub merchant: String,
}

impl Observation {
    pub fn new(price: impl Into<String>, merchant: impl Into<String>) -> Self {
        let merchant = merchant.into();
        let merchant = if merchant.trim().is_empty() {
            UNKNOWN_MERCHANT.to_string()
        } else {
            merchant.trim().to_string()
        };

        Self {
            price: price.into(),
            merchant,
        }
    }

    /// Positive decimal price, or `None` if the text is not a usable price
    pub fn parsed_price(&self) -> Option<Decimal> {
        parse_price(&self.price)
    }
}

/// Most favorable price for one (source, currency, direction)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestQuote {
    pub source: String,
    pub currency: String,
    pub direction: Direction,
    pub local_price: Decimal,
    pub merchant: String,
}

/// What a source adapter returns for a single currency.
/// A missing side means no liquidity was found, which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BestQuotes {
    pub buy: Option<BestQuote>,
    pub sell: Option<BestQuote>,
}

impl BestQuotes {
    pub fn is_empty(&self) -> bool {
        self.buy.is_none() && self.sell.is_none()
    }

    pub fn get(&self, direction: Direction) -> Option<&BestQuote> {
        match direction {
            Direction::Buy => self.buy.as_ref(),
            Direction::Sell => self.sell.as_ref(),
        }
    }
}

/// Best quote converted into the common unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedQuote {
    #[serde(flatten)]
    pub quote: BestQuote,
    pub common_price: Decimal,
}

impl NormalizedQuote {
    pub fn source(&self) -> &str {
        &self.quote.source
    }

    pub fn currency(&self) -> &str {
        &self.quote.currency
    }
}

/// Buy on one marketplace, sell on another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub buy: NormalizedQuote,
    pub sell: NormalizedQuote,
    pub profit_common: Decimal,
    pub profit_pct: Decimal,
}

/// Result of one opportunity search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunitySet {
    /// Highest-percentage profitable pair, regardless of the threshold
    pub best: Option<Opportunity>,
    /// Pairs at or above the threshold, highest percentage first
    pub qualifying: Vec<Opportunity>,
}
