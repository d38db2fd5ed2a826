//! Exchange-rate feeds used to express local prices in the common unit

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::shared::errors::RateError;
use crate::shared::utils::normalize_currency;

/// Rate provider interface.
///
/// `rate(code)` is the number of `code` units worth one common unit, so a
/// local price divides by it. The common unit itself always resolves to 1.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Currency every price is converted into
    fn common_unit(&self) -> &str;

    async fn rate(&self, currency: &str) -> Result<Decimal, RateError>;
}

/// Static rate table
#[derive(Debug, Clone)]
pub struct FixedRateProvider {
    common_unit: String,
    rates: HashMap<String, Decimal>,
}

impl FixedRateProvider {
    pub fn new(common_unit: &str) -> Self {
        Self {
            common_unit: normalize_currency(common_unit),
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: &str, rate: Decimal) -> Self {
        self.rates.insert(normalize_currency(currency), rate);
        self
    }

    pub fn from_table<I, S>(common_unit: &str, table: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        table
            .into_iter()
            .fold(Self::new(common_unit), |provider, (code, rate)| {
                provider.with_rate(code.as_ref(), rate)
            })
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    fn common_unit(&self) -> &str {
        &self.common_unit
    }

    async fn rate(&self, currency: &str) -> Result<Decimal, RateError> {
        let code = normalize_currency(currency);
        if code == self.common_unit {
            return Ok(Decimal::ONE);
        }

        self.rates
            .get(&code)
            .copied()
            .ok_or(RateError::Missing(code))
    }
}
