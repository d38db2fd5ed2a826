//! Conversion of best quotes into the common unit

use rust_decimal::Decimal;

use super::RateProvider;
use crate::shared::errors::RateError;
use crate::shared::types::{BestQuote, NormalizedQuote};
use crate::shared::utils::normalize_currency;

/// Express `quote` in the provider's common unit.
///
/// Quotes already in the common unit keep their price untouched. Missing,
/// zero or negative rates fail with a [`RateError`] and no quote is produced.
pub async fn normalize(
    quote: BestQuote,
    rates: &dyn RateProvider,
) -> Result<NormalizedQuote, RateError> {
    let currency = normalize_currency(&quote.currency);

    if currency == normalize_currency(rates.common_unit()) {
        let common_price = quote.local_price;
        return Ok(NormalizedQuote { quote, common_price });
    }

    let rate = rates.rate(&currency).await?;
    if rate <= Decimal::ZERO {
        return Err(RateError::NonPositive { currency, rate });
    }

    let common_price = quote
        .local_price
        .checked_div(rate)
        .ok_or(RateError::Overflow(currency))?;

    Ok(NormalizedQuote { quote, common_price })
}
