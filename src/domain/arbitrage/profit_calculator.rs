//! Profit calculation for a buy/sell pair

use rust_decimal::Decimal;

use crate::shared::types::NormalizedQuote;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Profit of buying at `buy` and selling at `sell`, both in the common unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfitCalculation {
    pub profit_common: Decimal,
    pub profit_pct: Decimal,
}

impl ProfitCalculation {
    pub fn is_profitable(&self) -> bool {
        self.profit_common > Decimal::ZERO
    }
}

/// `None` when the pair cannot form an opportunity: same marketplace, or a
/// buy price that is not positive.
pub fn calculate_profit(buy: &NormalizedQuote, sell: &NormalizedQuote) -> Option<ProfitCalculation> {
    if buy.source() == sell.source() {
        return None;
    }
    if buy.common_price <= Decimal::ZERO {
        return None;
    }

    let profit_common = sell.common_price - buy.common_price;
    let profit_pct = profit_common.checked_div(buy.common_price)?.checked_mul(HUNDRED)?;

    Some(ProfitCalculation {
        profit_common,
        profit_pct,
    })
}
