//! Cross-marketplace opportunity search

use rust_decimal::Decimal;

use super::profit_calculator::calculate_profit;
use crate::shared::types::{NormalizedQuote, Opportunity, OpportunitySet};

/// Default qualifying threshold, in percent
pub const DEFAULT_MIN_PROFIT_PCT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Cross-join every buy quote with every sell quote from a different source.
///
/// `best` is the profitable pair with the highest percentage and ignores the
/// threshold. `qualifying` holds the profitable pairs with
/// `profit_pct >= min_profit_pct`, highest first; equal percentages keep
/// buys-outer, sells-inner input order. Both pick the earliest pair on ties.
pub fn find_opportunities(
    buys: &[NormalizedQuote],
    sells: &[NormalizedQuote],
    min_profit_pct: Decimal,
) -> OpportunitySet {
    let mut best: Option<Opportunity> = None;
    let mut qualifying: Vec<Opportunity> = Vec::new();

    for buy in buys {
        for sell in sells {
            let Some(calc) = calculate_profit(buy, sell) else {
                continue;
            };
            if !calc.is_profitable() {
                continue;
            }

            let opportunity = Opportunity {
                buy: buy.clone(),
                sell: sell.clone(),
                profit_common: calc.profit_common,
                profit_pct: calc.profit_pct,
            };

            let is_best = best
                .as_ref()
                .map_or(true, |current| opportunity.profit_pct > current.profit_pct);
            if is_best {
                best = Some(opportunity.clone());
            }

            if opportunity.profit_pct >= min_profit_pct {
                qualifying.push(opportunity);
            }
        }
    }

    qualifying.sort_by(|a, b| b.profit_pct.cmp(&a.profit_pct));

    OpportunitySet { best, qualifying }
}
