//! Reduction of raw marketplace observations to a single best quote

use rust_decimal::Decimal;

use crate::shared::types::{BestQuote, BestQuotes, Direction, Observation};

/// Pick the best observation for `direction`.
///
/// Buy takes the lowest valid price, Sell the highest. Observations whose price
/// does not parse as a positive decimal are skipped. On equal prices the
/// earliest observation wins, so the result only depends on input order.
pub fn reduce(
    source: &str,
    currency: &str,
    direction: Direction,
    observations: &[Observation],
) -> Option<BestQuote> {
    let mut best: Option<(Decimal, &Observation)> = None;

    for obs in observations {
        let Some(price) = obs.parsed_price() else {
            continue;
        };

        let better = match best {
            None => true,
            Some((current, _)) => match direction {
                Direction::Buy => price < current,
                Direction::Sell => price > current,
            },
        };

        if better {
            best = Some((price, obs));
        }
    }

    best.map(|(local_price, obs)| BestQuote {
        source: source.to_string(),
        currency: currency.to_string(),
        direction,
        local_price,
        merchant: obs.merchant.clone(),
    })
}

/// Reduce both sides of one (source, currency) query
pub fn reduce_both(
    source: &str,
    currency: &str,
    buys: &[Observation],
    sells: &[Observation],
) -> BestQuotes {
    BestQuotes {
        buy: reduce(source, currency, Direction::Buy, buys),
        sell: reduce(source, currency, Direction::Sell, sells),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn obs(items: &[(&str, &str)]) -> Vec<Observation> {
        items.iter().map(|(p, m)| Observation::new(*p, *m)).collect()
    }

    #[test]
    fn test_buy_takes_minimum() {
        let list = obs(&[("1610", "a"), ("1598.5", "b"), ("1620", "c")]);
        let best = reduce("binance", "NGN", Direction::Buy, &list).unwrap();

        assert_eq!(best.local_price, dec!(1598.5));
        assert_eq!(best.merchant, "b");
        assert_eq!(best.source, "binance");
        assert_eq!(best.currency, "NGN");
        assert_eq!(best.direction, Direction::Buy);
    }

    #[test]
    fn test_sell_takes_maximum() {
        let list = obs(&[("1610", "a"), ("1598.5", "b"), ("1620", "c")]);
        let best = reduce("okx", "NGN", Direction::Sell, &list).unwrap();

        assert_eq!(best.local_price, dec!(1620));
        assert_eq!(best.merchant, "c");
    }

    #[test]
    fn test_result_bounds_every_valid_price() {
        let list = obs(&[
            ("3.70", "a"), ("3.65", "b"), ("bad", "x"), ("3.90", "c"),
            ("3.65", "d"), ("-1", "y"), ("4.01", "e"), ("3.99", "f"),
        ]);
        let valid: Vec<Decimal> = list.iter().filter_map(|o| o.parsed_price()).collect();

        let buy = reduce("s", "BRL", Direction::Buy, &list).unwrap();
        let sell = reduce("s", "BRL", Direction::Sell, &list).unwrap();

        assert!(valid.iter().all(|p| buy.local_price <= *p));
        assert!(valid.iter().all(|p| sell.local_price >= *p));
    }

    #[test]
    fn test_ties_pick_first_seen() {
        let list = obs(&[("1.00", "first"), ("0.95", "low-1"), ("0.950", "low-2"), ("1.05", "hi-1"), ("1.05", "hi-2")]);

        for _ in 0..3 {
            let buy = reduce("s", "EUR", Direction::Buy, &list).unwrap();
            let sell = reduce("s", "EUR", Direction::Sell, &list).unwrap();
            assert_eq!(buy.merchant, "low-1");
            assert_eq!(sell.merchant, "hi-1");
        }
    }

    #[test]
    fn test_invalid_prices_are_ignored() {
        let list = obs(&[("", "a"), ("abc", "b"), ("0", "c"), ("-5", "d"), ("12,500.00", "e")]);
        let best = reduce("s", "KES", Direction::Buy, &list).unwrap();

        assert_eq!(best.local_price, dec!(12500));
        assert_eq!(best.merchant, "e");
    }

    #[test]
    fn test_no_valid_prices_is_absent() {
        assert!(reduce("s", "KES", Direction::Buy, &[]).is_none());

        let list = obs(&[("N/A", "a"), ("0.0", "b")]);
        assert!(reduce("s", "KES", Direction::Sell, &list).is_none());
    }

    #[test]
    fn test_reduce_both() {
        let buys = obs(&[("101", "a"), ("100", "b")]);
        let sells: Vec<Observation> = Vec::new();
        let quotes = reduce_both("s", "USD", &buys, &sells);

        assert_eq!(quotes.buy.unwrap().local_price, dec!(100));
        assert!(quotes.sell.is_none());
    }
}
