use serde_json::Value;

use crate::shared::types::Observation;

/// Marketplaces publish prices either as JSON strings or as numbers
pub fn price_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build an observation from optional raw fields; entries without a price are skipped
pub fn observation_from(price: Option<&Value>, merchant: Option<&str>) -> Option<Observation> {
    let price = price.and_then(price_text)?;
    Some(Observation::new(price, merchant.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::UNKNOWN_MERCHANT;
    use serde_json::json;

    #[test]
    fn test_price_text_variants() {
        assert_eq!(price_text(&json!("1612.50")), Some("1612.50".to_string()));
        assert_eq!(price_text(&json!(0.998)), Some("0.998".to_string()));
        assert_eq!(price_text(&json!(null)), None);
        assert_eq!(price_text(&json!({"v": 1})), None);
    }

    #[test]
    fn test_observation_from_missing_fields() {
        assert!(observation_from(None, Some("m")).is_none());

        let obs = observation_from(Some(&json!("5.4")), None).unwrap();
        assert_eq!(obs.price, "5.4");
        assert_eq!(obs.merchant, UNKNOWN_MERCHANT);
    }
}
