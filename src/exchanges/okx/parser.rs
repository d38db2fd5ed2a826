use serde::Deserialize;
use serde_json::Value;

use crate::exchanges::utils::observation_from;
use crate::shared::errors::AdapterError;
use crate::shared::types::{Direction, Observation};

#[derive(Debug, Deserialize)]
pub struct BooksResponse {
    pub code: Option<Value>,
    pub msg: Option<String>,
    pub data: Option<BooksData>,
}

#[derive(Debug, Deserialize)]
pub struct BooksData {
    #[serde(default)]
    pub buy: Vec<OrderEntry>,
    #[serde(default)]
    pub sell: Vec<OrderEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OrderEntry {
    pub price: Option<Value>,
    #[serde(rename = "nickName")]
    pub nick_name: Option<String>,
}

pub struct OkxP2pParser;

impl OkxP2pParser {
    /// Merchant-side book that serves our direction: we buy from sellers and sell to buyers
    pub fn merchant_side(direction: Direction) -> &'static str {
        match direction {
            Direction::Buy => "sell",
            Direction::Sell => "buy",
        }
    }

    pub fn parse_observations(
        &self,
        response: BooksResponse,
        direction: Direction,
    ) -> Result<Vec<Observation>, AdapterError> {
        let code_ok = match &response.code {
            None => true,
            Some(Value::Number(n)) => n.as_i64() == Some(0),
            Some(Value::String(s)) => s == "0",
            Some(_) => false,
        };
        if !code_ok {
            return Err(AdapterError::Rejected(format!(
                "code={} msg={}",
                response.code.as_ref().map(Value::to_string).unwrap_or_default(),
                response.msg.as_deref().unwrap_or(""),
            )));
        }

        let data = response
            .data
            .ok_or_else(|| AdapterError::Parse("order book response has no data field".to_string()))?;

        let entries = match direction {
            Direction::Buy => &data.sell,
            Direction::Sell => &data.buy,
        };

        Ok(entries
            .iter()
            .filter_map(|entry| observation_from(entry.price.as_ref(), entry.nick_name.as_deref()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value, direction: Direction) -> Result<Vec<Observation>, AdapterError> {
        let response: BooksResponse = serde_json::from_value(value).unwrap();
        OkxP2pParser.parse_observations(response, direction)
    }

    fn book() -> Value {
        json!({
            "code": 0,
            "msg": "",
            "data": {
                "buy": [{"price": "1570.10", "nickName": "bidder"}],
                "sell": [
                    {"price": "1,601.00", "nickName": "seller-1"},
                    {"price": "1598.40", "nickName": "seller-2"},
                    {"nickName": "no-price"}
                ]
            }
        })
    }

    #[test]
    fn test_buy_direction_reads_sell_book() {
        let observations = parse(book(), Direction::Buy).unwrap();
        assert_eq!(observations, vec![
            Observation::new("1,601.00", "seller-1"),
            Observation::new("1598.40", "seller-2"),
        ]);
    }

    #[test]
    fn test_sell_direction_reads_buy_book() {
        let observations = parse(book(), Direction::Sell).unwrap();
        assert_eq!(observations, vec![Observation::new("1570.10", "bidder")]);
    }

    #[test]
    fn test_missing_side_is_empty() {
        let observations = parse(json!({"code": "0", "data": {}}), Direction::Buy).unwrap();
        assert!(observations.is_empty());
    }

    #[test]
    fn test_error_code_is_rejected() {
        let err = parse(json!({"code": 50011, "msg": "Too Many Requests"}), Direction::Buy).unwrap_err();
        assert!(matches!(err, AdapterError::Rejected(msg) if msg.contains("50011")));
    }

    #[test]
    fn test_missing_data_is_parse_error() {
        let err = parse(json!({"code": 0}), Direction::Sell).unwrap_err();
        assert!(matches!(err, AdapterError::Parse(_)));
    }
}
