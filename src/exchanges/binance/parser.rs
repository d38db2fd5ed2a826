use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::exchanges::utils::observation_from;
use crate::shared::errors::AdapterError;
use crate::shared::types::{Direction, Observation};

/// Body of the P2P advertisement search
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub page: u32,
    pub rows: u32,
    pub pay_types: Vec<String>,
    pub asset: &'a str,
    pub fiat: &'a str,
    pub trade_type: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub code: Option<String>,
    pub message: Option<String>,
    pub data: Option<Vec<AdvEntry>>,
    pub success: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AdvEntry {
    pub adv: Option<Adv>,
    pub advertiser: Option<Advertiser>,
}

#[derive(Debug, Deserialize)]
pub struct Adv {
    pub price: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Advertiser {
    #[serde(rename = "nickName")]
    pub nick_name: Option<String>,
}

pub struct BinanceP2pParser;

impl BinanceP2pParser {
    /// `tradeType` value for the side we want to trade on
    pub fn trade_type(direction: Direction) -> &'static str {
        match direction {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }

    pub fn parse_observations(&self, response: SearchResponse) -> Result<Vec<Observation>, AdapterError> {
        if response.success == Some(false) {
            return Err(AdapterError::Rejected(format!(
                "code={} message={}",
                response.code.as_deref().unwrap_or("?"),
                response.message.as_deref().unwrap_or(""),
            )));
        }

        let entries = response
            .data
            .ok_or_else(|| AdapterError::Parse("search response has no data field".to_string()))?;

        Ok(entries
            .iter()
            .filter_map(|entry| {
                let price = entry.adv.as_ref().and_then(|adv| adv.price.as_ref());
                let merchant = entry.advertiser.as_ref().and_then(|a| a.nick_name.as_deref());
                observation_from(price, merchant)
            })
            .collect())
    }
}
