use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::AppError;

/// Fiat currencies quoted by the P2P marketplaces unless configured otherwise
pub const DEFAULT_FIATS: [&str; 8] = ["NGN", "USD", "EUR", "BRL", "KES", "GBP", "CAD", "AUD"];

/// Asset traded on the marketplaces unless configured otherwise
pub const DEFAULT_ASSET: &str = "USDT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SourceKind {
    Binance,
    Okx,
    Fixture,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Binance => "binance",
            SourceKind::Okx => "okx",
            SourceKind::Fixture => "fixture",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            SourceKind::Binance => "https://p2p.binance.com",
            SourceKind::Okx => "https://www.okx.com",
            SourceKind::Fixture => "",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binance" | "binance_p2p" => Ok(SourceKind::Binance),
            "okx" | "okx_p2p" => Ok(SourceKind::Okx),
            "fixture" | "static" => Ok(SourceKind::Fixture),
            other => Err(AppError::UnknownSource(other.to_string())),
        }
    }
}

impl TryFrom<String> for SourceKind {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_parsing() {
        assert_eq!("Binance".parse::<SourceKind>().unwrap(), SourceKind::Binance);
        assert_eq!("okx_p2p".parse::<SourceKind>().unwrap(), SourceKind::Okx);
        assert_eq!("static".parse::<SourceKind>().unwrap(), SourceKind::Fixture);
        assert!(matches!("paxful".parse::<SourceKind>(), Err(AppError::UnknownSource(_))));
    }

    #[test]
    fn test_source_kind_serde() {
        let kind: SourceKind = serde_json::from_str("\"OKX\"").unwrap();
        assert_eq!(kind, SourceKind::Okx);
        assert_eq!(serde_json::to_string(&SourceKind::Binance).unwrap(), "\"binance\"");
        assert!(serde_json::from_str::<SourceKind>("\"remitano\"").is_err());
    }
}
