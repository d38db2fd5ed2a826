//! Error handling for the application

use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// Reasons a source adapter could not be queried.
/// Every variant means the whole (source, currency) contribution is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Marketplace rejected request: {0}")]
    Rejected(String),

    #[error("Unexpected response structure: {0}")]
    Parse(String),

    #[error("Adapter panicked: {0}")]
    Panicked(String),

    #[error("Currency not supported: {0}")]
    UnsupportedCurrency(String),
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            AdapterError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            AdapterError::HttpStatus(status.as_u16())
        } else {
            AdapterError::Network(err.to_string())
        }
    }
}

/// Reasons a currency could not be converted into the common unit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("No exchange rate for {0}")]
    Missing(String),

    #[error("Invalid exchange rate for {currency}: {rate}")]
    NonPositive { currency: String, rate: Decimal },

    #[error("Exchange rate lookup failed: {0}")]
    Fetch(String),

    #[error("Price in {0} cannot be represented in the common unit")]
    Overflow(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown source kind: {0}")]
    UnknownSource(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = AdapterError::Rejected("code 50001".to_string());
        assert_eq!(err.to_string(), "Marketplace rejected request: code 50001");

        let err = RateError::NonPositive {
            currency: "NGN".to_string(),
            rate: Decimal::ZERO,
        };
        assert_eq!(err.to_string(), "Invalid exchange rate for NGN: 0");
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let err: AppError = toml::from_str::<toml::Value>("a = ").unwrap_err().into();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
