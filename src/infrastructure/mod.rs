//! Infrastructure layer - external data feeds

pub mod fiat_rates;

pub use fiat_rates::{build_rate_provider, OpenErApiRateProvider};
