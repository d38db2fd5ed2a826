//! Price domain - exchange rates and common-unit normalization

mod price_feed;
mod normalizer;

pub use price_feed::{FixedRateProvider, RateProvider};
pub use normalizer::normalize;

/// Common unit used when none is configured
pub const DEFAULT_COMMON_UNIT: &str = "USD";
