//! p2parb - P2P stablecoin price aggregation and arbitrage detection
//! Built with Domain-Driven Design principles

pub mod application;
pub mod config;
pub mod domain;
pub mod exchanges;
pub mod infrastructure;
pub mod report;
pub mod shared;

// Re-export main types for convenience
pub use application::{Orchestrator, PipelineConfig, PipelineEvent, ScanOutcome};
pub use domain::price::{FixedRateProvider, RateProvider};
pub use exchanges::SourceAdapter;
pub use report::ArbitrageReport;
