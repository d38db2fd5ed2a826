//! Arbitrage domain - profit calculation and opportunity search

pub mod opportunity_finder;
pub mod profit_calculator;

pub use opportunity_finder::{find_opportunities, DEFAULT_MIN_PROFIT_PCT};
pub use profit_calculator::{calculate_profit, ProfitCalculation};
