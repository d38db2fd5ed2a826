//! Domain layer - quote reduction, normalization and arbitrage search

pub mod arbitrage;
pub mod price;
pub mod quote;
