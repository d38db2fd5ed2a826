pub mod adapter;
pub mod parser;

pub use adapter::BinanceP2pAdapter;
pub use parser::BinanceP2pParser;
