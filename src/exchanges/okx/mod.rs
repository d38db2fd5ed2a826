pub mod adapter;
pub mod parser;

pub use adapter::OkxP2pAdapter;
pub use parser::OkxP2pParser;
