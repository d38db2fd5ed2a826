//! Quote domain - reducing marketplace observations to best quotes

mod quote_reducer;

pub use quote_reducer::{reduce, reduce_both};
