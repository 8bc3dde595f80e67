use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::orders::Order;

/// An immutable record of an execution.
///
/// - `price` is always the maker's (resting order's) price.
/// - `units` is the quantity filled, equal to `min` of the two residuals
///   at match time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub bid_order: Order,
    pub ask_order: Order,
    pub price: Decimal,
    pub units: i64,
}
