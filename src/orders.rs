//! Order data model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

/// An immutable intent submitted by a client.
///
/// `order_id` is opaque and must be globally unique across every order
/// ever submitted to this engine, resting or historical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
    pub units: i64,
}

/// A resting order in the book: an [`Order`] plus a mutable, monotonically
/// decreasing remaining quantity.
#[derive(Debug, Clone)]
pub struct ResidualOrder {
    pub order: Order,
    pub remaining_units: i64,
}

impl ResidualOrder {
    pub fn new(order: Order) -> Self {
        let remaining_units = order.units;
        Self {
            order,
            remaining_units,
        }
    }
}
