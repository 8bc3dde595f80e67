//! Event publisher.
//!
//! A single tagged-variant broadcast channel carries every market-data
//! event. Delivery is fire-and-forget: `send` on a
//! `tokio::sync::broadcast::Sender` never blocks the publisher, and a lag
//! or an absent subscriber is the sink's problem, not the engine's.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::orders::Order;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderPlaced {
        order: Order,
    },
    PriceChanged {
        symbol: String,
        bid: Option<Decimal>,
        ask: Option<Decimal>,
    },
    TradeSettled {
        symbol: String,
        bid_order_id: String,
        ask_order_id: String,
        price: Decimal,
        units: i64,
    },
}

/// Capacity chosen generously; a slow or absent subscriber only ever
/// loses its own oldest unread events (`RecvError::Lagged`), it never
/// slows down the engine.
const CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventPublisher {
    tx: broadcast::Sender<Event>,
}

impl EventPublisher {
    pub fn new() -> (Self, broadcast::Receiver<Event>) {
        let (tx, rx) = broadcast::channel(CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Fire-and-forget publish. A send error only ever means "no
    /// subscribers right now", which is not the engine's problem.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}
