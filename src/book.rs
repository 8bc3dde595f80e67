//! The two-sided order book.
//!
//! Price levels are kept as a [`BTreeMap`] of price to a FIFO queue of
//! resting orders, giving O(log n) insertion/removal and O(1) best-price
//! reads off the extremal key.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};

use crate::errors::EngineError;
use crate::orders::{ResidualOrder, Side};
use crate::trade::Trade;

#[derive(Debug, Default)]
pub struct Book {
    /// Buy orders, keyed by price ascending. Best bid is the highest key.
    pub bids: BTreeMap<Decimal, VecDeque<ResidualOrder>>,
    /// Sell orders, keyed by price ascending. Best ask is the lowest key.
    pub asks: BTreeMap<Decimal, VecDeque<ResidualOrder>>,
    /// Append-only history of every trade this engine has ever produced.
    pub trades: Vec<Trade>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Decimal, VecDeque<ResidualOrder>> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    /// Inserts a resting order into its side of the book.
    pub fn insert(&mut self, residual: ResidualOrder) {
        let side = residual.order.side;
        let price = residual.order.price;
        self.side_mut(side)
            .entry(price)
            .or_insert_with(VecDeque::new)
            .push_back(residual);
    }

    /// Finds the best-priced counter-order still satisfying `predicate`
    /// on `side`, and pops it off the front of its price level. Removes
    /// the level entirely once its queue is drained.
    ///
    /// `side` is the side being matched against (the *counter* side of
    /// whichever incoming order triggered the match): `Ask` when matching
    /// against asks (an incoming bid), `Bid` when matching against bids
    /// (an incoming ask).
    pub fn pop_best_counter(
        &mut self,
        side: Side,
        predicate: impl Fn(Decimal) -> bool,
    ) -> Option<ResidualOrder> {
        let book_side = self.side_mut(side);
        let price = match side {
            // Lowest ask first.
            Side::Ask => book_side.keys().next().copied(),
            // Highest bid first.
            Side::Bid => book_side.keys().next_back().copied(),
        }
        .filter(|&p| predicate(p))?;

        let level = book_side.get_mut(&price)?;
        let resting = level.pop_front();
        if level.is_empty() {
            book_side.remove(&price);
        }
        resting
    }

    /// Re-inserts a partially-filled counter-order at the front of its
    /// price level (used when a fill only partially consumes it).
    pub fn push_front_counter(&mut self, residual: ResidualOrder) {
        let side = residual.order.side;
        let price = residual.order.price;
        self.side_mut(side)
            .entry(price)
            .or_insert_with(VecDeque::new)
            .push_front(residual);
    }

    /// Reads the current remaining quantity of a resting order without
    /// mutating it.
    pub fn peek_remaining(&self, side: Side, price: Decimal, order_id: &str) -> Option<i64> {
        self.side_by_ref(side)
            .get(&price)?
            .iter()
            .find(|r| r.order.order_id == order_id)
            .map(|r| r.remaining_units)
    }

    /// Applies a fill of `qty` units to the resting order identified by
    /// `(side, price, order_id)`. Removes it (and its price level, if now
    /// empty) once its remaining quantity reaches zero. Returns whether
    /// the order is still resting afterwards, or `None` if it could not
    /// be found (a programmer error — the caller just inserted or
    /// observed it).
    pub fn apply_fill_to_resting(
        &mut self,
        side: Side,
        price: Decimal,
        order_id: &str,
        qty: i64,
    ) -> Option<bool> {
        let book_side = self.side_mut(side);
        let level = book_side.get_mut(&price)?;
        let idx = level.iter().position(|r| r.order.order_id == order_id)?;
        let remaining = {
            let resting = &mut level[idx];
            resting.remaining_units -= qty;
            resting.remaining_units
        };
        if remaining <= 0 {
            level.remove(idx);
            if level.is_empty() {
                book_side.remove(&price);
            }
            Some(false)
        } else {
            Some(true)
        }
    }

    fn side_by_ref(&self, side: Side) -> &BTreeMap<Decimal, VecDeque<ResidualOrder>> {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Whether any resting order on either side carries `order_id`.
    pub fn contains_order_id(&self, order_id: &str) -> bool {
        self.bids
            .values()
            .chain(self.asks.values())
            .any(|level| level.iter().any(|r| r.order.order_id == order_id))
    }

    /// Order id uniqueness spans resting *and* historical orders.
    pub fn order_id_ever_seen(&self, order_id: &str) -> bool {
        self.contains_order_id(order_id)
            || self.trades.iter().any(|t| {
                t.bid_order.order_id == order_id || t.ask_order.order_id == order_id
            })
    }

    pub fn push_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Quantified book invariants, checked after every command. A
    /// violation here means the book is corrupt and the engine makes no
    /// attempt to recover from it.
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        for level in self.bids.values().chain(self.asks.values()) {
            if level.iter().any(|r| r.remaining_units <= 0) {
                return Err(EngineError::InvariantViolation(
                    "resting order with non-positive remaining_units".to_string(),
                ));
            }
        }
        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            if bid >= ask {
                return Err(EngineError::InvariantViolation(format!(
                    "book crossed: best_bid {bid} >= best_ask {ask}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{Order, ResidualOrder, Side};
    use rust_decimal_macros::dec;

    fn order(id: &str, side: Side, price: Decimal, units: i64) -> Order {
        Order {
            order_id: id.to_string(),
            symbol: "X".to_string(),
            side,
            price,
            units,
        }
    }

    #[test]
    fn best_prices_reflect_inserted_orders() {
        let mut book = Book::new();
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), None);

        book.insert(ResidualOrder::new(order("1", Side::Bid, dec!(10), 5)));
        assert_eq!(book.best_bid(), Some(dec!(10)));

        book.insert(ResidualOrder::new(order("2", Side::Bid, dec!(12), 5)));
        assert_eq!(book.best_bid(), Some(dec!(12)));

        book.insert(ResidualOrder::new(order("3", Side::Ask, dec!(20), 5)));
        assert_eq!(book.best_ask(), Some(dec!(20)));
    }

    #[test]
    fn pop_best_counter_is_fifo_within_a_level() {
        let mut book = Book::new();
        book.insert(ResidualOrder::new(order("1", Side::Ask, dec!(10), 5)));
        book.insert(ResidualOrder::new(order("2", Side::Ask, dec!(10), 5)));

        let first = book.pop_best_counter(Side::Ask, |p| p <= dec!(10)).unwrap();
        assert_eq!(first.order.order_id, "1");
        let second = book.pop_best_counter(Side::Ask, |p| p <= dec!(10)).unwrap();
        assert_eq!(second.order.order_id, "2");
        assert!(book.pop_best_counter(Side::Ask, |p| p <= dec!(10)).is_none());
    }
}
