//! Admission checks.
//!
//! An order is invalid if its price or units are non-positive, or if its
//! `order_id` has already been seen by this engine — resting, filled, or
//! otherwise. Format validation (non-empty id, matching symbol) is the
//! command source's responsibility and is not repeated here.

use crate::book::Book;
use crate::orders::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    NonPositivePrice,
    NonPositiveUnits,
    DuplicateOrderId,
}

pub fn validate(order: &Order, book: &Book) -> Result<(), ValidationError> {
    if order.price.is_sign_negative() || order.price.is_zero() {
        return Err(ValidationError::NonPositivePrice);
    }
    if order.units <= 0 {
        return Err(ValidationError::NonPositiveUnits);
    }
    if book.order_id_ever_seen(&order.order_id) {
        return Err(ValidationError::DuplicateOrderId);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{Order, ResidualOrder, Side};
    use rust_decimal_macros::dec;

    fn order(id: &str, side: Side, price: rust_decimal::Decimal, units: i64) -> Order {
        Order {
            order_id: id.to_string(),
            symbol: "X".to_string(),
            side,
            price,
            units,
        }
    }

    #[test]
    fn rejects_non_positive_price_and_units() {
        let book = Book::new();
        assert_eq!(
            validate(&order("1", Side::Bid, dec!(0), 5), &book),
            Err(ValidationError::NonPositivePrice)
        );
        assert_eq!(
            validate(&order("1", Side::Bid, dec!(-1), 5), &book),
            Err(ValidationError::NonPositivePrice)
        );
        assert_eq!(
            validate(&order("1", Side::Bid, dec!(10), 0), &book),
            Err(ValidationError::NonPositiveUnits)
        );
    }

    #[test]
    fn rejects_duplicate_order_id_even_after_full_fill() {
        let mut book = Book::new();
        let filled = order("1", Side::Bid, dec!(10), 5);
        book.push_trade(crate::trade::Trade {
            bid_order: filled.clone(),
            ask_order: order("2", Side::Ask, dec!(10), 5),
            price: dec!(10),
            units: 5,
        });

        assert_eq!(
            validate(&order("1", Side::Bid, dec!(11), 3), &book),
            Err(ValidationError::DuplicateOrderId)
        );
    }

    #[test]
    fn rejects_duplicate_order_id_while_resting() {
        let mut book = Book::new();
        book.insert(ResidualOrder::new(order("1", Side::Bid, dec!(10), 5)));

        assert_eq!(
            validate(&order("1", Side::Ask, dec!(11), 3), &book),
            Err(ValidationError::DuplicateOrderId)
        );
    }
}
