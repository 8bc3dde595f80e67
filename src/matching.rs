//! Crossing algorithm.
//!
//! `admit` assumes `order` has already passed [`crate::validator::validate`]
//! against `book`. It inserts the order, then repeatedly crosses it
//! against the best available counter-orders, publishing events in a
//! fixed order: `OrderPlaced` → `PriceChanged`? (after admit) → for each
//! fill: `TradeSettled` then `PriceChanged`? (after that fill).

use rust_decimal::Decimal;

use crate::book::Book;
use crate::events::{Event, EventPublisher};
use crate::orders::{Order, ResidualOrder, Side};
use crate::trade::Trade;

pub fn admit(order: Order, book: &mut Book, publisher: &EventPublisher) {
    let symbol = order.symbol.clone();
    let own_side = order.side;
    let order_id = order.order_id.clone();
    let price = order.price;

    let before_admit = (book.best_bid(), book.best_ask());
    book.insert(ResidualOrder::new(order.clone()));
    publisher.publish(Event::OrderPlaced {
        order: order.clone(),
    });
    let after_admit = (book.best_bid(), book.best_ask());
    if before_admit != after_admit {
        publisher.publish(price_changed(&symbol, after_admit));
    }

    let counter_side = match own_side {
        Side::Bid => Side::Ask,
        Side::Ask => Side::Bid,
    };
    let crosses = |counter_price: Decimal| match own_side {
        Side::Bid => counter_price <= price,
        Side::Ask => counter_price >= price,
    };

    loop {
        let remaining = match book.peek_remaining(own_side, price, &order_id) {
            Some(r) if r > 0 => r,
            _ => break,
        };

        let before_fill = (book.best_bid(), book.best_ask());
        let Some(mut counter) = book.pop_best_counter(counter_side, crosses) else {
            break;
        };

        let units = remaining.min(counter.remaining_units);
        let trade = build_trade(own_side, &order, &counter.order, counter.order.price, units);
        publisher.publish(Event::TradeSettled {
            symbol: symbol.clone(),
            bid_order_id: trade.bid_order.order_id.clone(),
            ask_order_id: trade.ask_order.order_id.clone(),
            price: trade.price,
            units: trade.units,
        });
        book.push_trade(trade);

        counter.remaining_units -= units;
        if counter.remaining_units > 0 {
            book.push_front_counter(counter);
        }
        let still_resting = book
            .apply_fill_to_resting(own_side, price, &order_id, units)
            .unwrap_or(false);

        let after_fill = (book.best_bid(), book.best_ask());
        if before_fill != after_fill {
            publisher.publish(price_changed(&symbol, after_fill));
        }

        if !still_resting {
            break;
        }
    }
}

fn build_trade(taker_side: Side, taker: &Order, maker: &Order, maker_price: Decimal, units: i64) -> Trade {
    let (bid_order, ask_order) = match taker_side {
        Side::Bid => (taker.clone(), maker.clone()),
        Side::Ask => (maker.clone(), taker.clone()),
    };
    Trade {
        bid_order,
        ask_order,
        price: maker_price,
        units,
    }
}

fn price_changed(symbol: &str, (bid, ask): (Option<Decimal>, Option<Decimal>)) -> Event {
    Event::PriceChanged {
        symbol: symbol.to_string(),
        bid,
        ask,
    }
}
