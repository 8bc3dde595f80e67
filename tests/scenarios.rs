//! End-to-end matching scenarios, driven through the public
//! `EngineHandle` the way an external command source would.

use matching_engine::{Order, Side, Symbol};
use rust_decimal_macros::dec;

fn order(id: &str, symbol: &str, side: Side, price: rust_decimal::Decimal, units: i64) -> Order {
    Order {
        order_id: id.to_string(),
        symbol: symbol.to_string(),
        side,
        price,
        units,
    }
}

#[tokio::test]
async fn empty_book_quote_is_unavailable() {
    let (handle, _events) = matching_engine::spawn(Symbol::new("X").unwrap());

    let price = handle.get_price().await.unwrap();
    assert!(!price.success);
    assert_eq!(price.bid, None);
    assert_eq!(price.ask, None);
    assert_eq!(price.reason, "Price Unavailable");
}

#[tokio::test]
async fn best_bid_formation_emits_placed_then_price_changed() {
    let (handle, mut events) = matching_engine::spawn(Symbol::new("X").unwrap());

    let result = handle
        .place_bid(order("1", "X", Side::Bid, dec!(10), 1))
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.reason, "Valid Order");

    let e1 = events.recv().await.unwrap();
    assert!(matches!(e1, matching_engine::Event::OrderPlaced { .. }));
    let e2 = events.recv().await.unwrap();
    match e2 {
        matching_engine::Event::PriceChanged { bid, ask, .. } => {
            assert_eq!(bid, Some(dec!(10)));
            assert_eq!(ask, None);
        }
        other => panic!("expected PriceChanged, got {other:?}"),
    }

    let price = handle.get_price().await.unwrap();
    assert_eq!(price.bid, Some(dec!(10)));
    assert_eq!(price.ask, None);
    assert!(!price.success);
}

#[tokio::test]
async fn simple_match_produces_one_trade_and_empties_book() {
    let (handle, _events) = matching_engine::spawn(Symbol::new("X").unwrap());

    handle
        .place_bid(order("1", "X", Side::Bid, dec!(100), 50))
        .await
        .unwrap();
    handle
        .place_ask(order("2", "X", Side::Ask, dec!(100), 50))
        .await
        .unwrap();

    let trades = handle.get_trades().await.unwrap();
    assert!(trades.success);
    assert_eq!(trades.reason, "2 Orders Filled");
    let ids: std::collections::HashSet<_> =
        trades.orders.iter().map(|o| o.order_id.clone()).collect();
    assert_eq!(ids, ["1", "2"].into_iter().map(String::from).collect());

    let price = handle.get_price().await.unwrap();
    assert_eq!(price.bid, None);
    assert_eq!(price.ask, None);
}

#[tokio::test]
async fn two_trades_from_a_larger_resting_bid() {
    let (handle, _events) = matching_engine::spawn(Symbol::new("X").unwrap());

    handle
        .place_bid(order("1", "X", Side::Bid, dec!(100), 50))
        .await
        .unwrap();
    handle
        .place_ask(order("2", "X", Side::Ask, dec!(100), 10))
        .await
        .unwrap();
    handle
        .place_ask(order("3", "X", Side::Ask, dec!(99), 10))
        .await
        .unwrap();

    let trades = handle.get_trades().await.unwrap();
    assert_eq!(trades.orders.len(), 4);

    let price = handle.get_price().await.unwrap();
    assert_eq!(price.bid, Some(dec!(100)));
}

#[tokio::test]
async fn duplicate_order_id_rejected_even_after_full_fill() {
    let (handle, _events) = matching_engine::spawn(Symbol::new("X").unwrap());

    handle
        .place_bid(order("1", "X", Side::Bid, dec!(10), 5))
        .await
        .unwrap();
    handle
        .place_ask(order("2", "X", Side::Ask, dec!(10), 5))
        .await
        .unwrap();

    // Order #1 is fully filled and gone from the book, but its id still
    // must never be reused.
    let result = handle
        .place_ask(order("1", "X", Side::Ask, dec!(20), 1))
        .await
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.reason, "Invalid Order");
}

#[tokio::test]
async fn zero_price_and_zero_units_are_rejected() {
    let (handle, _events) = matching_engine::spawn(Symbol::new("X").unwrap());

    let bad_price = handle
        .place_bid(order("1", "X", Side::Bid, dec!(0), 5))
        .await
        .unwrap();
    assert!(!bad_price.success);
    assert_eq!(bad_price.reason, "Invalid Order");

    let bad_units = handle
        .place_bid(order("2", "X", Side::Bid, dec!(10), 0))
        .await
        .unwrap();
    assert!(!bad_units.success);
    assert_eq!(bad_units.reason, "Invalid Order");

    let trades = handle.get_trades().await.unwrap();
    assert!(!trades.success);
    assert_eq!(trades.reason, "No order has been executed");
}

#[tokio::test]
async fn halt_rejects_and_start_resumes() {
    let (handle, _events) = matching_engine::spawn(Symbol::new("X").unwrap());

    handle.halt().unwrap();

    let rejected = handle
        .place_bid(order("1", "X", Side::Bid, dec!(20), 1))
        .await
        .unwrap();
    assert!(!rejected.success);
    assert_eq!(rejected.reason, "Engine Halted");

    let trades = handle.get_trades().await.unwrap();
    assert!(!trades.success);

    let drain = handle.drain_check().await.unwrap();
    assert!(drain.halted);
    assert_eq!(drain.queued, 0);

    handle.start().unwrap();

    let admitted = handle
        .place_bid(order("1", "X", Side::Bid, dec!(20), 1))
        .await
        .unwrap();
    assert!(admitted.success);
    assert_eq!(admitted.reason, "Valid Order");

    let drain = handle.drain_check().await.unwrap();
    assert!(!drain.halted);
}

#[tokio::test]
async fn taker_exactly_equal_to_maker_leaves_no_residual() {
    let (handle, _events) = matching_engine::spawn(Symbol::new("X").unwrap());

    handle
        .place_ask(order("1", "X", Side::Ask, dec!(50), 10))
        .await
        .unwrap();
    handle
        .place_bid(order("2", "X", Side::Bid, dec!(50), 10))
        .await
        .unwrap();

    let price = handle.get_price().await.unwrap();
    assert_eq!(price.bid, None);
    assert_eq!(price.ask, None);

    let trades = handle.get_trades().await.unwrap();
    assert_eq!(trades.orders.len(), 2);
}
