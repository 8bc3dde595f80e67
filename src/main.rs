//! Demo binary: spawns one engine for a hardcoded symbol, walks it
//! through a scripted sequence of orders and lifecycle commands, and
//! logs the resulting events and replies. A stand-in for a transport
//! layer, which is out of scope for this crate.

use matching_engine::{Event, Order, Side, Symbol};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn order(id: &str, symbol: &str, side: Side, price: Decimal, units: i64) -> Order {
    Order {
        order_id: id.to_string(),
        symbol: symbol.to_string(),
        side,
        price,
        units,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let symbol = Symbol::new("BTC-USD")?;
    let (handle, mut events) = matching_engine::spawn(symbol.clone());

    let watcher = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::OrderPlaced { order } => info!(order_id = %order.order_id, "order placed"),
                Event::PriceChanged { bid, ask, .. } => info!(?bid, ?ask, "price changed"),
                Event::TradeSettled {
                    price,
                    units,
                    bid_order_id,
                    ask_order_id,
                    ..
                } => info!(%bid_order_id, %ask_order_id, %price, units, "trade settled"),
            }
        }
    });

    let price = handle.get_price().await?;
    info!(?price, "empty-book quote");

    let bid = handle
        .place_bid(order("1", symbol.as_str(), Side::Bid, dec!(100), 50))
        .await?;
    info!(?bid, "placed resting bid");

    let ask = handle
        .place_ask(order("2", symbol.as_str(), Side::Ask, dec!(100), 50))
        .await?;
    info!(?ask, "placed crossing ask");

    let trades = handle.get_trades().await?;
    info!(count = trades.orders.len(), reason = %trades.reason, "trades so far");

    handle.halt()?;
    let rejected = handle
        .place_bid(order("3", symbol.as_str(), Side::Bid, dec!(99), 20))
        .await?;
    info!(?rejected, "submitted while halted");

    handle.start()?;
    let admitted = handle
        .place_bid(order("3", symbol.as_str(), Side::Bid, dec!(99), 20))
        .await?;
    info!(?admitted, "resubmitted after resume");

    drop(handle);
    let _ = watcher.await;
    Ok(())
}
