//! Command dispatcher and the engine's actor loop.
//!
//! The dispatcher is realized as a single `tokio::task` that owns the
//! [`Book`] and [`Lifecycle`] and drains an unbounded `mpsc` queue one
//! command at a time to completion, so no two commands ever interleave
//! their state mutations. [`EngineHandle`] is the command-source facade:
//! every method sends onto that queue and (for commands with a reply)
//! awaits a `oneshot`, so a reply is only observed once its command's
//! state mutations — and event emissions — are complete.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{info, warn};

use crate::book::Book;
use crate::errors::EngineError;
use crate::events::{Event, EventPublisher};
use crate::instrument::Symbol;
use crate::lifecycle::Lifecycle;
use crate::matching;
use crate::orders::Order;
use crate::validator;

const REASON_VALID: &str = "Valid Order";
const REASON_INVALID: &str = "Invalid Order";
const REASON_HALTED: &str = "Engine Halted";
const REASON_PRICE_AVAILABLE: &str = "Price Available";
const REASON_PRICE_UNAVAILABLE: &str = "Price Unavailable";
const REASON_NO_TRADES: &str = "No order has been executed";

/// Inbound command types.
#[derive(Debug, Clone)]
pub enum Command {
    PlaceBid { order: Order },
    PlaceAsk { order: Order },
    GetPrice,
    GetTrades,
    Halt,
    Start,
    /// Supplemental query: reports halted state. Queueing is never
    /// performed by this engine, so `queued` is always zero.
    DrainCheck,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BidResult {
    pub success: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResult {
    pub success: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetPriceResult {
    pub bid: Option<rust_decimal::Decimal>,
    pub ask: Option<rust_decimal::Decimal>,
    pub success: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetTradesResult {
    pub orders: Vec<Order>,
    pub success: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrainCheckResult {
    pub halted: bool,
    pub queued: usize,
}

enum Reply {
    Bid(BidResult),
    Ask(AskResult),
    Price(GetPriceResult),
    Trades(GetTradesResult),
    DrainCheck(DrainCheckResult),
    None,
}

struct Envelope {
    command: Command,
    reply: Option<oneshot::Sender<Reply>>,
}

/// Command-source facade. Cloning an [`EngineHandle`] is cheap and gives
/// another independent producer; ordering is only guaranteed within a
/// single handle's submissions — producers needing a global order must
/// serialise themselves.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl EngineHandle {
    async fn call(&self, command: Command) -> Result<Reply, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                command,
                reply: Some(tx),
            })
            .map_err(|_| EngineError::ChannelClosed)?;
        rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    fn cast(&self, command: Command) -> Result<(), EngineError> {
        self.tx
            .send(Envelope {
                command,
                reply: None,
            })
            .map_err(|_| EngineError::ChannelClosed)
    }

    pub async fn place_bid(&self, order: Order) -> Result<BidResult, EngineError> {
        match self.call(Command::PlaceBid { order }).await? {
            Reply::Bid(result) => Ok(result),
            _ => unreachable!("dispatcher always answers PlaceBid with Reply::Bid"),
        }
    }

    pub async fn place_ask(&self, order: Order) -> Result<AskResult, EngineError> {
        match self.call(Command::PlaceAsk { order }).await? {
            Reply::Ask(result) => Ok(result),
            _ => unreachable!("dispatcher always answers PlaceAsk with Reply::Ask"),
        }
    }

    pub async fn get_price(&self) -> Result<GetPriceResult, EngineError> {
        match self.call(Command::GetPrice).await? {
            Reply::Price(result) => Ok(result),
            _ => unreachable!("dispatcher always answers GetPrice with Reply::Price"),
        }
    }

    pub async fn get_trades(&self) -> Result<GetTradesResult, EngineError> {
        match self.call(Command::GetTrades).await? {
            Reply::Trades(result) => Ok(result),
            _ => unreachable!("dispatcher always answers GetTrades with Reply::Trades"),
        }
    }

    pub async fn drain_check(&self) -> Result<DrainCheckResult, EngineError> {
        match self.call(Command::DrainCheck).await? {
            Reply::DrainCheck(result) => Ok(result),
            _ => unreachable!("dispatcher always answers DrainCheck with Reply::DrainCheck"),
        }
    }

    /// `Halt` carries no reply. Takes effect once the dispatcher reaches
    /// it in submission order.
    pub fn halt(&self) -> Result<(), EngineError> {
        self.cast(Command::Halt)
    }

    /// `Start` carries no reply.
    pub fn start(&self) -> Result<(), EngineError> {
        self.cast(Command::Start)
    }
}

/// Spawns the engine's single-task actor for `symbol` and returns the
/// command-source handle plus a subscription to its event stream.
pub fn spawn(symbol: Symbol) -> (EngineHandle, broadcast::Receiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel::<Envelope>();
    let (publisher, events_rx) = EventPublisher::new();

    tokio::spawn(run(symbol, rx, publisher));

    (EngineHandle { tx }, events_rx)
}

async fn run(symbol: Symbol, mut rx: mpsc::UnboundedReceiver<Envelope>, publisher: EventPublisher) {
    let mut book = Book::new();
    let mut lifecycle = Lifecycle::new();

    info!(symbol = %symbol, "engine started");

    while let Some(Envelope { command, reply }) = rx.recv().await {
        let outcome = dispatch(&symbol, command, &mut book, &mut lifecycle, &publisher);
        if let Err(violation) = book.check_invariants() {
            panic!("engine {symbol} terminating on corrupt book: {violation}");
        }
        if let Some(tx) = reply {
            // The caller may have stopped awaiting (e.g. a timed-out
            // transport); the command still ran to completion either way.
            let _ = tx.send(outcome);
        }
    }

    warn!(symbol = %symbol, "engine command channel closed, actor exiting");
}

fn dispatch(
    symbol: &Symbol,
    command: Command,
    book: &mut Book,
    lifecycle: &mut Lifecycle,
    publisher: &EventPublisher,
) -> Reply {
    match command {
        Command::PlaceBid { order } => {
            let (success, reason) = place(order, book, lifecycle, publisher);
            Reply::Bid(BidResult { success, reason })
        }
        Command::PlaceAsk { order } => {
            let (success, reason) = place(order, book, lifecycle, publisher);
            Reply::Ask(AskResult { success, reason })
        }
        Command::GetPrice => Reply::Price(get_price(book)),
        Command::GetTrades => Reply::Trades(get_trades(book)),
        Command::Halt => {
            lifecycle.halt();
            info!(symbol = %symbol, "engine halted");
            Reply::None
        }
        Command::Start => {
            lifecycle.start();
            info!(symbol = %symbol, "engine resumed");
            Reply::None
        }
        Command::DrainCheck => Reply::DrainCheck(DrainCheckResult {
            halted: !lifecycle.is_running(),
            queued: 0,
        }),
    }
}

/// Halted orders are rejected outright, never admitted, never queued,
/// and emit no events.
fn place(
    order: Order,
    book: &mut Book,
    lifecycle: &Lifecycle,
    publisher: &EventPublisher,
) -> (bool, String) {
    if !lifecycle.is_running() {
        warn!(order_id = %order.order_id, "order rejected: engine halted");
        return (false, REASON_HALTED.to_string());
    }

    match validator::validate(&order, book) {
        Err(reason) => {
            warn!(order_id = %order.order_id, ?reason, "order rejected: invalid");
            (false, REASON_INVALID.to_string())
        }
        Ok(()) => {
            matching::admit(order, book, publisher);
            (true, REASON_VALID.to_string())
        }
    }
}

fn get_price(book: &Book) -> GetPriceResult {
    let bid = book.best_bid();
    let ask = book.best_ask();
    let success = bid.is_some() && ask.is_some();
    let reason = if success {
        REASON_PRICE_AVAILABLE
    } else {
        REASON_PRICE_UNAVAILABLE
    };
    GetPriceResult {
        bid,
        ask,
        success,
        reason: reason.to_string(),
    }
}

fn get_trades(book: &Book) -> GetTradesResult {
    let orders: Vec<Order> = book
        .trades
        .iter()
        .flat_map(|t| [t.bid_order.clone(), t.ask_order.clone()])
        .collect();

    let success = !orders.is_empty();
    let reason = if success {
        format!("{} Orders Filled", orders.len())
    } else {
        REASON_NO_TRADES.to_string()
    };

    GetTradesResult {
        orders,
        success,
        reason,
    }
}
