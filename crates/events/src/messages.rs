use chrono::{DateTime, Utc};
use core_types::{Order, Signal, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An order the ledger accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub order: Order,
    /// The realised trade, when the order reduced, closed or reversed a position.
    pub trade: Option<Trade>,
    /// Ledger cash right after the fill.
    pub cash: Decimal,
}

/// An order the ledger turned away. The run carries on regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub order: Order,
    pub reason: String,
}

/// The forced close of every open position once the data is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquidation {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub trades: Vec<Trade>,
}

/// One step of a backtest run.
///
/// Serialized with `#[serde(tag = "type", content = "payload")]`, so a fill
/// looks like:
/// `{
///   "type": "Fill",
///   "payload": { "order": { ... }, "trade": null, "cash": "98997.30" }
/// }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum BacktestEvent {
    /// The strategy emitted a signal.
    Signal(Signal),
    /// The strategy sized an order for that signal and it was submitted to the ledger.
    Order(Order),
    /// The ledger accepted the order.
    Fill(Fill),
    /// The ledger rejected the order.
    Rejected(Rejection),
    /// End-of-data liquidation.
    Liquidation(Liquidation),
}

impl BacktestEvent {
    /// Bar timestamp the event belongs to.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            BacktestEvent::Signal(signal) => signal.timestamp,
            BacktestEvent::Order(order) => order.timestamp,
            BacktestEvent::Fill(fill) => fill.order.timestamp,
            BacktestEvent::Rejected(rejection) => rejection.order.timestamp,
            BacktestEvent::Liquidation(liquidation) => liquidation.timestamp,
        }
    }
}
