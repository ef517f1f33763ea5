use crate::enums::{Direction, OrderType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Open positions keyed by symbol. Ordered so that iteration is deterministic.
pub type PositionBook = BTreeMap<String, Position>;

/// One OHLCV price sample for a fixed time interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// A strategy's intent for a symbol at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub direction: Direction,
}

/// An instruction to trade `quantity` units of `symbol` at `price`.
///
/// `quantity` is signed: positive buys, negative sells. `direction` always
/// agrees with that sign when the order is built through [`Order::market`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub direction: Direction,
    pub price: Decimal,
    pub order_type: OrderType,
    pub quantity: Decimal,
}

impl Order {
    /// Builds an immediate-fill market order whose direction is derived from the
    /// sign of `quantity`.
    pub fn market(
        timestamp: DateTime<Utc>,
        symbol: impl Into<String>,
        price: Decimal,
        quantity: Decimal,
    ) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            direction: Direction::from_quantity(quantity),
            price,
            order_type: OrderType::Market,
            quantity,
        }
    }

    /// Gross value of the order, ignoring commission.
    pub fn notional(&self) -> Decimal {
        self.quantity.abs() * self.price
    }
}

/// The ledger's current net holding in one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    /// Signed net quantity; never zero while the position exists.
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub direction: Direction,
}

impl Position {
    pub fn new(symbol: impl Into<String>, quantity: Decimal, average_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            average_price,
            direction: Direction::from_quantity(quantity),
        }
    }

    /// Replaces the net quantity, keeping `direction` in step with its sign.
    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
        self.direction = Direction::from_quantity(quantity);
    }

    pub fn is_long(&self) -> bool {
        self.direction == Direction::Buy
    }

    /// Mark-to-market profit of the position at `price`, before commission.
    pub fn gross_pnl_at(&self, price: Decimal) -> Decimal {
        self.quantity * (price - self.average_price)
    }
}

/// A realised close (or partial close) of a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// The order that reduced the position.
    pub order: Order,
    /// Closed quantity, signed like the position it was taken from.
    pub quantity: Decimal,
    /// Average entry price of the position at the moment of the close.
    pub entry_price: Decimal,
    /// Realised profit, net of commission.
    pub pnl: Decimal,
    pub commission: Decimal,
}

impl Trade {
    pub fn exit_price(&self) -> Decimal {
        self.order.price
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    /// Side of the position that was closed, as opposed to the closing order's side.
    pub fn position_side(&self) -> Direction {
        Direction::from_quantity(self.quantity)
    }
}

/// A total-equity snapshot on the equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: Decimal,
}

impl EquityPoint {
    pub fn new(timestamp: DateTime<Utc>, equity: Decimal) -> Self {
        Self { timestamp, equity }
    }
}
