use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a signal, an order or a position.
///
/// `Hold` only ever appears on signals and on zero-quantity orders; a live
/// position is always `Buy` (long) or `Sell` (short).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl Direction {
    /// Derives the direction implied by a signed quantity.
    pub fn from_quantity(quantity: Decimal) -> Self {
        if quantity > Decimal::ZERO {
            Direction::Buy
        } else if quantity < Decimal::ZERO {
            Direction::Sell
        } else {
            Direction::Hold
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
            Direction::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// How an order is priced. Every order fills immediately at the bar close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
}

/// Identifies which strategy implementation the factory should build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    SmaCrossover,
    BuyAndHold,
}

impl FromStr for StrategyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sma_crossover" | "sma-crossover" | "sma" => Ok(StrategyId::SmaCrossover),
            "buy_and_hold" | "buy-and-hold" | "hold" => Ok(StrategyId::BuyAndHold),
            other => Err(CoreError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyId::SmaCrossover => "sma_crossover",
            StrategyId::BuyAndHold => "buy_and_hold",
        };
        f.write_str(s)
    }
}
