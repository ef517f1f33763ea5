//! # Core Types
//!
//! The shared vocabulary of the backtester: bars, signals, orders, positions,
//! trades and equity points. Every other crate in the workspace depends on this
//! one and nothing here depends on them.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Direction, OrderType, StrategyId};
pub use error::CoreError;
pub use structs::{Bar, EquityPoint, Order, Position, PositionBook, Signal, Trade};
