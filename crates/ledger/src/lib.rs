//! # Position Ledger
//!
//! Turns a stream of market orders into cash movements, weighted-average
//! position pricing and realised trades, under a leveraged margin check.
//!
//! ## Public API
//!
//! - `PositionLedger`: owns cash, open positions and the order/trade logs.
//! - `LedgerError`: why an order was rejected.

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::PositionLedger;
