//! # Backtest Events
//!
//! This crate defines the messages that describe what happened during a
//! backtest run, in the order the orchestrator sequenced them:
//! signal, order, fill or rejection, and the final liquidation.
//!
//! It depends only on `core-types` and is the definitive record of a run's
//! decisions, independent of how they are displayed.

pub mod error;
pub mod journal;
pub mod messages;

pub use error::EventsError;
pub use journal::EventJournal;
pub use messages::{BacktestEvent, Fill, Liquidation, Rejection};
