//! # Strategy Library
//!
//! This crate contains the trading logic for the backtester. It defines a
//! universal `Strategy` trait and provides the concrete implementations.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** Strategies have no knowledge of files, the ledger or the
//!   orchestration loop. They see bars and a read-only view of open positions.
//! - **Strategy Agnostic Engine:** By using the `Strategy` trait, the `backtester`
//!   can drive any strategy without knowing its internal details.
//! - **Extensibility:** Adding a new strategy involves creating a new module, implementing
//!   the `Strategy` trait, and adding it to the `StrategyId` enum and `factory`.
//!
//! ## Public API
//!
//! - `Strategy`: The core trait all strategies implement.
//! - `create_strategy`: The factory function to construct a strategy instance.
//! - The concrete strategy structs themselves (e.g., `SmaCrossover`).

// Declare all the modules that constitute this crate.
pub mod buy_and_hold;
pub mod error;
pub mod factory;
pub mod sizing;
pub mod sma_crossover;

// Re-export the key components to create a clean, public-facing API.
pub use buy_and_hold::BuyAndHold;
pub use error::StrategyError;
pub use factory::create_strategy;
pub use sma_crossover::SmaCrossover;

// Re-export StrategyId from core_types
pub use core_types::StrategyId;

use core_types::{Bar, Order, PositionBook, Signal};
use rust_decimal::Decimal;

/// The contract every trading strategy implements.
///
/// The backtester calls `initialize` once with the warm-up history, then
/// `on_bar` for every subsequent bar. When `on_bar` returns a signal, the
/// backtester asks `generate_order` to size it against a notional budget.
///
/// The `Send` bound allows independent backtests (e.g., a parameter sweep) to
/// run their strategies on separate threads.
pub trait Strategy: Send {
    /// A short, stable identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Seeds internal state from historical bars. No orders result from this.
    fn initialize(&mut self, history: &[Bar]) -> Result<(), StrategyError>;

    /// Evaluates the strategy on a new bar.
    ///
    /// * `Ok(Some(Signal))` - if the strategy's conditions are met to generate a trade signal.
    /// * `Ok(None)` - if no action should be taken.
    fn on_bar(&mut self, bar: &Bar, positions: &PositionBook) -> Result<Option<Signal>, StrategyError>;

    /// Turns a signal into a concrete market order for the current bar.
    fn generate_order(
        &self,
        signal: &Signal,
        bar: &Bar,
        budget: Decimal,
        positions: &PositionBook,
    ) -> Result<Order, StrategyError>;
}
