//! # Performance Analytics
//!
//! This crate turns an equity curve into risk-adjusted performance statistics.
//! It acts as the "unbiased judge" of a backtest run.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** No knowledge of data sources, strategies or the ledger.
//!   It depends only on `core-types`.
//! - **Stateless calculation:** `PerformanceAnalyzer` holds nothing but its
//!   annualization policy. It takes an equity curve (and optionally the trade
//!   log) and produces a `PerformanceReport`.
//!
//! ## Public API
//!
//! - `PerformanceAnalyzer`: annualized return, volatility, Sharpe ratio and the full report.
//! - `Frequency` / `Annualization`: how many bars make up a trading year.
//! - `PerformanceReport` / `TradeSummary`: the serializable results.
//! - `AnalyticsError`: why a statistic could not be computed.

pub mod engine;
pub mod error;
pub mod frequency;
pub mod report;

pub use engine::PerformanceAnalyzer;
pub use error::AnalyticsError;
pub use frequency::{Annualization, Frequency};
pub use report::{PerformanceReport, TradeSummary};
