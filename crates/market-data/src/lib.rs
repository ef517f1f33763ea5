//! # Market Data
//!
//! A restartable, finite stream of price bars for the backtester, plus a loader
//! for the `timestamp,open,high,low,close,volume` CSV format.

pub mod csv_loader;
pub mod error;
pub mod source;

pub use csv_loader::{load_csv, read_bars};
pub use error::DataError;
pub use source::{BarSeries, MarketDataSource};
