use analytics::PerformanceReport;
use core_types::{EquityPoint, Order, Trade};
use events::EventJournal;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestOutcome {
    pub run_id: Uuid,
    pub strategy: String,
    pub symbol: String,
    /// Bars seen after warm-up.
    pub bars_processed: usize,
    pub initial_cash: Decimal,
    pub realized_pnl: Decimal,
    pub final_equity: Decimal,
    pub trades: Vec<Trade>,
    /// Orders the ledger accepted, oldest first.
    pub orders: Vec<Order>,
    pub rejected_orders: usize,
    pub equity_curve: Vec<EquityPoint>,
    pub report: PerformanceReport,
    pub journal: EventJournal,
}

impl BacktestOutcome {
    /// Final equity minus starting cash.
    pub fn net_profit(&self) -> Decimal {
        self.final_equity - self.initial_cash
    }
}
