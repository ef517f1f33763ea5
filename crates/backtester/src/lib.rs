//! # Backtest Orchestrator
//!
//! Sequences a market data source, a strategy and the position ledger into a
//! deterministic bar-by-bar simulation, then hands the equity curve to the
//! performance analyzer.

use crate::error::BacktestError;
use analytics::{Annualization, Frequency, PerformanceAnalyzer};
use configuration::{BacktestSettings, Config};
use core_types::{Bar, EquityPoint};
use events::{BacktestEvent, EventJournal, Fill, Liquidation, Rejection};
use indicatif::{ProgressBar, ProgressStyle};
use ledger::PositionLedger;
use market_data::MarketDataSource;
use std::fmt;
use strategies::{create_strategy, Strategy};
use uuid::Uuid;

pub mod error;
pub mod outcome;

pub use outcome::BacktestOutcome;

/// Where a run currently stands. Phases only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    WarmingUp,
    Running,
    Liquidating,
    Complete,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Idle => "idle",
            RunPhase::WarmingUp => "warming up",
            RunPhase::Running => "running",
            RunPhase::Liquidating => "liquidating",
            RunPhase::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// The main backtesting engine.
///
/// A `Backtester` owns its ledger, strategy and equity curve and drives
/// exactly one run; independent runs each need their own instance.
pub struct Backtester {
    // --- Context ---
    run_id: Uuid,
    settings: BacktestSettings,
    frequency: Frequency,
    show_progress: bool,
    // --- Components ---
    ledger: PositionLedger,
    strategy: Box<dyn Strategy>,
    analyzer: PerformanceAnalyzer,
    // --- Run state ---
    phase: RunPhase,
    equity_curve: Vec<EquityPoint>,
    journal: EventJournal,
    rejected_orders: usize,
    bars_processed: usize,
}

impl Backtester {
    /// Wires a backtester from its parts. Fails with `UnknownFrequency` when
    /// `settings.frequency` is not a supported sampling frequency.
    pub fn new(
        settings: BacktestSettings,
        ledger: PositionLedger,
        strategy: Box<dyn Strategy>,
        analyzer: PerformanceAnalyzer,
    ) -> Result<Self, BacktestError> {
        let frequency = settings.frequency.parse::<Frequency>()?;

        Ok(Self {
            run_id: Uuid::new_v4(),
            settings,
            frequency,
            show_progress: false,
            ledger,
            strategy,
            analyzer,
            phase: RunPhase::Idle,
            equity_curve: Vec::new(),
            journal: EventJournal::new(),
            rejected_orders: 0,
            bars_processed: 0,
        })
    }

    /// Builds the ledger, strategy and analyzer described by a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, BacktestError> {
        let ledger = PositionLedger::new(config.ledger.clone());
        let strategy = create_strategy(config.backtest.strategy, &config.strategies)?;
        let analyzer = PerformanceAnalyzer::new(Annualization::new(
            config.annualization.trading_days_per_year,
            config.annualization.trading_hours_per_day,
        ));
        Self::new(config.backtest.clone(), ledger, strategy, analyzer)
    }

    /// Draws a terminal progress bar while running.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    /// Runs the simulation over every remaining bar of `source`.
    ///
    /// Rejected orders are logged, journaled and counted; they never stop the
    /// run. Strategy, data and analytics errors do, and are returned as is.
    pub fn run(
        &mut self,
        source: &mut dyn MarketDataSource,
    ) -> Result<BacktestOutcome, BacktestError> {
        if self.phase != RunPhase::Idle {
            return Err(BacktestError::AlreadyCompleted);
        }
        if !source.has_more() {
            return Err(BacktestError::DataUnavailable);
        }

        tracing::info!(
            run_id = %self.run_id,
            strategy = self.strategy.name(),
            symbol = %self.settings.symbol,
            bars = source.len(),
            "Starting backtest"
        );

        // --- 1. WARM-UP ---
        self.transition(RunPhase::WarmingUp);
        let mut history = Vec::with_capacity(self.settings.warmup_bars);
        while history.len() < self.settings.warmup_bars && source.has_more() {
            history.push(source.next_bar()?);
        }
        self.strategy.initialize(&history)?;
        tracing::debug!(bars = history.len(), "Strategy warmed up");

        // --- 2. MAIN LOOP ---
        self.transition(RunPhase::Running);
        let progress_bar = self.progress_bar(source.len().saturating_sub(history.len()))?;
        let mut last_bar: Option<Bar> = None;

        while source.has_more() {
            let bar = source.next_bar()?;
            self.process_bar(&bar)?;
            progress_bar.inc(1);
            last_bar = Some(bar);
        }
        progress_bar.finish_and_clear();

        // --- 3. LIQUIDATION ---
        self.transition(RunPhase::Liquidating);
        // With every bar spent on warm-up, the last warm-up bar closes the run.
        let final_bar = match last_bar {
            Some(bar) => bar,
            None => source.current().cloned().ok_or(BacktestError::DataUnavailable)?,
        };

        let trades = self.ledger.close_all_positions(&final_bar);
        self.journal.push(BacktestEvent::Liquidation(Liquidation {
            timestamp: final_bar.timestamp,
            price: final_bar.close,
            trades,
        }));
        let final_equity = self.ledger.total_equity(&final_bar);
        self.equity_curve
            .push(EquityPoint::new(final_bar.timestamp, final_equity));

        // --- 4. REPORT ---
        self.transition(RunPhase::Complete);
        let report = self.analyzer.report(
            &self.equity_curve,
            self.ledger.trades(),
            self.frequency,
            self.settings.risk_free_rate,
        )?;

        let outcome = BacktestOutcome {
            run_id: self.run_id,
            strategy: self.strategy.name().to_string(),
            symbol: self.settings.symbol.clone(),
            bars_processed: self.bars_processed,
            initial_cash: self.ledger.config().initial_cash,
            realized_pnl: self.ledger.realized_pnl(),
            final_equity,
            trades: self.ledger.trades().to_vec(),
            orders: self.ledger.orders().to_vec(),
            rejected_orders: self.rejected_orders,
            equity_curve: self.equity_curve.clone(),
            report,
            journal: self.journal.clone(),
        };

        tracing::info!(
            run_id = %self.run_id,
            bars = outcome.bars_processed,
            trades = outcome.trades.len(),
            rejected = outcome.rejected_orders,
            realized_pnl = %outcome.realized_pnl,
            final_equity = %outcome.final_equity,
            "Backtest complete"
        );

        Ok(outcome)
    }

    /// Signal, order and fill for one bar, then its equity point.
    fn process_bar(&mut self, bar: &Bar) -> Result<(), BacktestError> {
        if let Some(signal) = self.strategy.on_bar(bar, self.ledger.positions())? {
            let order = self.strategy.generate_order(
                &signal,
                bar,
                self.settings.order_budget,
                self.ledger.positions(),
            )?;
            self.journal.push(BacktestEvent::Signal(signal));
            self.journal.push(BacktestEvent::Order(order.clone()));

            match self.ledger.execute(&order) {
                Ok(trade) => self.journal.push(BacktestEvent::Fill(Fill {
                    order,
                    trade,
                    cash: self.ledger.cash(),
                })),
                Err(e) => {
                    self.rejected_orders += 1;
                    tracing::warn!(timestamp = %bar.timestamp, error = %e, "Order rejected");
                    self.journal.push(BacktestEvent::Rejected(Rejection {
                        order,
                        reason: e.to_string(),
                    }));
                }
            }
        }

        let equity = self.ledger.total_equity(bar);
        tracing::debug!(timestamp = %bar.timestamp, close = %bar.close, %equity, "Bar processed");
        self.equity_curve.push(EquityPoint::new(bar.timestamp, equity));
        self.bars_processed += 1;
        Ok(())
    }

    fn transition(&mut self, phase: RunPhase) {
        tracing::info!(run_id = %self.run_id, from = %self.phase, to = %phase, "Backtest phase");
        self.phase = phase;
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar, BacktestError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );
        Ok(progress_bar)
    }
}
