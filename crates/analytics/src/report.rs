use crate::frequency::Frequency;
use core_types::Trade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The standardized result of analysing one backtest run.
///
/// The three annualized statistics are `f64` because they involve logarithms
/// and fractional powers; everything derived directly from money stays `Decimal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Annualized statistics
    pub frequency: Frequency,
    pub periods_per_year: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub risk_free_rate: f64,
    pub sharpe_ratio: f64,

    // II. Curve statistics
    pub total_return_pct: Decimal,
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: Decimal,

    // III. Trade-level statistics
    pub trades: TradeSummary,
}

/// Profitability statistics over the realised trade log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub net_profit: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub profit_factor: Option<Decimal>, // None when there is no gross loss
    pub win_rate_pct: Option<Decimal>,  // None with 0 trades
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub payoff_ratio: Option<Decimal>, // None when there are no losers
}

impl TradeSummary {
    /// Aggregates realised PnL, which is already net of commission. A trade
    /// that broke even counts as a loser.
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut summary = Self {
            total_trades: trades.len(),
            ..Self::default()
        };

        for trade in trades {
            summary.net_profit += trade.pnl;
            if trade.is_winner() {
                summary.gross_profit += trade.pnl;
                summary.winning_trades += 1;
            } else {
                summary.gross_loss += trade.pnl.abs();
                summary.losing_trades += 1;
            }
        }

        if summary.gross_loss > Decimal::ZERO {
            summary.profit_factor = Some(summary.gross_profit / summary.gross_loss);
        }

        if summary.total_trades > 0 {
            summary.win_rate_pct = Some(
                Decimal::from(summary.winning_trades) / Decimal::from(summary.total_trades)
                    * Decimal::ONE_HUNDRED,
            );
        }

        if summary.winning_trades > 0 {
            summary.average_win = summary.gross_profit / Decimal::from(summary.winning_trades);
        }

        if summary.losing_trades > 0 {
            summary.average_loss = summary.gross_loss / Decimal::from(summary.losing_trades);
            if summary.average_loss > Decimal::ZERO {
                summary.payoff_ratio = Some(summary.average_win / summary.average_loss);
            }
        }

        summary
    }
}
