use crate::error::AnalyticsError;
use crate::frequency::{Annualization, Frequency};
use crate::report::{PerformanceReport, TradeSummary};
use core_types::{EquityPoint, Trade};
use rust_decimal::prelude::*;

/// A stateless calculator for deriving performance statistics from an equity curve.
///
/// The curve must be chronological with one point per sampling period.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceAnalyzer {
    annualization: Annualization,
}

impl PerformanceAnalyzer {
    pub fn new(annualization: Annualization) -> Self {
        Self { annualization }
    }

    pub fn periods_per_year(&self, frequency: Frequency) -> f64 {
        self.annualization.periods_per_year(frequency)
    }

    /// Compound growth of the curve scaled to one year:
    /// `(last / first) ^ (periods_per_year / (n - 1)) - 1`.
    pub fn annualized_return(
        &self,
        curve: &[EquityPoint],
        frequency: Frequency,
    ) -> Result<f64, AnalyticsError> {
        ensure_len(curve, 2)?;

        let start = positive_f64(curve[0].equity)?;
        let end = positive_f64(curve[curve.len() - 1].equity)?;
        let periods = (curve.len() - 1) as f64;

        Ok((end / start).powf(self.periods_per_year(frequency) / periods) - 1.0)
    }

    /// Sample standard deviation (`n - 1` denominator) of the per-period log
    /// returns, scaled by `sqrt(periods_per_year)`.
    pub fn annualized_volatility(
        &self,
        curve: &[EquityPoint],
        frequency: Frequency,
    ) -> Result<f64, AnalyticsError> {
        ensure_len(curve, 3)?;

        let equities = curve
            .iter()
            .map(|point| positive_f64(point.equity))
            .collect::<Result<Vec<_>, _>>()?;

        // 1. Log returns between consecutive points.
        let returns: Vec<f64> = equities.windows(2).map(|w| (w[1] / w[0]).ln()).collect();

        // 2. Mean and sample variance, accumulated in curve order.
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / (n - 1.0);

        Ok((variance * self.periods_per_year(frequency)).sqrt())
    }

    /// Excess annualized return per unit of annualized volatility.
    ///
    /// Exactly `0.0` when the curve has no volatility.
    pub fn sharpe_ratio(
        &self,
        curve: &[EquityPoint],
        frequency: Frequency,
        risk_free_rate: f64,
    ) -> Result<f64, AnalyticsError> {
        let annual_return = self.annualized_return(curve, frequency)?;
        let volatility = self.annualized_volatility(curve, frequency)?;

        if volatility == 0.0 {
            return Ok(0.0);
        }
        Ok((annual_return - risk_free_rate) / volatility)
    }

    /// Largest peak-to-trough decline of the curve, in money and as a
    /// percentage of the running peak.
    pub fn max_drawdown(&self, curve: &[EquityPoint]) -> (Decimal, Decimal) {
        let Some(first) = curve.first() else {
            return (Decimal::ZERO, Decimal::ZERO);
        };

        let mut peak = first.equity;
        let mut max_drawdown = Decimal::ZERO;
        let mut max_drawdown_pct = Decimal::ZERO;

        for point in curve {
            if point.equity > peak {
                peak = point.equity;
            }
            let drawdown = peak - point.equity;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
            if peak > Decimal::ZERO {
                max_drawdown_pct = max_drawdown_pct.max(drawdown / peak * Decimal::ONE_HUNDRED);
            }
        }

        (max_drawdown, max_drawdown_pct)
    }

    /// Computes every statistic for a finished run.
    ///
    /// # Arguments
    ///
    /// * `curve` - One equity point per processed bar plus the final point after liquidation.
    /// * `trades` - The ledger's realised trade log.
    /// * `frequency` - Sampling frequency of the bars.
    /// * `risk_free_rate` - Annual rate subtracted from the return in the Sharpe ratio.
    ///
    /// # Returns
    ///
    /// The `PerformanceReport`, or the first `AnalyticsError` raised by the
    /// annualized statistics.
    pub fn report(
        &self,
        curve: &[EquityPoint],
        trades: &[Trade],
        frequency: Frequency,
        risk_free_rate: f64,
    ) -> Result<PerformanceReport, AnalyticsError> {
        let annualized_return = self.annualized_return(curve, frequency)?;
        let annualized_volatility = self.annualized_volatility(curve, frequency)?;
        let sharpe_ratio = self.sharpe_ratio(curve, frequency, risk_free_rate)?;
        let (max_drawdown, max_drawdown_pct) = self.max_drawdown(curve);

        let total_return_pct = match (curve.first(), curve.last()) {
            (Some(first), Some(last)) if first.equity > Decimal::ZERO => {
                (last.equity - first.equity) / first.equity * Decimal::ONE_HUNDRED
            }
            _ => Decimal::ZERO,
        };

        tracing::debug!(
            %frequency,
            points = curve.len(),
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            "Performance report computed"
        );

        Ok(PerformanceReport {
            frequency,
            periods_per_year: self.periods_per_year(frequency),
            annualized_return,
            annualized_volatility,
            risk_free_rate,
            sharpe_ratio,
            total_return_pct,
            max_drawdown,
            max_drawdown_pct,
            trades: TradeSummary::from_trades(trades),
        })
    }
}

fn ensure_len(curve: &[EquityPoint], required: usize) -> Result<(), AnalyticsError> {
    if curve.len() < required {
        return Err(AnalyticsError::CurveTooShort {
            required,
            actual: curve.len(),
        });
    }
    Ok(())
}

fn positive_f64(equity: Decimal) -> Result<f64, AnalyticsError> {
    equity
        .to_f64()
        .filter(|value| *value > 0.0)
        .ok_or(AnalyticsError::NonPositiveEquity)
}
