use core_types::StrategyId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::error::ConfigError;

/// The root configuration structure for a backtest run.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub annualization: AnnualizationSettings,
    #[serde(default)]
    pub strategies: Strategies,
}

/// Everything the position ledger needs at construction. There are no
/// defaults: a ledger is never built from implicit cash or commission values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerConfig {
    /// Starting cash balance.
    pub initial_cash: Decimal,
    /// Flat commission charged per order (not per unit).
    pub commission: Decimal,
    /// Multiplier applied to cash in the margin check. 1.0 means no leverage.
    pub leverage: Decimal,
    /// How a position reversal is charged.
    #[serde(default)]
    pub reversal_commission: ReversalCommission,
}

/// How commission is charged when a single order flips a position from long to
/// short (or the reverse).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ReversalCommission {
    /// The closing leg and the opening leg are each charged one commission.
    /// Final equity always equals initial cash plus realised PnL once flat.
    #[default]
    PerLeg,
    /// Only the closing leg is charged. Final equity then exceeds initial cash
    /// plus realised PnL by one commission per reversal.
    Once,
}

/// Parameters of the orchestration loop.
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestSettings {
    /// Symbol assigned to every bar read from the data file (e.g., "NQ").
    pub symbol: String,
    pub strategy: StrategyId,
    /// Number of bars handed to the strategy as history before trading starts.
    pub warmup_bars: usize,
    /// Fixed notional budget the strategy sizes each order against.
    pub order_budget: Decimal,
    /// Sampling frequency of the bars ("daily", "hourly", "minute").
    pub frequency: String,
    #[serde(default)]
    pub risk_free_rate: f64,
}

/// Trading calendar used to annualise per-bar statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AnnualizationSettings {
    pub trading_days_per_year: u32,
    pub trading_hours_per_day: u32,
}

impl Default for AnnualizationSettings {
    /// A futures-like instrument trading 23 hours a day, 252 days a year.
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            trading_hours_per_day: 23,
        }
    }
}

/// Contains the parameter sets for all available strategies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Strategies {
    #[serde(default)]
    pub sma_crossover: SmaCrossoverParams,
    #[serde(default)]
    pub buy_and_hold: BuyAndHoldParams,
}

/// Parameters for the simple moving average crossover strategy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SmaCrossoverParams {
    pub short_period: usize,
    pub long_period: usize,
}

impl Default for SmaCrossoverParams {
    fn default() -> Self {
        Self {
            short_period: 10,
            long_period: 30,
        }
    }
}

/// Parameters for the buy-and-hold benchmark strategy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuyAndHoldParams {
    /// Units bought on the first tradable bar.
    pub quantity: Decimal,
}

impl Default for BuyAndHoldParams {
    fn default() -> Self {
        Self { quantity: dec!(1) }
    }
}

impl Config {
    /// Checks the cross-field rules that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ledger.validate()?;

        if self.backtest.symbol.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "backtest.symbol must not be empty".to_string(),
            ));
        }
        if self.backtest.order_budget <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "backtest.order_budget must be greater than 0".to_string(),
            ));
        }
        if !self.backtest.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "backtest.risk_free_rate must be a finite number".to_string(),
            ));
        }
        if self.annualization.trading_days_per_year == 0
            || self.annualization.trading_hours_per_day == 0
        {
            return Err(ConfigError::ValidationError(
                "annualization days and hours must both be greater than 0".to_string(),
            ));
        }

        let sma = &self.strategies.sma_crossover;
        if sma.short_period == 0 || sma.short_period >= sma.long_period {
            return Err(ConfigError::ValidationError(format!(
                "sma_crossover periods must satisfy 0 < short ({}) < long ({})",
                sma.short_period, sma.long_period
            )));
        }
        if self.backtest.strategy == StrategyId::SmaCrossover
            && self.backtest.warmup_bars < sma.long_period
        {
            return Err(ConfigError::ValidationError(format!(
                "backtest.warmup_bars ({}) must cover sma_crossover.long_period ({})",
                self.backtest.warmup_bars, sma.long_period
            )));
        }
        if self.strategies.buy_and_hold.quantity <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "buy_and_hold.quantity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_cash <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "ledger.initial_cash must be greater than 0".to_string(),
            ));
        }
        if self.commission < Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "ledger.commission must not be negative".to_string(),
            ));
        }
        if self.leverage <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "ledger.leverage must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
