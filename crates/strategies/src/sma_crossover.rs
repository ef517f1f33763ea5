use crate::error::StrategyError;
use crate::sizing::target_position_order;
use crate::Strategy;
use configuration::SmaCrossoverParams;
use core_types::{Bar, Direction, Order, PositionBook, Signal};
use rust_decimal::prelude::*;
use ta::indicators::SimpleMovingAverage as Sma;
use ta::Next;

/// Moving averages of the previous and the current bar.
#[derive(Debug, Clone, Copy)]
struct Averages {
    short: f64,
    long: f64,
}

impl Averages {
    fn short_above(&self) -> bool {
        self.short > self.long
    }
}

/// The dual simple moving average crossover strategy.
pub struct SmaCrossover {
    params: SmaCrossoverParams,
    short_ma: Sma,
    long_ma: Sma,
    // State: the averages after the last processed bar, `None` until initialized.
    last: Option<Averages>,
}

impl SmaCrossover {
    /// Creates a new `SmaCrossover` instance with the given parameters.
    ///
    /// It performs validation to ensure the parameters are logical.
    pub fn new(params: SmaCrossoverParams) -> Result<Self, StrategyError> {
        // Validation: Ensure periods are logical.
        if params.short_period >= params.long_period {
            return Err(StrategyError::InvalidParameters(
                "Short MA period must be less than Long MA period".to_string(),
            ));
        }

        let (short_ma, long_ma) = Self::indicators(&params)?;
        Ok(Self {
            params,
            short_ma,
            long_ma,
            last: None,
        })
    }

    fn indicators(params: &SmaCrossoverParams) -> Result<(Sma, Sma), StrategyError> {
        let short = Sma::new(params.short_period)
            .map_err(|e| StrategyError::InvalidParameters(e.to_string()))?;
        let long = Sma::new(params.long_period)
            .map_err(|e| StrategyError::InvalidParameters(e.to_string()))?;
        Ok((short, long))
    }

    fn update(&mut self, close: Decimal) -> Result<Averages, StrategyError> {
        // The `ta` crate uses `f64`. We must convert from our high-precision `Decimal`.
        let close = close
            .to_f64()
            .ok_or_else(|| StrategyError::IndicatorError(format!("close {close} is not representable as f64")))?;

        Ok(Averages {
            short: self.short_ma.next(close),
            long: self.long_ma.next(close),
        })
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &'static str {
        "sma_crossover"
    }

    /// Seeds both averages from the tail of `history`.
    ///
    /// At least `long_period` bars are required so that the long average is
    /// computed over a full window before the first live bar.
    fn initialize(&mut self, history: &[Bar]) -> Result<(), StrategyError> {
        if history.len() < self.params.long_period {
            return Err(StrategyError::InsufficientHistory {
                required: self.params.long_period,
                available: history.len(),
            });
        }

        let (short_ma, long_ma) = Self::indicators(&self.params)?;
        self.short_ma = short_ma;
        self.long_ma = long_ma;

        let window = &history[history.len() - self.params.long_period..];
        let mut last = None;
        for bar in window {
            last = Some(self.update(bar.close)?);
        }
        self.last = last;

        tracing::debug!(
            bars = history.len(),
            short = ?self.last.map(|a| a.short),
            long = ?self.last.map(|a| a.long),
            "SmaCrossover: initialized"
        );
        Ok(())
    }

    /// A buy signal is generated when the short MA crosses above the long MA,
    /// a sell signal when it crosses back to or below it.
    fn on_bar(&mut self, bar: &Bar, _positions: &PositionBook) -> Result<Option<Signal>, StrategyError> {
        let Some(previous) = self.last else {
            // Not initialized yet; nothing to compare against.
            return Ok(None);
        };

        let current = self.update(bar.close)?;
        self.last = Some(current);

        tracing::debug!(
            "SmaCrossover: MAs - Short: {:.4}, Long: {:.4} (prev {:.4}/{:.4})",
            current.short,
            current.long,
            previous.short,
            previous.long
        );

        let direction = match (previous.short_above(), current.short_above()) {
            (false, true) => Direction::Buy,
            (true, false) => Direction::Sell,
            _ => return Ok(None),
        };

        tracing::debug!("SmaCrossover: Generating {} signal", direction);
        Ok(Some(Signal {
            timestamp: bar.timestamp,
            symbol: bar.symbol.clone(),
            direction,
        }))
    }

    fn generate_order(
        &self,
        signal: &Signal,
        bar: &Bar,
        budget: Decimal,
        positions: &PositionBook,
    ) -> Result<Order, StrategyError> {
        target_position_order(signal, bar, budget, positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bars(closes: &[i64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let close = Decimal::from(*close);
                Bar {
                    symbol: "NQ".to_string(),
                    timestamp: start + Duration::hours(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: dec!(10),
                }
            })
            .collect()
    }

    fn strategy() -> SmaCrossover {
        SmaCrossover::new(SmaCrossoverParams {
            short_period: 2,
            long_period: 4,
        })
        .unwrap()
    }

    #[test]
    fn rejects_inverted_periods() {
        let result = SmaCrossover::new(SmaCrossoverParams {
            short_period: 5,
            long_period: 5,
        });
        assert!(matches!(result, Err(StrategyError::InvalidParameters(_))));
    }

    #[test]
    fn needs_a_full_long_window_of_history() {
        let mut strategy = strategy();
        let err = strategy.initialize(&bars(&[1, 2, 3])).unwrap_err();
        assert!(matches!(
            err,
            StrategyError::InsufficientHistory { required: 4, available: 3 }
        ));
    }

    #[test]
    fn silent_before_initialize() {
        let mut strategy = strategy();
        let bar = &bars(&[100])[0];
        assert!(strategy.on_bar(bar, &PositionBook::new()).unwrap().is_none());
    }

    #[test]
    fn signals_on_crosses_only() {
        let mut strategy = strategy();
        // Falling history: short MA sits below the long MA.
        strategy.initialize(&bars(&[110, 108, 106, 104])).unwrap();
        let book = PositionBook::new();

        // short (104+120)/2 = 112 > long (108+106+104+120)/4 = 109.5 -> cross up.
        let live = bars(&[120, 121, 90, 89]);
        let first = strategy.on_bar(&live[0], &book).unwrap();
        assert_eq!(first.map(|s| s.direction), Some(Direction::Buy));

        // Still above: no new signal.
        assert!(strategy.on_bar(&live[1], &book).unwrap().is_none());

        // short (121+90)/2 = 105.5 < long (104+120+121+90)/4 = 108.75 -> cross down.
        let third = strategy.on_bar(&live[2], &book).unwrap().expect("sell signal");
        assert_eq!(third.direction, Direction::Sell);
        assert_eq!(third.timestamp, live[2].timestamp);
        assert_eq!(third.symbol, "NQ");
    }

    #[test]
    fn generated_order_uses_budget_and_close() {
        let strategy = strategy();
        let bar = &bars(&[200])[0];
        let signal = Signal {
            timestamp: bar.timestamp,
            symbol: "NQ".to_string(),
            direction: Direction::Buy,
        };

        let order = strategy
            .generate_order(&signal, bar, dec!(1000), &PositionBook::new())
            .unwrap();
        assert_eq!(order.quantity, dec!(5));
        assert_eq!(order.price, dec!(200));
    }
}
