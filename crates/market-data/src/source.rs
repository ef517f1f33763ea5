use crate::error::DataError;
use core_types::Bar;

/// A lazy, restartable, finite sequence of price bars.
///
/// Callers must check [`has_more`](MarketDataSource::has_more) before asking
/// for the next bar; reading past the end is an error rather than `None` so
/// that a loop bug cannot silently truncate a backtest.
pub trait MarketDataSource {
    fn has_more(&self) -> bool;

    /// Returns the next bar and advances the cursor.
    fn next_bar(&mut self) -> Result<Bar, DataError>;

    /// Rewinds to the first bar.
    fn reset(&mut self);

    /// Total number of bars, consumed or not.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bar most recently returned by `next_bar`, if any.
    fn current(&self) -> Option<&Bar>;
}

/// An in-memory bar source.
#[derive(Debug, Clone, Default)]
pub struct BarSeries {
    bars: Vec<Bar>,
    index: usize,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars, index: 0 }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Number of bars already handed out.
    pub fn position(&self) -> usize {
        self.index
    }
}

impl From<Vec<Bar>> for BarSeries {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}

impl MarketDataSource for BarSeries {
    fn has_more(&self) -> bool {
        self.index < self.bars.len()
    }

    fn next_bar(&mut self) -> Result<Bar, DataError> {
        let bar = self.bars.get(self.index).cloned().ok_or(DataError::DataExhausted)?;
        self.index += 1;
        Ok(bar)
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn len(&self) -> usize {
        self.bars.len()
    }

    fn current(&self) -> Option<&Bar> {
        self.index.checked_sub(1).and_then(|i| self.bars.get(i))
    }
}
