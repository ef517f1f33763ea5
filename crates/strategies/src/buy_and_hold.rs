use crate::error::StrategyError;
use crate::sizing::current_quantity;
use crate::Strategy;
use configuration::BuyAndHoldParams;
use core_types::{Bar, Direction, Order, PositionBook, Signal};
use rust_decimal::Decimal;

/// Buys a fixed quantity on the first tradable bar and never sells.
///
/// Useful as a benchmark: the backtester's forced liquidation realises the
/// single trade at the end of the data.
pub struct BuyAndHold {
    quantity: Decimal,
    has_bought: bool,
}

impl BuyAndHold {
    pub fn new(params: BuyAndHoldParams) -> Result<Self, StrategyError> {
        if params.quantity <= Decimal::ZERO {
            return Err(StrategyError::InvalidParameters(
                "buy_and_hold quantity must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            quantity: params.quantity,
            has_bought: false,
        })
    }
}

impl Strategy for BuyAndHold {
    fn name(&self) -> &'static str {
        "buy_and_hold"
    }

    fn initialize(&mut self, _history: &[Bar]) -> Result<(), StrategyError> {
        self.has_bought = false;
        Ok(())
    }

    fn on_bar(&mut self, bar: &Bar, positions: &PositionBook) -> Result<Option<Signal>, StrategyError> {
        if self.has_bought || positions.contains_key(&bar.symbol) {
            return Ok(None);
        }
        self.has_bought = true;
        Ok(Some(Signal {
            timestamp: bar.timestamp,
            symbol: bar.symbol.clone(),
            direction: Direction::Buy,
        }))
    }

    /// The budget is ignored; the order tops the position up to the configured quantity.
    fn generate_order(
        &self,
        signal: &Signal,
        bar: &Bar,
        _budget: Decimal,
        positions: &PositionBook,
    ) -> Result<Order, StrategyError> {
        let quantity = match signal.direction {
            Direction::Buy => self.quantity - current_quantity(positions, &signal.symbol),
            Direction::Sell | Direction::Hold => Decimal::ZERO,
        };
        Ok(Order::market(signal.timestamp, signal.symbol.clone(), bar.close, quantity))
    }
}
