use crate::error::StrategyError;
use core_types::{Bar, Direction, Order, PositionBook, Signal};
use rust_decimal::Decimal;

/// Net quantity currently held in `symbol`, zero when flat.
pub fn current_quantity(positions: &PositionBook, symbol: &str) -> Decimal {
    positions
        .get(symbol)
        .map_or(Decimal::ZERO, |position| position.quantity)
}

/// Sizes an order that moves the book to a full-budget target position.
///
/// The target is `floor(budget / bar.open)` whole units: long for a BUY
/// signal, short for a SELL. The order is for the difference between that
/// target and what is already held, priced at the bar's close. A HOLD signal
/// yields a zero-quantity order.
pub fn target_position_order(
    signal: &Signal,
    bar: &Bar,
    budget: Decimal,
    positions: &PositionBook,
) -> Result<Order, StrategyError> {
    if bar.open <= Decimal::ZERO {
        return Err(StrategyError::InvalidPrice(bar.open.to_string()));
    }

    let target_size = budget
        .checked_div(bar.open)
        .ok_or_else(|| StrategyError::InvalidPrice(bar.open.to_string()))?
        .floor();
    let current = current_quantity(positions, &bar.symbol);

    let quantity = match signal.direction {
        Direction::Buy => target_size - current,
        Direction::Sell => -target_size - current,
        Direction::Hold => Decimal::ZERO,
    };

    Ok(Order::market(signal.timestamp, signal.symbol.clone(), bar.close, quantity))
}
