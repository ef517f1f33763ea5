use crate::buy_and_hold::BuyAndHold;
use crate::error::StrategyError;
use crate::sma_crossover::SmaCrossover;
use crate::Strategy;
use configuration::Strategies;
use core_types::StrategyId;

/// Creates a new strategy instance based on the provided ID and parameter sets.
pub fn create_strategy(
    id: StrategyId,
    params: &Strategies,
) -> Result<Box<dyn Strategy>, StrategyError> {
    // The compiler will error if a new StrategyId is added but not handled here.
    match id {
        StrategyId::SmaCrossover => Ok(Box::new(SmaCrossover::new(params.sma_crossover.clone())?)),
        StrategyId::BuyAndHold => Ok(Box::new(BuyAndHold::new(params.buy_and_hold.clone())?)),
    }
}
