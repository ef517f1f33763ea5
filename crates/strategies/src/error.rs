use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("An error occurred during indicator calculation: {0}")]
    IndicatorError(String),

    #[error("Strategy needs at least {required} bars of history, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Cannot size an order against a non-positive price ({0})")]
    InvalidPrice(String),
}
