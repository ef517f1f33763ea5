use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Strategy execution error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Market data error: {0}")]
    Data(#[from] market_data::DataError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),

    #[error("The market data source holds no bars.")]
    DataUnavailable,

    #[error("This backtester has already run; build a new one for another run.")]
    AlreadyCompleted,
}

impl From<indicatif::style::TemplateError> for BacktestError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        BacktestError::ProgressBarTemplate(error.to_string())
    }
}
