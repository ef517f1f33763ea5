use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Equity curve too short: {required} points required, got {actual}")]
    CurveTooShort { required: usize, actual: usize },

    #[error("Unknown sampling frequency: '{0}'")]
    UnknownFrequency(String),

    #[error("Equity must stay positive to compute returns")]
    NonPositiveEquity,
}
