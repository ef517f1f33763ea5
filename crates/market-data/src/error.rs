use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("No more bars available; check `has_more()` before requesting the next bar")]
    DataExhausted,

    #[error("Failed to read market data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse line {line}: {message}")]
    Parse { line: u64, message: String },
}
