use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons an order is turned away. Both leave the ledger untouched and are
/// recoverable: the caller may simply carry on with the next order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Order quantity cannot be zero")]
    InvalidOrder,

    #[error("Insufficient funds for order. Required: {required}, Available: {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },
}
