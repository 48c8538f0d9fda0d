use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for currency and exchange-rate operations
#[derive(Debug, Error)]
pub enum FxError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Exchange rate not found: {0}")]
    RateNotFound(String),
    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),
    #[error("Currency conversion error: {0}")]
    ConversionError(String),
}

impl From<DieselError> for FxError {
    fn from(err: DieselError) -> Self {
        FxError::DatabaseError(err.to_string())
    }
}
