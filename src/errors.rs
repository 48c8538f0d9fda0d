use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::fx::FxError;
use crate::ledger::LedgerError;
use crate::limits::LimitsError;
use crate::rate_sync::SyncError;
use crate::wallets::WalletError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the finance tracker core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Transaction error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Currency operation failed: {0}")]
    Fx(#[from] FxError),

    #[error("Balance limit error: {0}")]
    Limits(#[from] LimitsError),

    #[error("Rate ingestion failed: {0}")]
    Sync(#[from] SyncError),
}

impl Error {
    /// HTTP status class the error maps to when shaped into a response.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Wallet(WalletError::NotFound(_)) => 404,
            Error::Wallet(WalletError::DatabaseError(_)) => 500,
            Error::Wallet(_) => 400,
            Error::Ledger(LedgerError::NotFound(_)) => 404,
            Error::Ledger(LedgerError::DatabaseError(_)) => 500,
            Error::Ledger(_) => 400,
            Error::Fx(FxError::DatabaseError(_)) => 500,
            Error::Fx(_) => 400,
            Error::Limits(_) => 400,
            Error::Sync(_) => 500,
            Error::Database(_) => 500,
        }
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(#[from] diesel::result::ConnectionError),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(#[from] r2d2::Error),

    #[error("Database query failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

// Implement From for DieselError to Error directly
impl From<DieselError> for Error {
    fn from(err: DieselError) -> Self {
        Error::Database(DatabaseError::QueryFailed(err))
    }
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Error::Database(DatabaseError::PoolCreationFailed(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}
