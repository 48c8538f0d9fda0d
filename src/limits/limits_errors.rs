use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for net-worth limit checks
#[derive(Debug, Error)]
pub enum LimitsError {
    #[error(
        "Projected net worth exceeds the maximum supported balance; \
         the largest amount that can still be added is {max_allowed} {currency}"
    )]
    CeilingExceeded {
        currency: String,
        max_allowed: Decimal,
    },
}
