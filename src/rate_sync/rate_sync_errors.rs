use thiserror::Error;

/// Custom error type for rate ingestion
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Rate provider request failed: {0}")]
    Provider(String),
    #[error("No historical rates available to fall back on")]
    NoHistory,
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Provider(err.to_string())
    }
}
