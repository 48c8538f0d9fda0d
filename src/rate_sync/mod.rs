pub mod rate_sync_errors;
pub mod rate_sync_provider;
pub mod rate_sync_service;

pub use rate_sync_errors::SyncError;
pub use rate_sync_provider::{HttpRateProvider, RateProviderTrait};
pub use rate_sync_service::{
    next_run_delay, RateSyncConfig, RateSyncService, SyncOutcome, SyncState, RETRY_DELAYS,
};
