pub mod idempotency_model;
pub mod idempotency_service;

pub use idempotency_model::{CachedResponse, IdempotencyRecord};
pub use idempotency_service::{IdempotencyCache, MIN_KEY_LENGTH};
