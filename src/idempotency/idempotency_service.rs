use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;
use tokio::task::JoinHandle;

use super::idempotency_model::{CachedResponse, IdempotencyRecord};
use crate::errors::{Error, Result, ValidationError};

/// Minimum length of a client-supplied idempotency key
pub const MIN_KEY_LENGTH: usize = 10;

/// How long a cached response stays replayable
const RECORD_TTL_HOURS: i64 = 24;

/// Cadence of the background sweep
const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Process-wide cache that deduplicates mutating requests: for a fixed
/// owner+key, at most one underlying mutation commits and later retries
/// replay the first successful response.
pub struct IdempotencyCache {
    entries: DashMap<String, IdempotencyRecord>,
}

impl IdempotencyCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    fn composite_key(owner_id: &str, client_key: &str) -> String {
        format!("{}:{}", owner_id, client_key)
    }

    fn validate_key(client_key: &str) -> Result<()> {
        if client_key.len() < MIN_KEY_LENGTH {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Idempotency key must be at least {} characters long",
                MIN_KEY_LENGTH
            ))));
        }
        Ok(())
    }

    /// Non-expired cached response for this owner+key, if any.
    pub fn replay(&self, owner_id: &str, client_key: &str) -> Result<Option<CachedResponse>> {
        Self::validate_key(client_key)?;

        let key = Self::composite_key(owner_id, client_key);
        if let Some(record) = self.entries.get(&key) {
            let age = Utc::now() - record.stored_at;
            if age < chrono::Duration::hours(RECORD_TTL_HOURS) {
                return Ok(Some(record.response.clone()));
            }
        }
        // Expired entries fall through and are overwritten by the next store
        Ok(None)
    }

    /// Caches the response when it is the first successful one for this key.
    pub fn store(&self, owner_id: &str, client_key: &str, response: &CachedResponse) {
        if !response.is_success() {
            return;
        }

        let key = Self::composite_key(owner_id, client_key);
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                // Only an expired record may be replaced; the first success
                // within the TTL always wins
                let age = Utc::now() - occupied.get().stored_at;
                if age >= chrono::Duration::hours(RECORD_TTL_HOURS) {
                    occupied.insert(IdempotencyRecord {
                        response: response.clone(),
                        stored_at: Utc::now(),
                    });
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(IdempotencyRecord {
                    response: response.clone(),
                    stored_at: Utc::now(),
                });
            }
        }
    }

    /// Runs `op` unless a cached response exists, replaying it otherwise.
    pub async fn execute<F, Fut>(
        &self,
        owner_id: &str,
        client_key: &str,
        op: F,
    ) -> Result<CachedResponse>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CachedResponse>,
    {
        if let Some(cached) = self.replay(owner_id, client_key)? {
            debug!("Replaying cached response for key {}", client_key);
            return Ok(cached);
        }

        let response = op().await;
        self.store(owner_id, client_key, &response);
        Ok(response)
    }

    /// Drops entries older than the TTL; returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let cutoff = Utc::now() - chrono::Duration::hours(RECORD_TTL_HOURS);
        let before = self.entries.len();
        self.entries.retain(|_, record| record.stored_at > cutoff);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawns the hourly sweep. The returned handle owns the task; abort it
    /// on shutdown.
    pub fn spawn_sweeper(cache: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            // The first tick fires immediately; skip it
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = cache.sweep_expired();
                if removed > 0 {
                    debug!("Swept {} expired idempotency records", removed);
                }
            }
        })
    }
}

impl Default for IdempotencyCache {
    fn default() -> Self {
        Self::new()
    }
}
