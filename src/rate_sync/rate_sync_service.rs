use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info, warn};
use tokio::task::JoinHandle;

use super::rate_sync_provider::RateProviderTrait;
use crate::errors::Result;
use crate::fx::{FxRepositoryTrait, NewExchangeRate};

/// Delay before each retry attempt: the first after 30 minutes, the rest
/// after an hour each.
pub const RETRY_DELAYS: [Duration; 6] = [
    Duration::from_secs(30 * 60),
    Duration::from_secs(60 * 60),
    Duration::from_secs(60 * 60),
    Duration::from_secs(60 * 60),
    Duration::from_secs(60 * 60),
    Duration::from_secs(60 * 60),
];

#[derive(Debug, Clone)]
pub struct RateSyncConfig {
    /// UTC hour of the daily fetch
    pub fetch_hour_utc: u32,
    pub retry_delays: Vec<Duration>,
}

impl Default for RateSyncConfig {
    fn default() -> Self {
        Self {
            fetch_hour_utc: 2,
            retry_delays: RETRY_DELAYS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching,
    Retrying,
    Exhausted,
}

/// How a daily cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Provider fetch succeeded; count of newly stored rates
    Fetched(usize),
    /// Fallback found today's rates already present
    AlreadyCurrent,
    /// Fallback copied the newest stored day forward; count of copied rows
    CopiedForward(usize),
    /// Nothing to copy from; operator attention required
    NoHistory,
}

/// Background scheduler that ingests daily exchange rates with retry and a
/// copy-forward fallback. Single-flight: one loop task, sequential attempts.
pub struct RateSyncService {
    repository: Arc<dyn FxRepositoryTrait>,
    provider: Arc<dyn RateProviderTrait>,
    config: RateSyncConfig,
    state: Mutex<SyncState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RateSyncService {
    pub fn new(
        repository: Arc<dyn FxRepositoryTrait>,
        provider: Arc<dyn RateProviderTrait>,
        config: RateSyncConfig,
    ) -> Self {
        Self {
            repository,
            provider,
            config,
            state: Mutex::new(SyncState::Idle),
            task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: SyncState) {
        *self.state.lock().unwrap() = state;
    }

    /// Spawns the daily loop. Calling start twice leaves the first schedule
    /// in place.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().unwrap();
        if task.is_some() {
            return;
        }

        let service = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            loop {
                let delay = next_run_delay(Utc::now(), service.config.fetch_hour_utc);
                tokio::time::sleep(delay).await;

                let today = Utc::now().date_naive();
                match service.run_cycle(today).await {
                    Ok(outcome) => info!("Daily rate sync finished: {:?}", outcome),
                    Err(e) => error!("Daily rate sync failed: {}", e),
                }
            }
        }));
    }

    /// Cancels the loop and any pending retry delay, leaving the schedule
    /// inert until started again.
    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
        self.set_state(SyncState::Idle);
    }

    /// One full ingestion cycle for `today`: an initial fetch, delayed
    /// retries, then the fallback once retries are exhausted. The attempt
    /// counter is local, so every cycle starts clean regardless of how the
    /// previous one ended.
    pub async fn run_cycle(&self, today: NaiveDate) -> Result<SyncOutcome> {
        let attempts = self.config.retry_delays.len() + 1;

        for attempt in 0..attempts {
            if attempt > 0 {
                self.set_state(SyncState::Retrying);
                tokio::time::sleep(self.config.retry_delays[attempt - 1]).await;
            }

            self.set_state(SyncState::Fetching);
            match self.fetch_and_store(today).await {
                Ok(stored) => {
                    info!("Stored {} exchange rates for {}", stored, today);
                    self.set_state(SyncState::Idle);
                    return Ok(SyncOutcome::Fetched(stored));
                }
                Err(e) => {
                    warn!(
                        "Rate fetch attempt {}/{} for {} failed: {}",
                        attempt + 1,
                        attempts,
                        today,
                        e
                    );
                }
            }
        }

        self.set_state(SyncState::Exhausted);
        let outcome = self.apply_fallback(today);
        self.set_state(SyncState::Idle);
        outcome
    }

    async fn fetch_and_store(&self, date: NaiveDate) -> Result<usize> {
        let rates = self.provider.fetch_daily_rates(date).await?;

        let rows: Vec<NewExchangeRate> = rates
            .into_iter()
            .map(|(currency_code, rate)| NewExchangeRate {
                date,
                currency_code,
                rate,
            })
            .collect();

        self.repository.insert_rates(rows)
    }

    /// Reuses the newest stored day when the provider is unreachable: already
    /// current means nothing to do, otherwise every rate of that day is
    /// copied to `today` without overwriting existing rows.
    pub fn apply_fallback(&self, today: NaiveDate) -> Result<SyncOutcome> {
        match self.repository.latest_rate_date()? {
            None => {
                error!(
                    "Rate ingestion for {} exhausted retries and no historical \
                     rates exist; manual rates are required",
                    today
                );
                Ok(SyncOutcome::NoHistory)
            }
            Some(latest) if latest == today => Ok(SyncOutcome::AlreadyCurrent),
            Some(latest) => {
                let rows: Vec<NewExchangeRate> = self
                    .repository
                    .rates_for_date(latest)?
                    .into_iter()
                    .map(|rate| NewExchangeRate {
                        date: today,
                        currency_code: rate.currency_code,
                        rate: rate.rate,
                    })
                    .collect();

                let copied = self.repository.insert_rates(rows)?;
                info!("Copied {} rates from {} to {}", copied, latest, today);
                Ok(SyncOutcome::CopiedForward(copied))
            }
        }
    }
}

/// Time until the next scheduled run at `fetch_hour_utc`.
pub fn next_run_delay(now: DateTime<Utc>, fetch_hour_utc: u32) -> Duration {
    let today_run = now
        .date_naive()
        .and_hms_opt(fetch_hour_utc, 0, 0)
        .unwrap_or_else(|| now.date_naive().and_hms_opt(0, 0, 0).unwrap())
        .and_utc();

    let next = if now < today_run {
        today_run
    } else {
        today_run + chrono::Duration::days(1)
    };

    (next - now).to_std().unwrap_or_default()
}
