use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::rate_sync_errors::SyncError;
use crate::constants::PIVOT_CURRENCY;
use crate::errors::Result;

/// Trait defining the contract for the external daily-rate provider.
#[async_trait]
pub trait RateProviderTrait: Send + Sync {
    /// Pivot-relative rates for one calendar day. A day the provider has no
    /// data for is a fetch failure, not an empty success.
    async fn fetch_daily_rates(&self, date: NaiveDate) -> Result<HashMap<String, Decimal>>;
}

#[derive(Debug, Deserialize)]
struct RatesDocument {
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

/// HTTP rate provider hitting a `GET {base_url}/{date}?base={pivot}` endpoint
/// that answers `{"rates": {"EUR": 0.92, ...}}`.
pub struct HttpRateProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateProvider {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SyncError::from)?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl RateProviderTrait for HttpRateProvider {
    async fn fetch_daily_rates(&self, date: NaiveDate) -> Result<HashMap<String, Decimal>> {
        let url = format!(
            "{}/{}?base={}",
            self.base_url.trim_end_matches('/'),
            date.format("%Y-%m-%d"),
            PIVOT_CURRENCY
        );

        let response = self.client.get(&url).send().await.map_err(SyncError::from)?;

        if !response.status().is_success() {
            return Err(SyncError::Provider(format!(
                "provider answered {} for {}",
                response.status(),
                date
            ))
            .into());
        }

        let document: RatesDocument = response.json().await.map_err(SyncError::from)?;

        if document.rates.is_empty() {
            return Err(SyncError::Provider(format!("provider has no rates mapped for {}", date)).into());
        }

        Ok(document.rates)
    }
}
