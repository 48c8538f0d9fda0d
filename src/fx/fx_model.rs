use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::RATE_DECIMAL_PRECISION;

/// One stored daily exchange rate: `rate` units of `currency_code`
/// equal one unit of the pivot currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub date: NaiveDate,
    pub currency_code: String,
    pub rate: Decimal,
}

/// Input model for storing a new daily rate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExchangeRate {
    pub date: NaiveDate,
    pub currency_code: String,
    pub rate: Decimal,
}

/// Database model for exchange rates
#[derive(Queryable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::exchange_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRateDB {
    pub date: NaiveDate,
    pub currency_code: String,
    pub rate: String,
    pub created_at: NaiveDateTime,
}

impl From<ExchangeRateDB> for ExchangeRate {
    fn from(db: ExchangeRateDB) -> Self {
        Self {
            date: db.date,
            currency_code: db.currency_code,
            rate: Decimal::from_str(&db.rate).unwrap_or_default(),
        }
    }
}

impl From<NewExchangeRate> for ExchangeRateDB {
    fn from(domain: NewExchangeRate) -> Self {
        Self {
            date: domain.date,
            currency_code: domain.currency_code,
            rate: domain.rate.round_dp(RATE_DECIMAL_PRECISION).to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Result of a closest-rate lookup against the rate store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRate {
    pub rate: Decimal,
    pub date: NaiveDate,
    pub exact_match: bool,
    pub days_difference: i64,
}

/// How stale a resolved rate is relative to the requested date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSeverity {
    None,
    Info,
    Recent,
    Outdated,
    Old,
    /// No rate exists at all; the caller must obtain a manual rate.
    Critical,
}

impl RateSeverity {
    pub fn from_days_difference(days: i64) -> Self {
        match days {
            0 => RateSeverity::None,
            1..=3 => RateSeverity::Info,
            4..=14 => RateSeverity::Recent,
            15..=30 => RateSeverity::Outdated,
            _ => RateSeverity::Old,
        }
    }
}
