use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::fx_model::{ExchangeRate, NewExchangeRate, RateSeverity, ResolvedRate};
use crate::errors::Result;

/// Trait defining the contract for exchange-rate store access.
pub trait FxRepositoryTrait: Send + Sync {
    /// Most recent stored rate with `date <= target_date`, never a future row.
    fn find_closest_rate(
        &self,
        currency_code: &str,
        target_date: NaiveDate,
    ) -> Result<Option<ExchangeRate>>;
    fn rates_for_date(&self, date: NaiveDate) -> Result<Vec<ExchangeRate>>;
    fn latest_rate_date(&self) -> Result<Option<NaiveDate>>;
    /// Inserts rates without overwriting existing `(date, currency)` rows;
    /// returns the number of rows actually inserted.
    fn insert_rates(&self, rates: Vec<NewExchangeRate>) -> Result<usize>;
}

/// Trait defining the contract for currency resolution operations.
pub trait FxServiceTrait: Send + Sync {
    fn find_closest_rate(
        &self,
        currency_code: &str,
        target_date: NaiveDate,
    ) -> Result<Option<ResolvedRate>>;
    fn convert_for_date(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal>;
    fn severity_for_date(&self, currency_code: &str, date: NaiveDate) -> Result<RateSeverity>;
    fn add_manual_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate>;
}
