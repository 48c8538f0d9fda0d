use std::sync::Arc;

use chrono::NaiveDate;
use diesel::prelude::*;

use super::fx_errors::FxError;
use super::fx_model::{ExchangeRate, ExchangeRateDB, NewExchangeRate};
use super::fx_traits::FxRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::exchange_rates;

/// Repository for the daily exchange-rate table
pub struct FxRepository {
    pool: Arc<DbPool>,
}

impl FxRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl FxRepositoryTrait for FxRepository {
    fn find_closest_rate(
        &self,
        currency_code: &str,
        target_date: NaiveDate,
    ) -> Result<Option<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;

        let row = exchange_rates::table
            .filter(exchange_rates::currency_code.eq(currency_code))
            .filter(exchange_rates::date.le(target_date))
            .order(exchange_rates::date.desc())
            .select(ExchangeRateDB::as_select())
            .first::<ExchangeRateDB>(&mut conn)
            .optional()
            .map_err(FxError::from)?;

        Ok(row.map(ExchangeRate::from))
    }

    fn rates_for_date(&self, date: NaiveDate) -> Result<Vec<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = exchange_rates::table
            .filter(exchange_rates::date.eq(date))
            .order(exchange_rates::currency_code.asc())
            .select(ExchangeRateDB::as_select())
            .load::<ExchangeRateDB>(&mut conn)
            .map_err(FxError::from)?;

        Ok(rows.into_iter().map(ExchangeRate::from).collect())
    }

    fn latest_rate_date(&self) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;

        let date = exchange_rates::table
            .select(diesel::dsl::max(exchange_rates::date))
            .first::<Option<NaiveDate>>(&mut conn)
            .map_err(FxError::from)?;

        Ok(date)
    }

    fn insert_rates(&self, rates: Vec<NewExchangeRate>) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let rows: Vec<ExchangeRateDB> = rates.into_iter().map(ExchangeRateDB::from).collect();

        // Stored rates are immutable, so conflicting rows are skipped rather
        // than overwritten.
        let inserted = diesel::insert_or_ignore_into(exchange_rates::table)
            .values(&rows)
            .execute(&mut conn)
            .map_err(FxError::from)?;

        Ok(inserted)
    }
}
