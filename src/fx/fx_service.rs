use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::currency::{decimal_places, validate_currency_code};
use super::fx_errors::FxError;
use super::fx_model::{ExchangeRate, NewExchangeRate, RateSeverity, ResolvedRate};
use super::fx_traits::{FxRepositoryTrait, FxServiceTrait};
use crate::constants::PIVOT_CURRENCY;
use crate::errors::Result;

/// Resolves historical exchange rates and converts amounts through the pivot
/// currency.
#[derive(Clone)]
pub struct FxService {
    repository: Arc<dyn FxRepositoryTrait>,
}

impl FxService {
    pub fn new(repository: Arc<dyn FxRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Rate of one pivot unit expressed in `currency_code`, resolved at the
    /// closest stored date at or before `date`.
    fn pivot_rate(&self, currency_code: &str, date: NaiveDate) -> Result<Decimal> {
        if currency_code == PIVOT_CURRENCY {
            return Ok(Decimal::ONE);
        }

        match self.repository.find_closest_rate(currency_code, date)? {
            Some(rate) => Ok(rate.rate),
            None => Err(FxError::RateNotFound(format!(
                "no rate stored for {} at or before {}",
                currency_code, date
            ))
            .into()),
        }
    }
}

impl FxServiceTrait for FxService {
    fn find_closest_rate(
        &self,
        currency_code: &str,
        target_date: NaiveDate,
    ) -> Result<Option<ResolvedRate>> {
        validate_currency_code(currency_code)?;

        if currency_code == PIVOT_CURRENCY {
            return Ok(Some(ResolvedRate {
                rate: Decimal::ONE,
                date: target_date,
                exact_match: true,
                days_difference: 0,
            }));
        }

        let resolved = self
            .repository
            .find_closest_rate(currency_code, target_date)?
            .map(|rate| ResolvedRate {
                exact_match: rate.date == target_date,
                days_difference: (target_date - rate.date).num_days(),
                rate: rate.rate,
                date: rate.date,
            });

        Ok(resolved)
    }

    /// Converts an amount between two currencies using the rates closest to
    /// `date`. Both legs resolve independently through the pivot currency.
    fn convert_for_date(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal> {
        if from_currency == to_currency {
            return Ok(amount);
        }

        validate_currency_code(from_currency)?;
        validate_currency_code(to_currency)?;

        let from_rate = self.pivot_rate(from_currency, date)?;
        let to_rate = self.pivot_rate(to_currency, date)?;

        if from_rate.is_zero() {
            return Err(FxError::ConversionError(format!(
                "zero rate stored for {} on {}",
                from_currency, date
            ))
            .into());
        }

        let converted = amount / from_rate * to_rate;
        Ok(converted.round_dp(decimal_places(to_currency)))
    }

    fn severity_for_date(&self, currency_code: &str, date: NaiveDate) -> Result<RateSeverity> {
        match self.find_closest_rate(currency_code, date)? {
            Some(resolved) => Ok(RateSeverity::from_days_difference(resolved.days_difference)),
            None => Ok(RateSeverity::Critical),
        }
    }

    fn add_manual_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate> {
        validate_currency_code(&new_rate.currency_code)?;

        let rate = ExchangeRate {
            date: new_rate.date,
            currency_code: new_rate.currency_code.clone(),
            rate: new_rate.rate,
        };
        self.repository.insert_rates(vec![new_rate])?;

        Ok(rate)
    }
}
