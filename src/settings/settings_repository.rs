use std::sync::Arc;

use diesel::prelude::*;

use super::settings_model::OwnerSettingsDB;
use crate::constants::PIVOT_CURRENCY;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::fx::currency::validate_currency_code;
use crate::schema::user_settings;

/// Trait defining the contract for per-owner settings access.
pub trait SettingsRepositoryTrait: Send + Sync {
    /// The owner's base currency, falling back to the pivot currency when the
    /// owner has never chosen one.
    fn get_base_currency(&self, owner_id: &str) -> Result<String>;
    fn set_base_currency(&self, owner_id: &str, base_currency: &str) -> Result<()>;
}

pub struct SettingsRepository {
    pool: Arc<DbPool>,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl SettingsRepositoryTrait for SettingsRepository {
    fn get_base_currency(&self, owner_id: &str) -> Result<String> {
        let mut conn = get_connection(&self.pool)?;

        let row = user_settings::table
            .find(owner_id)
            .select(OwnerSettingsDB::as_select())
            .first::<OwnerSettingsDB>(&mut conn)
            .optional()?;

        Ok(row
            .map(|s| s.base_currency)
            .unwrap_or_else(|| PIVOT_CURRENCY.to_string()))
    }

    fn set_base_currency(&self, owner_id: &str, base_currency: &str) -> Result<()> {
        validate_currency_code(base_currency)?;

        let mut conn = get_connection(&self.pool)?;
        let now = chrono::Utc::now().naive_utc();

        diesel::insert_into(user_settings::table)
            .values(OwnerSettingsDB {
                owner_id: owner_id.to_string(),
                base_currency: base_currency.to_string(),
                updated_at: now,
            })
            .on_conflict(user_settings::owner_id)
            .do_update()
            .set((
                user_settings::base_currency.eq(base_currency),
                user_settings::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
