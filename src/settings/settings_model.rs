use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-owner preferences the core reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSettings {
    pub owner_id: String,
    pub base_currency: String,
}

/// Database model for owner settings
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::user_settings)]
#[diesel(primary_key(owner_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OwnerSettingsDB {
    pub owner_id: String,
    pub base_currency: String,
    pub updated_at: NaiveDateTime,
}

impl From<OwnerSettingsDB> for OwnerSettings {
    fn from(db: OwnerSettingsDB) -> Self {
        Self {
            owner_id: db.owner_id,
            base_currency: db.base_currency,
        }
    }
}
