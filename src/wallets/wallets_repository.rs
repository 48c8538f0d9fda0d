use std::sync::Arc;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use super::wallets_errors::WalletError;
use super::wallets_model::{Wallet, WalletDB};
use super::wallets_traits::WalletRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::wallets;

/// Repository for wallet rows. Mutating helpers take an explicit connection so
/// the engine can compose them into one atomic unit.
pub struct WalletRepository {
    pool: Arc<DbPool>,
}

impl WalletRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Loads a wallet owned by `owner_id` inside an open unit of work.
    pub fn get_wallet_tx(
        conn: &mut SqliteConnection,
        owner_id: &str,
        wallet_id: &str,
    ) -> std::result::Result<WalletDB, WalletError> {
        wallets::table
            .find(wallet_id)
            .filter(wallets::owner_id.eq(owner_id))
            .select(WalletDB::as_select())
            .first::<WalletDB>(conn)
            .optional()?
            .ok_or_else(|| WalletError::NotFound(format!("Wallet {} not found", wallet_id)))
    }

    pub fn insert_wallet_tx(
        conn: &mut SqliteConnection,
        wallet: &WalletDB,
    ) -> std::result::Result<Wallet, WalletError> {
        diesel::insert_into(wallets::table)
            .values(wallet)
            .get_result::<WalletDB>(conn)
            .map(Wallet::from)
            .map_err(WalletError::from)
    }

    pub fn update_wallet_tx(
        conn: &mut SqliteConnection,
        wallet: &WalletDB,
    ) -> std::result::Result<Wallet, WalletError> {
        diesel::update(wallets::table.find(&wallet.id))
            .set(wallet)
            .get_result::<WalletDB>(conn)
            .map(Wallet::from)
            .map_err(WalletError::from)
    }

    /// Shifts a wallet's current balance by `delta`, reading the latest value
    /// committed within the open unit.
    pub fn adjust_balance_tx(
        conn: &mut SqliteConnection,
        wallet_id: &str,
        delta: Decimal,
    ) -> std::result::Result<(), WalletError> {
        let balance_text = wallets::table
            .find(wallet_id)
            .select(wallets::current_balance)
            .first::<String>(conn)?;

        let balance: Decimal = balance_text.parse().unwrap_or_default();
        let updated = balance + delta;

        diesel::update(wallets::table.find(wallet_id))
            .set((
                wallets::current_balance.eq(updated.to_string()),
                wallets::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        Ok(())
    }
}

impl WalletRepositoryTrait for WalletRepository {
    fn get_wallet(&self, owner_id: &str, wallet_id: &str) -> Result<Wallet> {
        let mut conn = get_connection(&self.pool)?;
        let wallet = Self::get_wallet_tx(&mut conn, owner_id, wallet_id)?;
        Ok(Wallet::from(wallet))
    }

    fn list_wallets(&self, owner_id: &str) -> Result<Vec<Wallet>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = wallets::table
            .filter(wallets::owner_id.eq(owner_id))
            .order(wallets::created_at.asc())
            .select(WalletDB::as_select())
            .load::<WalletDB>(&mut conn)
            .map_err(WalletError::from)?;

        Ok(rows.into_iter().map(Wallet::from).collect())
    }
}
