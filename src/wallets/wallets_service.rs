use std::sync::Arc;

use diesel::Connection;
use log::debug;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::wallets_model::{NewWallet, Wallet, WalletDB, WalletUpdate};
use super::wallets_repository::WalletRepository;
use super::wallets_traits::WalletRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::{Error, Result};
use crate::limits::NetWorthGuardTrait;

/// Service for managing wallets. Starting-balance edits shift the current
/// balance by the same delta inside one atomic unit so the balance invariant
/// holds across the change.
pub struct WalletService {
    pool: Arc<DbPool>,
    wallet_repository: Arc<WalletRepository>,
    net_worth_guard: Arc<dyn NetWorthGuardTrait>,
}

impl WalletService {
    pub fn new(
        pool: Arc<DbPool>,
        wallet_repository: Arc<WalletRepository>,
        net_worth_guard: Arc<dyn NetWorthGuardTrait>,
    ) -> Self {
        Self {
            pool,
            wallet_repository,
            net_worth_guard,
        }
    }

    pub fn get_wallet(&self, owner_id: &str, wallet_id: &str) -> Result<Wallet> {
        self.wallet_repository.get_wallet(owner_id, wallet_id)
    }

    pub fn list_wallets(&self, owner_id: &str) -> Result<Vec<Wallet>> {
        self.wallet_repository.list_wallets(owner_id)
    }

    pub async fn create_wallet(&self, owner_id: &str, new_wallet: NewWallet) -> Result<Wallet> {
        new_wallet.validate()?;

        if new_wallet.starting_balance > Decimal::ZERO {
            self.net_worth_guard.check_projected_net_worth(
                owner_id,
                new_wallet.starting_balance,
                &new_wallet.currency,
            )?;
        }

        let now = chrono::Utc::now().naive_utc();
        let starting = new_wallet.starting_balance.to_string();
        let wallet_db = WalletDB {
            id: new_wallet
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            owner_id: owner_id.to_string(),
            name: new_wallet.name,
            wallet_type: new_wallet.wallet_type.as_str().to_string(),
            currency: new_wallet.currency,
            starting_balance: starting.clone(),
            current_balance: starting,
            include_in_balance: new_wallet.include_in_balance,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut conn = get_connection(&self.pool)?;
        let wallet = conn.transaction::<Wallet, Error, _>(|conn| {
            Ok(WalletRepository::insert_wallet_tx(conn, &wallet_db)?)
        })?;

        debug!("Created wallet {} for owner {}", wallet.id, owner_id);
        Ok(wallet)
    }

    pub async fn update_wallet(
        &self,
        owner_id: &str,
        wallet_id: &str,
        update: WalletUpdate,
    ) -> Result<Wallet> {
        update.validate()?;

        // A starting-balance increase raises projected net worth; check it
        // against committed state before opening the unit.
        if let Some(new_starting) = update.starting_balance {
            let existing = self.wallet_repository.get_wallet(owner_id, wallet_id)?;
            let delta = new_starting - existing.starting_balance;
            if delta > Decimal::ZERO {
                self.net_worth_guard.check_projected_net_worth(
                    owner_id,
                    delta,
                    &existing.currency,
                )?;
            }
        }

        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<Wallet, Error, _>(|conn| {
            let mut wallet = WalletRepository::get_wallet_tx(conn, owner_id, wallet_id)?;

            if let Some(name) = update.name {
                wallet.name = name;
            }
            if let Some(include) = update.include_in_balance {
                wallet.include_in_balance = include;
            }
            if let Some(active) = update.is_active {
                wallet.is_active = active;
            }
            if let Some(new_starting) = update.starting_balance {
                let delta = new_starting - wallet.starting_balance_decimal();
                wallet.starting_balance = new_starting.to_string();
                wallet.current_balance = (wallet.current_balance_decimal() + delta).to_string();
            }
            wallet.updated_at = chrono::Utc::now().naive_utc();

            Ok(WalletRepository::update_wallet_tx(conn, &wallet)?)
        })
    }

    pub async fn deactivate_wallet(&self, owner_id: &str, wallet_id: &str) -> Result<Wallet> {
        self.update_wallet(
            owner_id,
            wallet_id,
            WalletUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }
}
