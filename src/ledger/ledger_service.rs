use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use log::{debug, error};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::ledger_errors::LedgerError;
use super::ledger_model::{
    SystemTransactionType, Transaction, TransactionDB, TransactionInput, TransactionPayload,
    TransactionStatus, TransactionType,
};
use super::ledger_repository as repository;
use super::ledger_traits::LedgerServiceTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::{Error, Result, ValidationError};
use crate::fx::{FxError, FxServiceTrait};
use crate::limits::NetWorthGuardTrait;
use crate::settings::SettingsRepositoryTrait;
use crate::wallets::{WalletDB, WalletRepository, WalletType};

/// The transactional core: creates, updates and deletes ledger rows together
/// with the wallet balances they affect, all inside one unit of work per call.
pub struct LedgerService {
    pool: Arc<DbPool>,
    fx_service: Arc<dyn FxServiceTrait>,
    net_worth_guard: Arc<dyn NetWorthGuardTrait>,
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

impl LedgerService {
    pub fn new(
        pool: Arc<DbPool>,
        fx_service: Arc<dyn FxServiceTrait>,
        net_worth_guard: Arc<dyn NetWorthGuardTrait>,
        settings_repository: Arc<dyn SettingsRepositoryTrait>,
    ) -> Self {
        Self {
            pool,
            fx_service,
            net_worth_guard,
            settings_repository,
        }
    }

    /// Signed amount converted into the owner's base currency at the
    /// transaction date. `None` when no rate exists at or before the date.
    fn convert_to_base(
        &self,
        amount: Decimal,
        currency: &str,
        base_currency: &str,
        date: NaiveDate,
    ) -> Result<Option<Decimal>> {
        if currency == base_currency {
            return Ok(Some(amount));
        }
        match self
            .fx_service
            .convert_for_date(amount, currency, base_currency, date)
        {
            Ok(converted) => Ok(Some(converted)),
            Err(Error::Fx(FxError::RateNotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Best-effort conversion used to express the net effect of a mutation in
    /// the owner's base currency for the ceiling check.
    fn convert_or_raw(&self, amount: Decimal, from: &str, to: &str) -> Decimal {
        let today = Utc::now().date_naive();
        self.fx_service
            .convert_for_date(amount, from, to, today)
            .unwrap_or_else(|e| {
                error!("Currency conversion error: {:?}", e);
                amount
            })
    }

    fn signed_entry_amount(input: &TransactionInput) -> Result<Decimal> {
        match input.transaction_type {
            TransactionType::Income => Ok(input.amount),
            TransactionType::Expense => Ok(-input.amount),
            TransactionType::Transfer => Err(LedgerError::InvalidData(
                "Unexpected transaction type".to_string(),
            )
            .into()),
        }
    }

    /// Cash wallets must never go below zero.
    fn check_cash_overdraft(wallet: &WalletDB, delta: Decimal) -> Result<()> {
        if wallet.wallet_type_enum() == WalletType::Cash {
            let balance = wallet.current_balance_decimal();
            if balance + delta < Decimal::ZERO {
                return Err(LedgerError::Overdraft {
                    wallet: wallet.name.clone(),
                    balance,
                    required: delta.abs(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Applies the overdraft rule to every wallet a set of balance deltas
    /// would reduce.
    fn check_overdrafts(
        &self,
        conn: &mut SqliteConnection,
        owner_id: &str,
        deltas: &HashMap<String, Decimal>,
    ) -> Result<()> {
        for (wallet_id, delta) in deltas {
            if *delta < Decimal::ZERO {
                let wallet = WalletRepository::get_wallet_tx(conn, owner_id, wallet_id)?;
                Self::check_cash_overdraft(&wallet, *delta)?;
            }
        }
        Ok(())
    }

    fn validate_entry_category(
        &self,
        conn: &mut SqliteConnection,
        input: &TransactionInput,
    ) -> Result<()> {
        let category_id = input
            .category_id
            .as_deref()
            .ok_or_else(|| ValidationError::MissingField("category".to_string()))?;

        let category = repository::get_category(conn, category_id)?
            .ok_or_else(|| LedgerError::NotFound(format!("Category {} not found", category_id)))?;

        if category.category_type != input.transaction_type.as_str() {
            return Err(LedgerError::InvalidData(
                "Category type does not match the transaction type".to_string(),
            )
            .into());
        }
        Ok(())
    }

    fn create_entry(
        &self,
        conn: &mut SqliteConnection,
        owner_id: &str,
        input: &TransactionInput,
        base_currency: &str,
    ) -> Result<TransactionPayload> {
        let wallet_id = input
            .wallet_id
            .as_deref()
            .ok_or_else(|| ValidationError::MissingField("walletId".to_string()))?;
        let wallet = WalletRepository::get_wallet_tx(conn, owner_id, wallet_id)?;

        self.validate_entry_category(conn, input)?;
        let signed_amount = Self::signed_entry_amount(input)?;

        Self::check_cash_overdraft(&wallet, signed_amount)?;
        if signed_amount > Decimal::ZERO {
            self.net_worth_guard.check_projected_net_worth(
                owner_id,
                signed_amount,
                &wallet.currency,
            )?;
        }

        let base_amount =
            self.convert_to_base(signed_amount, &wallet.currency, base_currency, input.date)?;

        let now = Utc::now().naive_utc();
        let row = TransactionDB {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            wallet_id: wallet.id.clone(),
            to_wallet_id: None,
            pair_id: None,
            transaction_type: input.transaction_type.as_str().to_string(),
            status: TransactionStatus::Completed.as_str().to_string(),
            amount: signed_amount.to_string(),
            currency: wallet.currency.clone(),
            category_id: input.category_id.clone(),
            date: input.date,
            merchant: input.merchant.clone(),
            counterparty: input.counterparty.clone(),
            description: input.description.clone(),
            is_system: false,
            system_type: None,
            base_currency_amount: base_amount.map(|d| d.to_string()),
            created_at: now,
            updated_at: now,
        };

        let transaction = repository::insert_transaction(conn, &row)?;
        WalletRepository::adjust_balance_tx(conn, &wallet.id, signed_amount)?;

        let tags = input.tags();
        if !tags.is_empty() {
            repository::replace_tags(conn, &row.id, &tags)?;
        }

        Ok(TransactionPayload::Single { transaction })
    }

    fn create_transfer(
        &self,
        conn: &mut SqliteConnection,
        owner_id: &str,
        input: &TransactionInput,
        base_currency: &str,
    ) -> Result<TransactionPayload> {
        let from_id = input
            .from_wallet_id
            .as_deref()
            .ok_or_else(|| ValidationError::MissingField("fromWalletId".to_string()))?;
        let to_id = input
            .to_wallet_id
            .as_deref()
            .ok_or_else(|| ValidationError::MissingField("toWalletId".to_string()))?;

        let from = WalletRepository::get_wallet_tx(conn, owner_id, from_id)?;
        let to = WalletRepository::get_wallet_tx(conn, owner_id, to_id)?;

        if from.currency != to.currency {
            return Err(LedgerError::InvalidData(
                "Transfers are only supported between wallets sharing a currency".to_string(),
            )
            .into());
        }

        Self::check_cash_overdraft(&from, -input.amount)?;
        // The two legs cancel out, so the aggregate net worth is unchanged
        // and the ceiling cannot be breached.

        let base_out =
            self.convert_to_base(-input.amount, &from.currency, base_currency, input.date)?;

        let now = Utc::now().naive_utc();
        let pair_id = Uuid::new_v4().to_string();

        let source_row = TransactionDB {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            wallet_id: from.id.clone(),
            to_wallet_id: Some(to.id.clone()),
            pair_id: Some(pair_id.clone()),
            transaction_type: TransactionType::Transfer.as_str().to_string(),
            status: TransactionStatus::Completed.as_str().to_string(),
            amount: (-input.amount).to_string(),
            currency: from.currency.clone(),
            category_id: None,
            date: input.date,
            merchant: input.merchant.clone(),
            counterparty: input.counterparty.clone(),
            description: input.description.clone(),
            is_system: false,
            system_type: None,
            base_currency_amount: base_out.map(|d| d.to_string()),
            created_at: now,
            updated_at: now,
        };
        let destination_row = TransactionDB {
            id: Uuid::new_v4().to_string(),
            wallet_id: to.id.clone(),
            to_wallet_id: Some(from.id.clone()),
            amount: input.amount.to_string(),
            currency: to.currency.clone(),
            base_currency_amount: base_out.map(|d| (-d).to_string()),
            ..source_row.clone()
        };

        let source = repository::insert_transaction(conn, &source_row)?;
        let destination = repository::insert_transaction(conn, &destination_row)?;

        WalletRepository::adjust_balance_tx(conn, &from.id, -input.amount)?;
        WalletRepository::adjust_balance_tx(conn, &to.id, input.amount)?;

        Ok(TransactionPayload::Transfer {
            transactions: vec![source, destination],
            to: to.id.clone(),
        })
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    fn get_transaction(&self, owner_id: &str, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        let row = repository::get_transaction_for_owner(&mut conn, owner_id, transaction_id)?;
        Ok(Transaction::from(row))
    }

    fn get_transaction_tags(&self, transaction_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(repository::get_tags(&mut conn, transaction_id)?)
    }

    fn list_transactions(&self, owner_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(repository::list_transactions_for_owner(&mut conn, owner_id)?)
    }

    fn list_wallet_transactions(
        &self,
        owner_id: &str,
        wallet_id: &str,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(repository::list_transactions_for_wallet(
            &mut conn, owner_id, wallet_id,
        )?)
    }

    async fn create_transaction(
        &self,
        owner_id: &str,
        input: TransactionInput,
    ) -> Result<TransactionPayload> {
        input.validate()?;
        let base_currency = self.settings_repository.get_base_currency(owner_id)?;

        let mut conn = get_connection(&self.pool)?;
        let payload = conn.transaction::<TransactionPayload, Error, _>(|conn| {
            match input.transaction_type {
                TransactionType::Transfer => {
                    self.create_transfer(conn, owner_id, &input, &base_currency)
                }
                _ => self.create_entry(conn, owner_id, &input, &base_currency),
            }
        })?;

        debug!("Created {} transaction for owner {}", input.transaction_type.as_str(), owner_id);
        Ok(payload)
    }

    async fn update_transaction(
        &self,
        owner_id: &str,
        transaction_id: &str,
        input: TransactionInput,
    ) -> Result<TransactionPayload> {
        input.validate()?;
        let base_currency = self.settings_repository.get_base_currency(owner_id)?;

        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<TransactionPayload, Error, _>(|conn| {
            let existing = repository::get_transaction_for_owner(conn, owner_id, transaction_id)?;
            if existing.is_system {
                return Err(LedgerError::InvalidData(
                    "System transactions cannot be edited".to_string(),
                )
                .into());
            }

            let old_pair = if existing.transaction_type_enum() == TransactionType::Transfer {
                match existing.pair_id.as_deref() {
                    Some(pair_id) => repository::find_pair_counterpart(conn, pair_id, &existing.id)?,
                    None => None,
                }
            } else {
                None
            };

            // Reversal of the old effect, per wallet
            let mut deltas: HashMap<String, Decimal> = HashMap::new();
            *deltas.entry(existing.wallet_id.clone()).or_default() -= existing.amount_decimal();
            if let Some(pair) = &old_pair {
                *deltas.entry(pair.wallet_id.clone()).or_default() -= pair.amount_decimal();
            }

            let mut old_effect_base =
                self.convert_or_raw(existing.amount_decimal(), &existing.currency, &base_currency);
            if let Some(pair) = &old_pair {
                old_effect_base +=
                    self.convert_or_raw(pair.amount_decimal(), &pair.currency, &base_currency);
            }

            let now = Utc::now().naive_utc();

            let payload = match input.transaction_type {
                TransactionType::Transfer => {
                    let from_id = input
                        .from_wallet_id
                        .as_deref()
                        .ok_or_else(|| ValidationError::MissingField("fromWalletId".to_string()))?;
                    let to_id = input
                        .to_wallet_id
                        .as_deref()
                        .ok_or_else(|| ValidationError::MissingField("toWalletId".to_string()))?;

                    let from = WalletRepository::get_wallet_tx(conn, owner_id, from_id)?;
                    let to = WalletRepository::get_wallet_tx(conn, owner_id, to_id)?;

                    if from.currency != to.currency {
                        return Err(LedgerError::InvalidData(
                            "Transfers are only supported between wallets sharing a currency"
                                .to_string(),
                        )
                        .into());
                    }

                    *deltas.entry(from.id.clone()).or_default() -= input.amount;
                    *deltas.entry(to.id.clone()).or_default() += input.amount;

                    // Matched legs leave the aggregate unchanged
                    self.net_worth_guard.check_projected_net_worth(
                        owner_id,
                        -old_effect_base,
                        &base_currency,
                    )?;
                    self.check_overdrafts(conn, owner_id, &deltas)?;

                    let pair_id = existing
                        .pair_id
                        .clone()
                        .unwrap_or_else(|| Uuid::new_v4().to_string());
                    let base_out = self.convert_to_base(
                        -input.amount,
                        &from.currency,
                        &base_currency,
                        input.date,
                    )?;

                    let mut primary = existing.clone();
                    primary.wallet_id = from.id.clone();
                    primary.to_wallet_id = Some(to.id.clone());
                    primary.pair_id = Some(pair_id.clone());
                    primary.transaction_type = TransactionType::Transfer.as_str().to_string();
                    primary.amount = (-input.amount).to_string();
                    primary.currency = from.currency.clone();
                    primary.category_id = None;
                    primary.date = input.date;
                    primary.merchant = input.merchant.clone();
                    primary.counterparty = input.counterparty.clone();
                    primary.description = input.description.clone();
                    primary.base_currency_amount = base_out.map(|d| d.to_string());
                    primary.updated_at = now;
                    let primary_row = repository::update_transaction(conn, &primary)?;

                    let counterpart_row = match old_pair {
                        Some(mut pair) => {
                            pair.wallet_id = to.id.clone();
                            pair.to_wallet_id = Some(from.id.clone());
                            pair.pair_id = Some(pair_id.clone());
                            pair.transaction_type =
                                TransactionType::Transfer.as_str().to_string();
                            pair.amount = input.amount.to_string();
                            pair.currency = to.currency.clone();
                            pair.category_id = None;
                            pair.date = input.date;
                            pair.merchant = input.merchant.clone();
                            pair.counterparty = input.counterparty.clone();
                            pair.description = input.description.clone();
                            pair.base_currency_amount = base_out.map(|d| (-d).to_string());
                            pair.updated_at = now;
                            repository::update_transaction(conn, &pair)?
                        }
                        None => {
                            // No linked counterpart exists; synthesize one so
                            // the transfer is whole again
                            let row = TransactionDB {
                                id: Uuid::new_v4().to_string(),
                                wallet_id: to.id.clone(),
                                to_wallet_id: Some(from.id.clone()),
                                amount: input.amount.to_string(),
                                currency: to.currency.clone(),
                                base_currency_amount: base_out.map(|d| (-d).to_string()),
                                created_at: now,
                                ..primary.clone()
                            };
                            repository::insert_transaction(conn, &row)?
                        }
                    };

                    // Transfers never carry tags
                    repository::delete_tags(conn, &existing.id)?;

                    TransactionPayload::Transfer {
                        transactions: vec![primary_row, counterpart_row],
                        to: to.id.clone(),
                    }
                }
                _ => {
                    let wallet_id = input
                        .wallet_id
                        .as_deref()
                        .ok_or_else(|| ValidationError::MissingField("walletId".to_string()))?;
                    let wallet = WalletRepository::get_wallet_tx(conn, owner_id, wallet_id)?;

                    self.validate_entry_category(conn, &input)?;
                    let signed_amount = Self::signed_entry_amount(&input)?;
                    *deltas.entry(wallet.id.clone()).or_default() += signed_amount;

                    let new_effect_base =
                        self.convert_or_raw(signed_amount, &wallet.currency, &base_currency);
                    self.net_worth_guard.check_projected_net_worth(
                        owner_id,
                        new_effect_base - old_effect_base,
                        &base_currency,
                    )?;
                    self.check_overdrafts(conn, owner_id, &deltas)?;

                    // A counterpart left over from a transfer is obsolete once
                    // the row stops being one
                    if let Some(pair) = &old_pair {
                        repository::delete_tags(conn, &pair.id)?;
                        repository::delete_transaction(conn, &pair.id)?;
                    }

                    let base_amount = self.convert_to_base(
                        signed_amount,
                        &wallet.currency,
                        &base_currency,
                        input.date,
                    )?;

                    let mut primary = existing.clone();
                    primary.wallet_id = wallet.id.clone();
                    primary.to_wallet_id = None;
                    primary.pair_id = None;
                    primary.transaction_type = input.transaction_type.as_str().to_string();
                    primary.amount = signed_amount.to_string();
                    primary.currency = wallet.currency.clone();
                    primary.category_id = input.category_id.clone();
                    primary.date = input.date;
                    primary.merchant = input.merchant.clone();
                    primary.counterparty = input.counterparty.clone();
                    primary.description = input.description.clone();
                    primary.base_currency_amount = base_amount.map(|d| d.to_string());
                    primary.updated_at = now;
                    let updated = repository::update_transaction(conn, &primary)?;

                    repository::replace_tags(conn, &existing.id, &input.tags())?;

                    TransactionPayload::Single {
                        transaction: updated,
                    }
                }
            };

            // Checks are complete; apply the balance effects
            for (wallet_id, delta) in &deltas {
                if !delta.is_zero() {
                    WalletRepository::adjust_balance_tx(conn, wallet_id, *delta)?;
                }
            }

            Ok(payload)
        })
    }

    async fn delete_transaction(
        &self,
        owner_id: &str,
        transaction_id: &str,
    ) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<Transaction, Error, _>(|conn| {
            let existing = repository::get_transaction_for_owner(conn, owner_id, transaction_id)?;

            let old_pair = if existing.transaction_type_enum() == TransactionType::Transfer {
                match existing.pair_id.as_deref() {
                    Some(pair_id) => repository::find_pair_counterpart(conn, pair_id, &existing.id)?,
                    None => None,
                }
            } else {
                None
            };

            let mut deltas: HashMap<String, Decimal> = HashMap::new();
            *deltas.entry(existing.wallet_id.clone()).or_default() -= existing.amount_decimal();
            if let Some(pair) = &old_pair {
                *deltas.entry(pair.wallet_id.clone()).or_default() -= pair.amount_decimal();
            }

            self.check_overdrafts(conn, owner_id, &deltas)?;

            if let Some(pair) = &old_pair {
                repository::delete_tags(conn, &pair.id)?;
                repository::delete_transaction(conn, &pair.id)?;
            }
            repository::delete_tags(conn, &existing.id)?;
            repository::delete_transaction(conn, &existing.id)?;

            for (wallet_id, delta) in &deltas {
                if !delta.is_zero() {
                    WalletRepository::adjust_balance_tx(conn, wallet_id, *delta)?;
                }
            }

            Ok(Transaction::from(existing))
        })
    }

    async fn adjust_wallet_balance(
        &self,
        owner_id: &str,
        wallet_id: &str,
        target_balance: Decimal,
    ) -> Result<Transaction> {
        let base_currency = self.settings_repository.get_base_currency(owner_id)?;

        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<Transaction, Error, _>(|conn| {
            let wallet = WalletRepository::get_wallet_tx(conn, owner_id, wallet_id)?;
            let current = wallet.current_balance_decimal();
            let delta = target_balance - current;

            if delta.is_zero() {
                return Err(LedgerError::InvalidData(
                    "Wallet balance already equals the requested amount".to_string(),
                )
                .into());
            }
            if wallet.wallet_type_enum() == WalletType::Cash && target_balance < Decimal::ZERO {
                return Err(LedgerError::Overdraft {
                    wallet: wallet.name.clone(),
                    balance: current,
                    required: delta.abs(),
                }
                .into());
            }
            if delta > Decimal::ZERO {
                self.net_worth_guard
                    .check_projected_net_worth(owner_id, delta, &wallet.currency)?;
            }

            let today = Utc::now().date_naive();
            let base_amount =
                self.convert_to_base(delta, &wallet.currency, &base_currency, today)?;

            let transaction_type = if delta > Decimal::ZERO {
                TransactionType::Income
            } else {
                TransactionType::Expense
            };

            let now = Utc::now().naive_utc();
            let row = TransactionDB {
                id: Uuid::new_v4().to_string(),
                owner_id: owner_id.to_string(),
                wallet_id: wallet.id.clone(),
                to_wallet_id: None,
                pair_id: None,
                transaction_type: transaction_type.as_str().to_string(),
                status: TransactionStatus::Completed.as_str().to_string(),
                amount: delta.to_string(),
                currency: wallet.currency.clone(),
                category_id: None,
                date: today,
                merchant: None,
                counterparty: None,
                description: None,
                is_system: true,
                system_type: Some(SystemTransactionType::BalanceAdjustment.as_str().to_string()),
                base_currency_amount: base_amount.map(|d| d.to_string()),
                created_at: now,
                updated_at: now,
            };

            let transaction = repository::insert_transaction(conn, &row)?;
            WalletRepository::adjust_balance_tx(conn, &wallet.id, delta)?;

            Ok(transaction)
        })
    }
}
