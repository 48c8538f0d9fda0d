use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ledger_constants::*;
use crate::errors::{Error, Result, ValidationError};

/// Enum representing the transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => TRANSACTION_TYPE_INCOME,
            TransactionType::Expense => TRANSACTION_TYPE_EXPENSE,
            TransactionType::Transfer => TRANSACTION_TYPE_TRANSFER,
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            TRANSACTION_TYPE_INCOME => Ok(TransactionType::Income),
            TRANSACTION_TYPE_EXPENSE => Ok(TransactionType::Expense),
            TRANSACTION_TYPE_TRANSFER => Ok(TransactionType::Transfer),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Pending,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => TRANSACTION_STATUS_COMPLETED,
            TransactionStatus::Pending => TRANSACTION_STATUS_PENDING,
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            TRANSACTION_STATUS_COMPLETED => Ok(TransactionStatus::Completed),
            TRANSACTION_STATUS_PENDING => Ok(TransactionStatus::Pending),
            _ => Err(format!("Unknown transaction status: {}", s)),
        }
    }
}

/// Engine-generated transaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemTransactionType {
    BalanceAdjustment,
}

impl SystemTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemTransactionType::BalanceAdjustment => SYSTEM_TYPE_BALANCE_ADJUSTMENT,
        }
    }
}

impl FromStr for SystemTransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            SYSTEM_TYPE_BALANCE_ADJUSTMENT => Ok(SystemTransactionType::BalanceAdjustment),
            _ => Err(format!("Unknown system transaction type: {}", s)),
        }
    }
}

/// Domain model representing one ledger row. Transfers appear as two rows
/// sharing a `pair_id`, with amounts that sum to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub owner_id: String,
    pub wallet_id: String,
    pub to_wallet_id: Option<String>,
    pub pair_id: Option<String>,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub amount: Decimal,
    pub currency: String,
    pub category_id: Option<String>,
    pub date: NaiveDate,
    pub merchant: Option<String>,
    pub counterparty: Option<String>,
    pub description: Option<String>,
    pub is_system: bool,
    pub system_type: Option<SystemTransactionType>,
    pub base_currency_amount: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for transactions
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub owner_id: String,
    pub wallet_id: String,
    pub to_wallet_id: Option<String>,
    pub pair_id: Option<String>,
    pub transaction_type: String,
    pub status: String,
    pub amount: String,
    pub currency: String,
    pub category_id: Option<String>,
    pub date: NaiveDate,
    pub merchant: Option<String>,
    pub counterparty: Option<String>,
    pub description: Option<String>,
    pub is_system: bool,
    pub system_type: Option<String>,
    pub base_currency_amount: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TransactionDB {
    pub fn amount_decimal(&self) -> Decimal {
        Decimal::from_str(&self.amount).unwrap_or_default()
    }

    pub fn transaction_type_enum(&self) -> TransactionType {
        TransactionType::from_str(&self.transaction_type).unwrap_or(TransactionType::Expense)
    }
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        Self {
            transaction_type: db.transaction_type_enum(),
            status: TransactionStatus::from_str(&db.status)
                .unwrap_or(TransactionStatus::Completed),
            amount: db.amount_decimal(),
            system_type: db
                .system_type
                .as_deref()
                .and_then(|s| SystemTransactionType::from_str(s).ok()),
            base_currency_amount: db
                .base_currency_amount
                .as_deref()
                .and_then(|s| Decimal::from_str(s).ok()),
            id: db.id,
            owner_id: db.owner_id,
            wallet_id: db.wallet_id,
            to_wallet_id: db.to_wallet_id,
            pair_id: db.pair_id,
            currency: db.currency,
            category_id: db.category_id,
            date: db.date,
            merchant: db.merchant,
            counterparty: db.counterparty,
            description: db.description,
            is_system: db.is_system,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Minimal category row consumed for type-match validation
#[derive(Queryable, Selectable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub category_type: String,
}

/// Tag association row
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::transaction_tags)]
pub struct TransactionTagDB {
    pub transaction_id: String,
    pub tag: String,
}

/// Typed input the API layer hands the engine for create and update.
/// `amount` is always the positive magnitude; the engine derives the sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub wallet_id: Option<String>,
    pub from_wallet_id: Option<String>,
    pub to_wallet_id: Option<String>,
    pub category_id: Option<String>,
    #[serde(default)]
    pub suggested_tags: Vec<String>,
    #[serde(default)]
    pub custom_tags: Vec<String>,
    pub date: NaiveDate,
    pub merchant: Option<String>,
    pub counterparty: Option<String>,
    pub description: Option<String>,
}

impl TransactionInput {
    /// Suggested and custom tags merged, trimmed and deduplicated in order.
    pub fn tags(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for tag in self.suggested_tags.iter().chain(self.custom_tags.iter()) {
            let tag = tag.trim();
            if !tag.is_empty() && !seen.iter().any(|t: &String| t == tag) {
                seen.push(tag.to_string());
            }
        }
        seen
    }

    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Amount must be a positive number".to_string(),
            )));
        }

        for (field, value) in [("merchant", &self.merchant), ("counterparty", &self.counterparty)]
        {
            if let Some(value) = value {
                if value.len() > MAX_NAME_LENGTH {
                    return Err(Error::Validation(ValidationError::InvalidInput(format!(
                        "Field '{}' cannot exceed {} characters",
                        field, MAX_NAME_LENGTH
                    ))));
                }
            }
        }
        if let Some(description) = &self.description {
            if description.len() > MAX_DESCRIPTION_LENGTH {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Description cannot exceed {} characters",
                    MAX_DESCRIPTION_LENGTH
                ))));
            }
        }

        let tags = self.tags();
        if tags.len() > MAX_TAGS_PER_TRANSACTION {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "At most {} tags are allowed per transaction",
                MAX_TAGS_PER_TRANSACTION
            ))));
        }
        if tags.iter().any(|t| t.len() > MAX_NAME_LENGTH) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Tags cannot exceed {} characters",
                MAX_NAME_LENGTH
            ))));
        }

        match self.transaction_type {
            TransactionType::Income | TransactionType::Expense => {
                if self.wallet_id.is_none() {
                    return Err(Error::Validation(ValidationError::MissingField(
                        "walletId".to_string(),
                    )));
                }
                if self.category_id.is_none() {
                    return Err(Error::Validation(ValidationError::MissingField(
                        "category".to_string(),
                    )));
                }
            }
            TransactionType::Transfer => {
                let from = self.from_wallet_id.as_deref().ok_or_else(|| {
                    Error::Validation(ValidationError::MissingField("fromWalletId".to_string()))
                })?;
                let to = self.to_wallet_id.as_deref().ok_or_else(|| {
                    Error::Validation(ValidationError::MissingField("toWalletId".to_string()))
                })?;
                if from == to {
                    return Err(Error::Validation(ValidationError::InvalidInput(
                        "Transfers require two different wallets".to_string(),
                    )));
                }
                if self.category_id.is_some() {
                    return Err(Error::Validation(ValidationError::InvalidInput(
                        "Transfers cannot carry a category".to_string(),
                    )));
                }
                if !tags.is_empty() {
                    return Err(Error::Validation(ValidationError::InvalidInput(
                        "Transfers cannot carry tags".to_string(),
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Result payload of a ledger mutation: a single row, or the two rows of a
/// transfer together with the destination wallet id.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TransactionPayload {
    Single {
        transaction: Transaction,
    },
    Transfer {
        transactions: Vec<Transaction>,
        to: String,
    },
}
