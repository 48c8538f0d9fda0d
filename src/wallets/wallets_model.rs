use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::fx::currency::validate_currency_code;

pub const WALLET_TYPE_CASH: &str = "cash";
pub const WALLET_TYPE_BANK: &str = "bank";
pub const WALLET_TYPE_DIGITAL_WALLET: &str = "digital_wallet";

pub const MAX_WALLET_NAME_LENGTH: usize = 100;

/// Enum representing the supported wallet types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    Cash,
    Bank,
    DigitalWallet,
}

impl WalletType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::Cash => WALLET_TYPE_CASH,
            WalletType::Bank => WALLET_TYPE_BANK,
            WalletType::DigitalWallet => WALLET_TYPE_DIGITAL_WALLET,
        }
    }
}

impl FromStr for WalletType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            WALLET_TYPE_CASH => Ok(WalletType::Cash),
            WALLET_TYPE_BANK => Ok(WalletType::Bank),
            WALLET_TYPE_DIGITAL_WALLET => Ok(WalletType::DigitalWallet),
            _ => Err(format!("Unknown wallet type: {}", s)),
        }
    }
}

/// Domain model representing a wallet owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub wallet_type: WalletType,
    pub currency: String,
    pub starting_balance: Decimal,
    pub current_balance: Decimal,
    pub include_in_balance: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWallet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub wallet_type: WalletType,
    pub currency: String,
    pub starting_balance: Decimal,
    pub include_in_balance: bool,
}

impl NewWallet {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self.name.len() > MAX_WALLET_NAME_LENGTH {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Wallet name cannot exceed {} characters",
                MAX_WALLET_NAME_LENGTH
            ))));
        }
        validate_currency_code(&self.currency)?;
        Ok(())
    }
}

/// Input model for updating an existing wallet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletUpdate {
    pub name: Option<String>,
    pub starting_balance: Option<Decimal>,
    pub include_in_balance: Option<bool>,
    pub is_active: Option<bool>,
}

impl WalletUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Wallet name cannot be empty".to_string(),
                )));
            }
            if name.len() > MAX_WALLET_NAME_LENGTH {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Wallet name cannot exceed {} characters",
                    MAX_WALLET_NAME_LENGTH
                ))));
            }
        }
        Ok(())
    }
}

/// Database model for wallets
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::wallets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WalletDB {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub wallet_type: String,
    pub currency: String,
    pub starting_balance: String,
    pub current_balance: String,
    pub include_in_balance: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WalletDB {
    pub fn starting_balance_decimal(&self) -> Decimal {
        Decimal::from_str(&self.starting_balance).unwrap_or_default()
    }

    pub fn current_balance_decimal(&self) -> Decimal {
        Decimal::from_str(&self.current_balance).unwrap_or_default()
    }

    pub fn wallet_type_enum(&self) -> WalletType {
        WalletType::from_str(&self.wallet_type).unwrap_or(WalletType::Bank)
    }
}

impl From<WalletDB> for Wallet {
    fn from(db: WalletDB) -> Self {
        Self {
            wallet_type: db.wallet_type_enum(),
            starting_balance: db.starting_balance_decimal(),
            current_balance: db.current_balance_decimal(),
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            currency: db.currency,
            include_in_balance: db.include_in_balance,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
