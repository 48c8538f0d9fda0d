use async_trait::async_trait;
use rust_decimal::Decimal;

use super::ledger_model::{Transaction, TransactionInput, TransactionPayload};
use crate::errors::Result;

/// Trait defining the contract for ledger operations. Every mutation runs
/// inside one atomic unit: either all row and balance changes commit, or none.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    fn get_transaction(&self, owner_id: &str, transaction_id: &str) -> Result<Transaction>;
    fn get_transaction_tags(&self, transaction_id: &str) -> Result<Vec<String>>;
    fn list_transactions(&self, owner_id: &str) -> Result<Vec<Transaction>>;
    fn list_wallet_transactions(
        &self,
        owner_id: &str,
        wallet_id: &str,
    ) -> Result<Vec<Transaction>>;

    async fn create_transaction(
        &self,
        owner_id: &str,
        input: TransactionInput,
    ) -> Result<TransactionPayload>;
    async fn update_transaction(
        &self,
        owner_id: &str,
        transaction_id: &str,
        input: TransactionInput,
    ) -> Result<TransactionPayload>;
    async fn delete_transaction(&self, owner_id: &str, transaction_id: &str)
        -> Result<Transaction>;
    /// Records a system transaction bringing a wallet to `target_balance`.
    async fn adjust_wallet_balance(
        &self,
        owner_id: &str,
        wallet_id: &str,
        target_balance: Decimal,
    ) -> Result<Transaction>;
}
