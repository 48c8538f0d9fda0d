use super::wallets_model::Wallet;
use crate::errors::Result;

/// Trait defining the wallet read operations shared across components.
pub trait WalletRepositoryTrait: Send + Sync {
    fn get_wallet(&self, owner_id: &str, wallet_id: &str) -> Result<Wallet>;
    /// Every wallet the owner holds, active or not.
    fn list_wallets(&self, owner_id: &str) -> Result<Vec<Wallet>>;
}
