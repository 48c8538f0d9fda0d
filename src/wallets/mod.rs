pub mod wallets_errors;
pub mod wallets_model;
pub mod wallets_repository;
pub mod wallets_service;
pub mod wallets_traits;

pub use wallets_errors::WalletError;
pub use wallets_model::{NewWallet, Wallet, WalletDB, WalletType, WalletUpdate};
pub use wallets_repository::WalletRepository;
pub use wallets_service::WalletService;
pub use wallets_traits::WalletRepositoryTrait;
