pub mod constants;
pub mod db;
pub mod errors;
pub mod schema;

pub mod fx;
pub mod idempotency;
pub mod ledger;
pub mod limits;
pub mod rate_sync;
pub mod settings;
pub mod wallets;

pub use errors::{Error, Result};
