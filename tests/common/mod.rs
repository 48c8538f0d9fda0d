use std::sync::Arc;

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use tempfile::TempDir;

use moneta_core::db::{self, DbPool};
use moneta_core::fx::{FxRepository, FxRepositoryTrait, FxService, NewExchangeRate};
use moneta_core::ledger::LedgerService;
use moneta_core::limits::NetWorthGuard;
use moneta_core::schema::categories;
use moneta_core::settings::SettingsRepository;
use moneta_core::wallets::{NewWallet, Wallet, WalletRepository, WalletService, WalletType};

pub struct TestContext {
    pub pool: Arc<DbPool>,
    pub ledger: Arc<LedgerService>,
    pub wallets: Arc<WalletService>,
    pub wallet_repository: Arc<WalletRepository>,
    pub fx_repository: Arc<FxRepository>,
    pub settings: Arc<SettingsRepository>,
    // Keeps the temp database directory alive for the test's duration
    _tmp: TempDir,
}

pub fn setup() -> TestContext {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = db::init(tmp.path().to_str().unwrap()).expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let wallet_repository = Arc::new(WalletRepository::new(pool.clone()));
    let settings = Arc::new(SettingsRepository::new(pool.clone()));
    let fx_repository = Arc::new(FxRepository::new(pool.clone()));
    let fx_service = Arc::new(FxService::new(fx_repository.clone()));

    let net_worth_guard = Arc::new(NetWorthGuard::new(
        wallet_repository.clone(),
        settings.clone(),
        fx_service.clone(),
    ));

    let ledger = Arc::new(LedgerService::new(
        pool.clone(),
        fx_service.clone(),
        net_worth_guard.clone(),
        settings.clone(),
    ));
    let wallets = Arc::new(WalletService::new(
        pool.clone(),
        wallet_repository.clone(),
        net_worth_guard,
    ));

    TestContext {
        pool,
        ledger,
        wallets,
        wallet_repository,
        fx_repository,
        settings,
        _tmp: tmp,
    }
}

pub fn seed_category(ctx: &TestContext, id: &str, name: &str, category_type: &str) {
    let mut conn = ctx.pool.get().expect("Failed to get connection");
    diesel::insert_into(categories::table)
        .values((
            categories::id.eq(id),
            categories::name.eq(name),
            categories::category_type.eq(category_type),
        ))
        .execute(&mut conn)
        .expect("Failed to seed category");
}

pub fn seed_rate(ctx: &TestContext, date: NaiveDate, currency_code: &str, rate: Decimal) {
    ctx.fx_repository
        .insert_rates(vec![NewExchangeRate {
            date,
            currency_code: currency_code.to_string(),
            rate,
        }])
        .expect("Failed to seed exchange rate");
}

pub async fn seed_wallet(
    ctx: &TestContext,
    owner_id: &str,
    name: &str,
    wallet_type: WalletType,
    currency: &str,
    starting_balance: Decimal,
) -> Wallet {
    ctx.wallets
        .create_wallet(
            owner_id,
            NewWallet {
                id: None,
                name: name.to_string(),
                wallet_type,
                currency: currency.to_string(),
                starting_balance,
                include_in_balance: true,
            },
        )
        .await
        .expect("Failed to seed wallet")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
