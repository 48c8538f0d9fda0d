use rust_decimal_macros::dec;

use moneta_core::errors::Error;
use moneta_core::ledger::{LedgerServiceTrait, TransactionInput, TransactionType};
use moneta_core::limits::{ceiling_for_scale, LimitsError};
use moneta_core::settings::SettingsRepositoryTrait;
use moneta_core::wallets::{WalletRepositoryTrait, WalletType, WalletUpdate};

mod common;
use common::{date, seed_category, seed_wallet, setup};

const OWNER: &str = "owner-1";

fn income_input(wallet_id: &str, amount: rust_decimal::Decimal) -> TransactionInput {
    TransactionInput {
        transaction_type: TransactionType::Income,
        amount,
        wallet_id: Some(wallet_id.to_string()),
        from_wallet_id: None,
        to_wallet_id: None,
        category_id: Some("cat-salary".to_string()),
        suggested_tags: vec![],
        custom_tags: vec![],
        date: date(2024, 5, 2),
        merchant: None,
        counterparty: None,
        description: None,
    }
}

#[test]
fn test_two_decimal_ceiling_value() {
    assert_eq!(ceiling_for_scale(2).to_string(), "999999999999999.99");
}

#[tokio::test]
async fn test_income_past_ceiling_is_rejected_with_headroom() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    let wallet = seed_wallet(
        &ctx,
        OWNER,
        "Vault",
        WalletType::Bank,
        "USD",
        dec!(999999999999999.00),
    )
    .await;

    // Projecting to exactly 1,000,000,000,000,000.00 crosses the ceiling
    let result = ctx
        .ledger
        .create_transaction(OWNER, income_input(&wallet.id, dec!(1.00)))
        .await;

    match result {
        Err(Error::Limits(LimitsError::CeilingExceeded {
            currency,
            max_allowed,
        })) => {
            assert_eq!(currency, "USD");
            assert_eq!(max_allowed, dec!(0.99));
        }
        other => panic!("expected a ceiling rejection, got {:?}", other),
    }

    // No side effects
    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(999999999999999.00));
    assert!(ctx
        .ledger
        .list_wallet_transactions(OWNER, &wallet.id)
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_income_up_to_ceiling_is_allowed() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    let wallet = seed_wallet(
        &ctx,
        OWNER,
        "Vault",
        WalletType::Bank,
        "USD",
        dec!(999999999999999.00),
    )
    .await;

    ctx.ledger
        .create_transaction(OWNER, income_input(&wallet.id, dec!(0.99)))
        .await
        .unwrap();

    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(999999999999999.99));
}

#[tokio::test]
async fn test_expense_near_ceiling_is_always_allowed() {
    let ctx = setup();
    seed_category(&ctx, "cat-food", "Food", "expense");
    let wallet = seed_wallet(
        &ctx,
        OWNER,
        "Vault",
        WalletType::Bank,
        "USD",
        dec!(999999999999999.99),
    )
    .await;

    let input = TransactionInput {
        transaction_type: TransactionType::Expense,
        category_id: Some("cat-food".to_string()),
        ..income_input(&wallet.id, dec!(10))
    };
    ctx.ledger.create_transaction(OWNER, input).await.unwrap();

    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(999999999999989.99));
}

#[tokio::test]
async fn test_wallet_update_past_ceiling_is_rejected() {
    let ctx = setup();
    let wallet = seed_wallet(
        &ctx,
        OWNER,
        "Vault",
        WalletType::Bank,
        "USD",
        dec!(999999999999999.00),
    )
    .await;

    let result = ctx
        .wallets
        .update_wallet(
            OWNER,
            &wallet.id,
            WalletUpdate {
                starting_balance: Some(dec!(1000000000000000.00)),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Limits(LimitsError::CeilingExceeded { .. }))
    ));

    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.starting_balance, dec!(999999999999999.00));
}

#[tokio::test]
async fn test_ceiling_spans_wallets_across_currencies() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    ctx.settings.set_base_currency(OWNER, "USD").unwrap();
    // 1 USD = 0.80 EUR
    common::seed_rate(&ctx, date(2024, 5, 1), "EUR", dec!(0.80));

    seed_wallet(
        &ctx,
        OWNER,
        "Vault",
        WalletType::Bank,
        "USD",
        dec!(999999999999000.00),
    )
    .await;
    let euros = seed_wallet(&ctx, OWNER, "Euros", WalletType::Bank, "EUR", dec!(0)).await;

    // 1000 EUR is 1250 USD, pushing the aggregate past the ceiling
    let result = ctx
        .ledger
        .create_transaction(OWNER, income_input(&euros.id, dec!(1000)))
        .await;

    match result {
        Err(Error::Limits(LimitsError::CeilingExceeded { currency, .. })) => {
            assert_eq!(currency, "EUR");
        }
        other => panic!("expected a ceiling rejection, got {:?}", other),
    }
}
