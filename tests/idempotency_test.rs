use rust_decimal_macros::dec;

use moneta_core::idempotency::{CachedResponse, IdempotencyCache};
use moneta_core::ledger::{LedgerServiceTrait, TransactionInput, TransactionType};
use moneta_core::wallets::{WalletRepositoryTrait, WalletType};

mod common;
use common::{date, seed_category, seed_wallet, setup};

const OWNER: &str = "owner-1";

fn income_input(wallet_id: &str) -> TransactionInput {
    TransactionInput {
        transaction_type: TransactionType::Income,
        amount: dec!(50),
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

#[tokio::test]
async fn test_retried_create_commits_a_single_transaction() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    let cache = IdempotencyCache::new();
    let key = "req-4f9d2c7a81";

    let first = cache
        .execute(OWNER, key, || async {
            let result = ctx
                .ledger
                .create_transaction(OWNER, income_input(&wallet.id))
                .await;
            CachedResponse::from_result(&result, 201)
        })
        .await
        .unwrap();

    let second = cache
        .execute(OWNER, key, || async {
            let result = ctx
                .ledger
                .create_transaction(OWNER, income_input(&wallet.id))
                .await;
            CachedResponse::from_result(&result, 201)
        })
        .await
        .unwrap();

    // Both callers observe the identical response...
    assert_eq!(first.status_code, 201);
    assert_eq!(first, second);

    // ...and only one mutation ever committed
    let transactions = ctx.ledger.list_wallet_transactions(OWNER, &wallet.id).unwrap();
    assert_eq!(transactions.len(), 1);
    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(150));
}

#[tokio::test]
async fn test_distinct_keys_commit_distinct_transactions() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    let cache = IdempotencyCache::new();
    for key in ["req-aaaaaaaaaa", "req-bbbbbbbbbb"] {
        cache
            .execute(OWNER, key, || async {
                let result = ctx
                    .ledger
                    .create_transaction(OWNER, income_input(&wallet.id))
                    .await;
                CachedResponse::from_result(&result, 201)
            })
            .await
            .unwrap();
    }

    let transactions = ctx.ledger.list_wallet_transactions(OWNER, &wallet.id).unwrap();
    assert_eq!(transactions.len(), 2);
}

#[tokio::test]
async fn test_failed_mutation_is_not_replayed() {
    let ctx = setup();
    let cache = IdempotencyCache::new();
    let key = "req-4f9d2c7a81";

    // No category seeded: the mutation fails and must not be cached
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;
    let failure = cache
        .execute(OWNER, key, || async {
            let result = ctx
                .ledger
                .create_transaction(OWNER, income_input(&wallet.id))
                .await;
            CachedResponse::from_result(&result, 201)
        })
        .await
        .unwrap();
    assert_eq!(failure.status_code, 404);
    assert!(failure.body.get("error").is_some());

    // After fixing the input the same key can still commit
    seed_category(&ctx, "cat-salary", "Salary", "income");
    let success = cache
        .execute(OWNER, key, || async {
            let result = ctx
                .ledger
                .create_transaction(OWNER, income_input(&wallet.id))
                .await;
            CachedResponse::from_result(&result, 201)
        })
        .await
        .unwrap();
    assert_eq!(success.status_code, 201);
}
