use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use moneta_core::errors::Error;
use moneta_core::ledger::{
    LedgerError, LedgerServiceTrait, Transaction, TransactionInput, TransactionPayload,
    TransactionType,
};
use moneta_core::wallets::{WalletError, WalletRepositoryTrait, WalletType};

mod common;
use common::{date, seed_category, seed_rate, seed_wallet, setup, TestContext};

const OWNER: &str = "owner-1";

fn entry_input(
    transaction_type: TransactionType,
    amount: Decimal,
    wallet_id: &str,
    category_id: &str,
) -> TransactionInput {
    TransactionInput {
        transaction_type,
        amount,
        wallet_id: Some(wallet_id.to_string()),
        from_wallet_id: None,
        to_wallet_id: None,
        category_id: Some(category_id.to_string()),
        suggested_tags: vec![],
        custom_tags: vec![],
        date: date(2024, 5, 2),
        merchant: None,
        counterparty: None,
        description: None,
    }
}

fn transfer_input(amount: Decimal, from: &str, to: &str) -> TransactionInput {
    TransactionInput {
        transaction_type: TransactionType::Transfer,
        amount,
        wallet_id: None,
        from_wallet_id: Some(from.to_string()),
        to_wallet_id: Some(to.to_string()),
        category_id: None,
        suggested_tags: vec![],
        custom_tags: vec![],
        date: date(2024, 5, 2),
        merchant: None,
        counterparty: None,
        description: None,
    }
}

fn single(payload: TransactionPayload) -> Transaction {
    match payload {
        TransactionPayload::Single { transaction } => transaction,
        other => panic!("expected a single transaction, got {:?}", other),
    }
}

fn transfer_rows(payload: TransactionPayload) -> (Vec<Transaction>, String) {
    match payload {
        TransactionPayload::Transfer { transactions, to } => (transactions, to),
        other => panic!("expected a transfer payload, got {:?}", other),
    }
}

/// current_balance must always equal starting_balance plus the sum of the
/// wallet's transaction amounts.
fn assert_balance_invariant(ctx: &TestContext, wallet_id: &str) {
    let wallet = ctx
        .wallet_repository
        .get_wallet(OWNER, wallet_id)
        .expect("wallet should exist");
    let total: Decimal = ctx
        .ledger
        .list_wallet_transactions(OWNER, wallet_id)
        .expect("transactions should load")
        .iter()
        .map(|t| t.amount)
        .sum();
    assert_eq!(
        wallet.current_balance,
        wallet.starting_balance + total,
        "balance invariant broken for wallet {}",
        wallet_id
    );
}

#[tokio::test]
async fn test_income_and_expense_update_balance() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    seed_category(&ctx, "cat-food", "Food", "expense");
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    let income = single(
        ctx.ledger
            .create_transaction(
                OWNER,
                entry_input(TransactionType::Income, dec!(50), &wallet.id, "cat-salary"),
            )
            .await
            .unwrap(),
    );
    assert_eq!(income.amount, dec!(50));

    let expense = single(
        ctx.ledger
            .create_transaction(
                OWNER,
                entry_input(TransactionType::Expense, dec!(30), &wallet.id, "cat-food"),
            )
            .await
            .unwrap(),
    );
    assert_eq!(expense.amount, dec!(-30));

    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(120));
    assert_balance_invariant(&ctx, &wallet.id);
}

#[tokio::test]
async fn test_category_type_mismatch_is_rejected() {
    let ctx = setup();
    seed_category(&ctx, "cat-food", "Food", "expense");
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    let result = ctx
        .ledger
        .create_transaction(
            OWNER,
            entry_input(TransactionType::Income, dec!(50), &wallet.id, "cat-food"),
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::InvalidData(_)))
    ));
    assert_balance_invariant(&ctx, &wallet.id);
}

#[tokio::test]
async fn test_unknown_category_is_not_found() {
    let ctx = setup();
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    let result = ctx
        .ledger
        .create_transaction(
            OWNER,
            entry_input(TransactionType::Income, dec!(50), &wallet.id, "cat-nope"),
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_foreign_wallet_is_not_found() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    let wallet = seed_wallet(&ctx, "someone-else", "Their wallet", WalletType::Bank, "USD", dec!(0))
        .await;

    let result = ctx
        .ledger
        .create_transaction(
            OWNER,
            entry_input(TransactionType::Income, dec!(50), &wallet.id, "cat-salary"),
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Wallet(WalletError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_cash_overdraft_is_rejected() {
    let ctx = setup();
    seed_category(&ctx, "cat-food", "Food", "expense");
    let wallet = seed_wallet(&ctx, OWNER, "Pocket", WalletType::Cash, "USD", dec!(100)).await;

    let result = ctx
        .ledger
        .create_transaction(
            OWNER,
            entry_input(TransactionType::Expense, dec!(150), &wallet.id, "cat-food"),
        )
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::Overdraft { .. }))
    ));

    // The rejection must leave no side effects behind
    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(100));
    assert!(ctx
        .ledger
        .list_wallet_transactions(OWNER, &wallet.id)
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_bank_wallet_may_go_negative() {
    let ctx = setup();
    seed_category(&ctx, "cat-food", "Food", "expense");
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    ctx.ledger
        .create_transaction(
            OWNER,
            entry_input(TransactionType::Expense, dec!(150), &wallet.id, "cat-food"),
        )
        .await
        .unwrap();

    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(-50));
    assert_balance_invariant(&ctx, &wallet.id);
}

#[tokio::test]
async fn test_transfer_creates_matched_pair() {
    let ctx = setup();
    let from = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;
    let to = seed_wallet(&ctx, OWNER, "Savings", WalletType::Bank, "USD", dec!(0)).await;

    let (rows, destination) = transfer_rows(
        ctx.ledger
            .create_transaction(OWNER, transfer_input(dec!(40), &from.id, &to.id))
            .await
            .unwrap(),
    );

    assert_eq!(destination, to.id);
    assert_eq!(rows.len(), 2);

    let source_row = &rows[0];
    let dest_row = &rows[1];
    assert_eq!(source_row.wallet_id, from.id);
    assert_eq!(source_row.to_wallet_id.as_deref(), Some(to.id.as_str()));
    assert_eq!(dest_row.wallet_id, to.id);
    assert_eq!(dest_row.to_wallet_id.as_deref(), Some(from.id.as_str()));
    assert_eq!(source_row.amount + dest_row.amount, Decimal::ZERO);
    assert!(source_row.pair_id.is_some());
    assert_eq!(source_row.pair_id, dest_row.pair_id);

    let from_reloaded = ctx.wallet_repository.get_wallet(OWNER, &from.id).unwrap();
    let to_reloaded = ctx.wallet_repository.get_wallet(OWNER, &to.id).unwrap();
    assert_eq!(from_reloaded.current_balance, dec!(60));
    assert_eq!(to_reloaded.current_balance, dec!(40));
    assert_balance_invariant(&ctx, &from.id);
    assert_balance_invariant(&ctx, &to.id);
}

#[tokio::test]
async fn test_transfer_from_cash_requires_funds() {
    let ctx = setup();
    let from = seed_wallet(&ctx, OWNER, "Pocket", WalletType::Cash, "USD", dec!(25)).await;
    let to = seed_wallet(&ctx, OWNER, "Savings", WalletType::Bank, "USD", dec!(0)).await;

    let result = ctx
        .ledger
        .create_transaction(OWNER, transfer_input(dec!(40), &from.id, &to.id))
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::Overdraft { .. }))
    ));
    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &from.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(25));
}

#[tokio::test]
async fn test_cross_currency_transfer_is_rejected() {
    let ctx = setup();
    let from = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;
    let to = seed_wallet(&ctx, OWNER, "Euros", WalletType::Bank, "EUR", dec!(0)).await;

    let result = ctx
        .ledger
        .create_transaction(OWNER, transfer_input(dec!(40), &from.id, &to.id))
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::InvalidData(_)))
    ));
}

#[tokio::test]
async fn test_delete_transfer_removes_both_rows() {
    let ctx = setup();
    let from = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;
    let to = seed_wallet(&ctx, OWNER, "Savings", WalletType::Bank, "USD", dec!(0)).await;

    let (rows, _) = transfer_rows(
        ctx.ledger
            .create_transaction(OWNER, transfer_input(dec!(40), &from.id, &to.id))
            .await
            .unwrap(),
    );

    // Deleting either leg removes the pair and reverses both balances
    ctx.ledger
        .delete_transaction(OWNER, &rows[1].id)
        .await
        .unwrap();

    assert!(ctx
        .ledger
        .list_wallet_transactions(OWNER, &from.id)
        .unwrap()
        .is_empty());
    assert!(ctx
        .ledger
        .list_wallet_transactions(OWNER, &to.id)
        .unwrap()
        .is_empty());

    let from_reloaded = ctx.wallet_repository.get_wallet(OWNER, &from.id).unwrap();
    let to_reloaded = ctx.wallet_repository.get_wallet(OWNER, &to.id).unwrap();
    assert_eq!(from_reloaded.current_balance, dec!(100));
    assert_eq!(to_reloaded.current_balance, dec!(0));
}

#[tokio::test]
async fn test_delete_expense_reverses_balance() {
    let ctx = setup();
    seed_category(&ctx, "cat-food", "Food", "expense");
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    let expense = single(
        ctx.ledger
            .create_transaction(
                OWNER,
                entry_input(TransactionType::Expense, dec!(30), &wallet.id, "cat-food"),
            )
            .await
            .unwrap(),
    );

    ctx.ledger
        .delete_transaction(OWNER, &expense.id)
        .await
        .unwrap();

    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(100));
    assert_balance_invariant(&ctx, &wallet.id);
}

#[tokio::test]
async fn test_update_changes_type_and_rebalances() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    seed_category(&ctx, "cat-food", "Food", "expense");
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    let income = single(
        ctx.ledger
            .create_transaction(
                OWNER,
                entry_input(TransactionType::Income, dec!(50), &wallet.id, "cat-salary"),
            )
            .await
            .unwrap(),
    );

    let updated = single(
        ctx.ledger
            .update_transaction(
                OWNER,
                &income.id,
                entry_input(TransactionType::Expense, dec!(30), &wallet.id, "cat-food"),
            )
            .await
            .unwrap(),
    );

    assert_eq!(updated.id, income.id);
    assert_eq!(updated.transaction_type, TransactionType::Expense);
    assert_eq!(updated.amount, dec!(-30));

    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(70));
    assert_balance_invariant(&ctx, &wallet.id);
}

#[tokio::test]
async fn test_update_moves_transaction_between_wallets() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    let first = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;
    let second = seed_wallet(&ctx, OWNER, "Savings", WalletType::Bank, "USD", dec!(0)).await;

    let income = single(
        ctx.ledger
            .create_transaction(
                OWNER,
                entry_input(TransactionType::Income, dec!(50), &first.id, "cat-salary"),
            )
            .await
            .unwrap(),
    );

    single(
        ctx.ledger
            .update_transaction(
                OWNER,
                &income.id,
                entry_input(TransactionType::Income, dec!(50), &second.id, "cat-salary"),
            )
            .await
            .unwrap(),
    );

    let first_reloaded = ctx.wallet_repository.get_wallet(OWNER, &first.id).unwrap();
    let second_reloaded = ctx.wallet_repository.get_wallet(OWNER, &second.id).unwrap();
    assert_eq!(first_reloaded.current_balance, dec!(100));
    assert_eq!(second_reloaded.current_balance, dec!(50));
    assert_balance_invariant(&ctx, &first.id);
    assert_balance_invariant(&ctx, &second.id);
}

#[tokio::test]
async fn test_update_transfer_amount_updates_both_legs() {
    let ctx = setup();
    let from = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;
    let to = seed_wallet(&ctx, OWNER, "Savings", WalletType::Bank, "USD", dec!(0)).await;

    let (rows, _) = transfer_rows(
        ctx.ledger
            .create_transaction(OWNER, transfer_input(dec!(40), &from.id, &to.id))
            .await
            .unwrap(),
    );

    let (updated_rows, _) = transfer_rows(
        ctx.ledger
            .update_transaction(OWNER, &rows[0].id, transfer_input(dec!(10), &from.id, &to.id))
            .await
            .unwrap(),
    );

    assert_eq!(updated_rows[0].amount, dec!(-10));
    assert_eq!(updated_rows[1].amount, dec!(10));
    assert_eq!(updated_rows[0].pair_id, rows[0].pair_id);

    let from_reloaded = ctx.wallet_repository.get_wallet(OWNER, &from.id).unwrap();
    let to_reloaded = ctx.wallet_repository.get_wallet(OWNER, &to.id).unwrap();
    assert_eq!(from_reloaded.current_balance, dec!(90));
    assert_eq!(to_reloaded.current_balance, dec!(10));
    assert_balance_invariant(&ctx, &from.id);
    assert_balance_invariant(&ctx, &to.id);
}

#[tokio::test]
async fn test_tags_are_replaced_wholesale_on_update() {
    let ctx = setup();
    seed_category(&ctx, "cat-food", "Food", "expense");
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    let mut input = entry_input(TransactionType::Expense, dec!(20), &wallet.id, "cat-food");
    input.custom_tags = vec!["groceries".to_string(), "weekly".to_string()];
    let expense = single(ctx.ledger.create_transaction(OWNER, input).await.unwrap());

    let mut tags = ctx.ledger.get_transaction_tags(&expense.id).unwrap();
    tags.sort();
    assert_eq!(tags, vec!["groceries".to_string(), "weekly".to_string()]);

    let mut update = entry_input(TransactionType::Expense, dec!(20), &wallet.id, "cat-food");
    update.custom_tags = vec!["restaurant".to_string()];
    single(
        ctx.ledger
            .update_transaction(OWNER, &expense.id, update)
            .await
            .unwrap(),
    );

    let tags = ctx.ledger.get_transaction_tags(&expense.id).unwrap();
    assert_eq!(tags, vec!["restaurant".to_string()]);
}

#[tokio::test]
async fn test_tag_limit_is_enforced() {
    let ctx = setup();
    seed_category(&ctx, "cat-food", "Food", "expense");
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    let mut input = entry_input(TransactionType::Expense, dec!(20), &wallet.id, "cat-food");
    input.custom_tags = (0..6).map(|i| format!("tag-{}", i)).collect();

    let result = ctx.ledger.create_transaction(OWNER, input).await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_base_currency_amount_uses_closest_rate() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    // 1 USD = 0.80 EUR two days before the transaction date
    seed_rate(&ctx, date(2024, 4, 30), "EUR", dec!(0.80));
    let wallet = seed_wallet(&ctx, OWNER, "Euros", WalletType::Bank, "EUR", dec!(0)).await;

    let income = single(
        ctx.ledger
            .create_transaction(
                OWNER,
                entry_input(TransactionType::Income, dec!(80), &wallet.id, "cat-salary"),
            )
            .await
            .unwrap(),
    );

    assert_eq!(income.base_currency_amount, Some(dec!(100.00)));
}

#[tokio::test]
async fn test_base_currency_amount_missing_without_rate() {
    let ctx = setup();
    seed_category(&ctx, "cat-salary", "Salary", "income");
    let wallet = seed_wallet(&ctx, OWNER, "Euros", WalletType::Bank, "EUR", dec!(0)).await;

    let income = single(
        ctx.ledger
            .create_transaction(
                OWNER,
                entry_input(TransactionType::Income, dec!(80), &wallet.id, "cat-salary"),
            )
            .await
            .unwrap(),
    );

    assert_eq!(income.base_currency_amount, None);
}

#[tokio::test]
async fn test_adjust_wallet_balance_records_system_transaction() {
    let ctx = setup();
    let wallet = seed_wallet(&ctx, OWNER, "Checking", WalletType::Bank, "USD", dec!(100)).await;

    let adjustment = ctx
        .ledger
        .adjust_wallet_balance(OWNER, &wallet.id, dec!(140))
        .await
        .unwrap();

    assert!(adjustment.is_system);
    assert_eq!(adjustment.amount, dec!(40));
    assert_eq!(adjustment.transaction_type, TransactionType::Income);
    assert!(adjustment.category_id.is_none());

    let reloaded = ctx.wallet_repository.get_wallet(OWNER, &wallet.id).unwrap();
    assert_eq!(reloaded.current_balance, dec!(140));
    assert_balance_invariant(&ctx, &wallet.id);
}
