use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::ledger_errors::LedgerError;
use super::ledger_model::{Category, Transaction, TransactionDB, TransactionTagDB};
use crate::schema::{categories, transaction_tags, transactions};

type RepoResult<T> = std::result::Result<T, LedgerError>;

/// Row-level operations for the transactions table. Every function takes the
/// connection of the enclosing unit of work so multi-row mutations stay
/// all-or-nothing.
pub fn get_transaction_for_owner(
    conn: &mut SqliteConnection,
    owner_id: &str,
    transaction_id: &str,
) -> RepoResult<TransactionDB> {
    transactions::table
        .find(transaction_id)
        .filter(transactions::owner_id.eq(owner_id))
        .select(TransactionDB::as_select())
        .first::<TransactionDB>(conn)
        .optional()?
        .ok_or_else(|| LedgerError::NotFound(format!("Transaction {} not found", transaction_id)))
}

/// The other row of a transfer, linked through the shared pair id.
pub fn find_pair_counterpart(
    conn: &mut SqliteConnection,
    pair_id: &str,
    exclude_id: &str,
) -> RepoResult<Option<TransactionDB>> {
    transactions::table
        .filter(transactions::pair_id.eq(pair_id))
        .filter(transactions::id.ne(exclude_id))
        .select(TransactionDB::as_select())
        .first::<TransactionDB>(conn)
        .optional()
        .map_err(LedgerError::from)
}

pub fn insert_transaction(
    conn: &mut SqliteConnection,
    row: &TransactionDB,
) -> RepoResult<Transaction> {
    diesel::insert_into(transactions::table)
        .values(row)
        .get_result::<TransactionDB>(conn)
        .map(Transaction::from)
        .map_err(LedgerError::from)
}

pub fn update_transaction(
    conn: &mut SqliteConnection,
    row: &TransactionDB,
) -> RepoResult<Transaction> {
    diesel::update(transactions::table.find(&row.id))
        .set(row)
        .get_result::<TransactionDB>(conn)
        .map(Transaction::from)
        .map_err(LedgerError::from)
}

pub fn delete_transaction(conn: &mut SqliteConnection, transaction_id: &str) -> RepoResult<()> {
    diesel::delete(transactions::table.find(transaction_id)).execute(conn)?;
    Ok(())
}

pub fn delete_tags(conn: &mut SqliteConnection, transaction_id: &str) -> RepoResult<()> {
    diesel::delete(
        transaction_tags::table.filter(transaction_tags::transaction_id.eq(transaction_id)),
    )
    .execute(conn)?;
    Ok(())
}

/// Tag associations are replaced wholesale rather than diffed.
pub fn replace_tags(
    conn: &mut SqliteConnection,
    transaction_id: &str,
    tags: &[String],
) -> RepoResult<()> {
    delete_tags(conn, transaction_id)?;

    if tags.is_empty() {
        return Ok(());
    }

    let rows: Vec<TransactionTagDB> = tags
        .iter()
        .map(|tag| TransactionTagDB {
            transaction_id: transaction_id.to_string(),
            tag: tag.clone(),
        })
        .collect();

    diesel::insert_into(transaction_tags::table)
        .values(&rows)
        .execute(conn)?;

    Ok(())
}

pub fn get_tags(conn: &mut SqliteConnection, transaction_id: &str) -> RepoResult<Vec<String>> {
    transaction_tags::table
        .filter(transaction_tags::transaction_id.eq(transaction_id))
        .order(transaction_tags::tag.asc())
        .select(transaction_tags::tag)
        .load::<String>(conn)
        .map_err(LedgerError::from)
}

pub fn get_category(
    conn: &mut SqliteConnection,
    category_id: &str,
) -> RepoResult<Option<Category>> {
    categories::table
        .find(category_id)
        .select(Category::as_select())
        .first::<Category>(conn)
        .optional()
        .map_err(LedgerError::from)
}

pub fn list_transactions_for_owner(
    conn: &mut SqliteConnection,
    owner_id: &str,
) -> RepoResult<Vec<Transaction>> {
    transactions::table
        .filter(transactions::owner_id.eq(owner_id))
        .order((transactions::date.desc(), transactions::created_at.desc()))
        .select(TransactionDB::as_select())
        .load::<TransactionDB>(conn)
        .map(|rows| rows.into_iter().map(Transaction::from).collect())
        .map_err(LedgerError::from)
}

pub fn list_transactions_for_wallet(
    conn: &mut SqliteConnection,
    owner_id: &str,
    wallet_id: &str,
) -> RepoResult<Vec<Transaction>> {
    transactions::table
        .filter(transactions::owner_id.eq(owner_id))
        .filter(transactions::wallet_id.eq(wallet_id))
        .order((transactions::date.desc(), transactions::created_at.desc()))
        .select(TransactionDB::as_select())
        .load::<TransactionDB>(conn)
        .map(|rows| rows.into_iter().map(Transaction::from).collect())
        .map_err(LedgerError::from)
}
