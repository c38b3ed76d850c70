//! Integration tests for the balance ledger.
//!
//! Exercises debit/credit pairing with ledger rows, the non-negative
//! balance guard, append-only enforcement, and reconciliation.

use assert_matches::assert_matches;
use casebox_core::types::Money;
use casebox_db::models::balance_transaction::TransactionType;
use casebox_db::models::page::PageQuery;
use casebox_db::models::user::CreateUser;
use casebox_db::repositories::{LedgerError, LedgerRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn funded_user(pool: &PgPool, username: &str, amount: i64) -> i64 {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
        },
    )
    .await
    .unwrap();
    if amount > 0 {
        LedgerRepo::deposit(pool, user.id, Money::from(amount), "Initial deposit")
            .await
            .unwrap();
    }
    user.id
}

async fn balance_of(pool: &PgPool, user_id: i64) -> Money {
    UserRepo::find_by_id(pool, user_id)
        .await
        .unwrap()
        .unwrap()
        .balance
}

// ---------------------------------------------------------------------------
// Test: deposit credits balance and appends a positive row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deposit_credits_balance(pool: PgPool) {
    let user_id = funded_user(&pool, "alice", 150).await;

    assert_eq!(balance_of(&pool, user_id).await, Money::from(150));

    let rows = LedgerRepo::list_for_user(&pool, user_id, &PageQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].transaction_type, TransactionType::Deposit);
    assert_eq!(rows[0].amount, Money::from(150));
}

// ---------------------------------------------------------------------------
// Test: debit subtracts and appends a negative row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_debit_appends_negative_row(pool: PgPool) {
    let user_id = funded_user(&pool, "bob", 150).await;

    let mut tx = pool.begin().await.unwrap();
    let entry = LedgerRepo::debit(
        &mut tx,
        user_id,
        Money::from(100),
        TransactionType::OpenCase,
        "Opened case",
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(entry.balance_after, Money::from(50));
    assert_eq!(entry.transaction.amount, Money::from(-100));
    assert_eq!(entry.transaction.transaction_type, TransactionType::OpenCase);
    assert_eq!(balance_of(&pool, user_id).await, Money::from(50));
}

// ---------------------------------------------------------------------------
// Test: debit beyond balance fails and changes nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_debit_never_overdraws(pool: PgPool) {
    let user_id = funded_user(&pool, "carol", 50).await;

    let mut tx = pool.begin().await.unwrap();
    let err = LedgerRepo::debit(
        &mut tx,
        user_id,
        Money::from(100),
        TransactionType::OpenCase,
        "Opened case",
    )
    .await
    .unwrap_err();
    drop(tx);

    assert_matches!(
        err,
        LedgerError::InsufficientFunds { balance, required }
            if balance == Money::from(50) && required == Money::from(100)
    );
    assert_eq!(balance_of(&pool, user_id).await, Money::from(50));

    let rows = LedgerRepo::list_for_user(&pool, user_id, &PageQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1, "only the deposit row should exist");
}

// ---------------------------------------------------------------------------
// Test: unknown user and non-positive amounts are rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_ledger_inputs(pool: PgPool) {
    let user_id = funded_user(&pool, "dave", 10).await;

    let mut tx = pool.begin().await.unwrap();
    let err = LedgerRepo::debit(
        &mut tx,
        999_999,
        Money::from(1),
        TransactionType::OpenCase,
        "x",
    )
    .await
    .unwrap_err();
    assert_matches!(err, LedgerError::UserNotFound { user_id: 999_999 });

    let err = LedgerRepo::credit(
        &mut tx,
        user_id,
        Money::ZERO,
        TransactionType::Deposit,
        "x",
    )
    .await
    .unwrap_err();
    assert_matches!(err, LedgerError::InvalidAmount(_));

    let err = LedgerRepo::debit(
        &mut tx,
        user_id,
        Money::from(-5),
        TransactionType::OpenCase,
        "x",
    )
    .await
    .unwrap_err();
    assert_matches!(err, LedgerError::InvalidAmount(_));
}

// ---------------------------------------------------------------------------
// Test: rolled-back debit leaves no trace
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rolled_back_debit_is_not_observable(pool: PgPool) {
    let user_id = funded_user(&pool, "erin", 100).await;

    let mut tx = pool.begin().await.unwrap();
    LedgerRepo::debit(
        &mut tx,
        user_id,
        Money::from(40),
        TransactionType::OpenCase,
        "Opened case",
    )
    .await
    .unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(balance_of(&pool, user_id).await, Money::from(100));
    let report = LedgerRepo::reconcile(&pool, user_id).await.unwrap().unwrap();
    assert!(report.is_consistent);
}

// ---------------------------------------------------------------------------
// Test: ledger rows cannot be updated or deleted
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ledger_is_append_only(pool: PgPool) {
    let user_id = funded_user(&pool, "frank", 20).await;

    let update = sqlx::query("UPDATE balance_transactions SET amount = 1 WHERE user_id = $1")
        .bind(user_id)
        .execute(&pool)
        .await;
    assert!(update.is_err(), "UPDATE on the ledger must be rejected");

    let delete = sqlx::query("DELETE FROM balance_transactions WHERE user_id = $1")
        .bind(user_id)
        .execute(&pool)
        .await;
    assert!(delete.is_err(), "DELETE on the ledger must be rejected");
}

// ---------------------------------------------------------------------------
// Test: schema refuses a negative balance even without the ledger guard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_balance_violates_constraint(pool: PgPool) {
    let user_id = funded_user(&pool, "grace", 5).await;

    let result = sqlx::query("UPDATE users SET balance = -1 WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await;

    let err = result.unwrap_err();
    let db_err = err.as_database_error().expect("expected a database error");
    assert_eq!(db_err.constraint(), Some("ck_users_balance_non_negative"));
}

// ---------------------------------------------------------------------------
// Test: reconciliation matches after a mix of credits and debits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reconcile_after_mixed_activity(pool: PgPool) {
    let user_id = funded_user(&pool, "heidi", 200).await;

    let mut tx = pool.begin().await.unwrap();
    LedgerRepo::debit(
        &mut tx,
        user_id,
        Money::new(7525, 2),
        TransactionType::OpenCase,
        "Opened case",
    )
    .await
    .unwrap();
    LedgerRepo::credit(
        &mut tx,
        user_id,
        Money::from(10),
        TransactionType::ReferralBonus,
        "Referral bonus",
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let report = LedgerRepo::reconcile(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(report.balance, Money::new(13475, 2));
    assert_eq!(report.ledger_total, Money::new(13475, 2));
    assert!(report.is_consistent);

    assert!(LedgerRepo::reconcile(&pool, 999_999).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: listing is newest-first and paginated
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_user_paginates(pool: PgPool) {
    let user_id = funded_user(&pool, "ivan", 10).await;
    LedgerRepo::deposit(&pool, user_id, Money::from(20), "Second")
        .await
        .unwrap();
    LedgerRepo::deposit(&pool, user_id, Money::from(30), "Third")
        .await
        .unwrap();

    let first_page = LedgerRepo::list_for_user(
        &pool,
        user_id,
        &PageQuery {
            limit: Some(2),
            offset: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(first_page.len(), 2);
    assert_eq!(first_page[0].description, "Third");

    let second_page = LedgerRepo::list_for_user(
        &pool,
        user_id,
        &PageQuery {
            limit: Some(2),
            offset: Some(2),
        },
    )
    .await
    .unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].description, "Initial deposit");
}
