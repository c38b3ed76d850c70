//! Repository for the append-only `balance_transactions` ledger and the
//! `users.balance` column it reconciles against.
//!
//! Every balance mutation goes through [`LedgerRepo::debit`] or
//! [`LedgerRepo::credit`], which update the balance and insert the matching
//! ledger row on the same transaction. Callers own the transaction and
//! decide when to commit.

use casebox_core::types::{DbId, Money};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::balance_transaction::{
    BalanceTransaction, LedgerEntry, Reconciliation, TransactionType,
};
use crate::models::page::PageQuery;

/// Column list for `balance_transactions` queries.
const COLUMNS: &str = "id, user_id, transaction_type, amount, description, created_at";

/// Failures of a ledger mutation.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("User {user_id} not found")]
    UserNotFound { user_id: DbId },

    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: Money, required: Money },

    #[error("Ledger amounts must be positive, got {0}")]
    InvalidAmount(Money),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub struct LedgerRepo;

impl LedgerRepo {
    // -----------------------------------------------------------------------
    // Locking
    // -----------------------------------------------------------------------

    /// Lock the user's balance row for the rest of the transaction and
    /// return the balance. Concurrent lockers for the same user block until
    /// this transaction ends.
    pub async fn lock_balance(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
    ) -> Result<Option<Money>, sqlx::Error> {
        let row: Option<(Money,)> =
            sqlx::query_as("SELECT balance FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(row.map(|(balance,)| balance))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Subtract `amount` from the user's balance and append a negative
    /// ledger row.
    ///
    /// The update is guarded by `balance >= amount`, so the balance can
    /// never go negative even if the caller skipped its own funds check.
    pub async fn debit(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        amount: Money,
        kind: TransactionType,
        description: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        ensure_positive(amount)?;

        let updated: Option<(Money,)> = sqlx::query_as(
            "UPDATE users SET balance = balance - $2 \
             WHERE id = $1 AND balance >= $2 \
             RETURNING balance",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut **tx)
        .await?;

        let Some((balance_after,)) = updated else {
            let current: Option<(Money,)> =
                sqlx::query_as("SELECT balance FROM users WHERE id = $1")
                    .bind(user_id)
                    .fetch_optional(&mut **tx)
                    .await?;
            return Err(match current {
                Some((balance,)) => LedgerError::InsufficientFunds {
                    balance,
                    required: amount,
                },
                None => LedgerError::UserNotFound { user_id },
            });
        };

        let transaction = Self::insert(tx, user_id, kind, -amount, description).await?;

        tracing::info!(
            user_id,
            transaction_id = transaction.id,
            transaction_type = ?kind,
            amount = %amount,
            balance_after = %balance_after,
            "Balance debited",
        );

        Ok(LedgerEntry {
            transaction,
            balance_after,
        })
    }

    /// Add `amount` to the user's balance and append a positive ledger row.
    pub async fn credit(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        amount: Money,
        kind: TransactionType,
        description: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        ensure_positive(amount)?;

        let updated: Option<(Money,)> = sqlx::query_as(
            "UPDATE users SET balance = balance + $2 WHERE id = $1 RETURNING balance",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut **tx)
        .await?;

        let Some((balance_after,)) = updated else {
            return Err(LedgerError::UserNotFound { user_id });
        };

        let transaction = Self::insert(tx, user_id, kind, amount, description).await?;

        tracing::info!(
            user_id,
            transaction_id = transaction.id,
            transaction_type = ?kind,
            amount = %amount,
            balance_after = %balance_after,
            "Balance credited",
        );

        Ok(LedgerEntry {
            transaction,
            balance_after,
        })
    }

    /// Credit a deposit in its own transaction.
    pub async fn deposit(
        pool: &PgPool,
        user_id: DbId,
        amount: Money,
        description: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut tx = pool.begin().await?;
        let entry =
            Self::credit(&mut tx, user_id, amount, TransactionType::Deposit, description).await?;
        tx.commit().await?;
        Ok(entry)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find a ledger row by ID.
    pub async fn find_by_id<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<BalanceTransaction>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM balance_transactions WHERE id = $1");
        sqlx::query_as::<_, BalanceTransaction>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List a user's ledger rows, newest first.
    pub async fn list_for_user<'e, E>(
        executor: E,
        user_id: DbId,
        page: &PageQuery,
    ) -> Result<Vec<BalanceTransaction>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM balance_transactions \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, BalanceTransaction>(&query)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(executor)
            .await
    }

    /// Compare the stored balance against the sum of the user's ledger.
    ///
    /// Returns `None` if the user does not exist.
    pub async fn reconcile(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Reconciliation>, sqlx::Error> {
        let row: Option<(Money, Money)> = sqlx::query_as(
            "SELECT u.balance, \
                    COALESCE((SELECT SUM(bt.amount) FROM balance_transactions bt \
                              WHERE bt.user_id = u.id), 0) \
             FROM users u \
             WHERE u.id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|(balance, ledger_total)| {
            let is_consistent = balance == ledger_total;
            if !is_consistent {
                tracing::error!(
                    user_id,
                    balance = %balance,
                    ledger_total = %ledger_total,
                    "Balance does not match ledger",
                );
            }
            Reconciliation {
                user_id,
                balance,
                ledger_total,
                is_consistent,
            }
        }))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Append a ledger row within an existing transaction.
    async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        kind: TransactionType,
        signed_amount: Money,
        description: &str,
    ) -> Result<BalanceTransaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO balance_transactions (user_id, transaction_type, amount, description) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BalanceTransaction>(&query)
            .bind(user_id)
            .bind(kind)
            .bind(signed_amount)
            .bind(description)
            .fetch_one(&mut **tx)
            .await
    }
}

fn ensure_positive(amount: Money) -> Result<(), LedgerError> {
    if amount <= Money::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}
