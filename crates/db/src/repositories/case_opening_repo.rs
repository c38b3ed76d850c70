//! Repository for the `case_opening_history` table.

use casebox_core::types::DbId;
use sqlx::{Postgres, Transaction};

use crate::models::case_opening::{CaseOpeningHistory, CaseOpeningListItem};
use crate::models::page::PageQuery;
use crate::models::status::OpeningActionStatus;

/// Column list for `case_opening_history` queries.
const COLUMNS: &str = "id, user_id, case_id, prize_id, balance_transaction_id, \
    action_taken_id, created_at, updated_at";

/// Column list for the enriched list view.
const LIST_COLUMNS: &str = "\
    h.id, h.case_id, c.name AS case_name, h.prize_id, p.name AS prize_name, \
    h.balance_transaction_id, ABS(bt.amount) AS amount_charged, \
    s.name AS action_taken, h.created_at";

pub struct CaseOpeningRepo;

impl CaseOpeningRepo {
    /// Record a successful opening with `action_taken = pending`.
    ///
    /// Must run on the same transaction as the debit it references.
    pub async fn record(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        case_id: DbId,
        prize_id: DbId,
        balance_transaction_id: DbId,
    ) -> Result<CaseOpeningHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO case_opening_history \
                (user_id, case_id, prize_id, balance_transaction_id, action_taken_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CaseOpeningHistory>(&query)
            .bind(user_id)
            .bind(case_id)
            .bind(prize_id)
            .bind(balance_transaction_id)
            .bind(OpeningActionStatus::Pending.id())
            .fetch_one(&mut **tx)
            .await
    }

    /// Find an opening by ID.
    pub async fn find_by_id<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<CaseOpeningHistory>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM case_opening_history WHERE id = $1");
        sqlx::query_as::<_, CaseOpeningHistory>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List a user's openings, newest first.
    pub async fn list_for_user<'e, E>(
        executor: E,
        user_id: DbId,
        page: &PageQuery,
    ) -> Result<Vec<CaseOpeningListItem>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {LIST_COLUMNS} \
             FROM case_opening_history h \
             JOIN cases c ON c.id = h.case_id \
             JOIN case_prizes p ON p.id = h.prize_id \
             JOIN balance_transactions bt ON bt.id = h.balance_transaction_id \
             JOIN opening_action_statuses s ON s.id = h.action_taken_id \
             WHERE h.user_id = $1 \
             ORDER BY h.created_at DESC, h.id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CaseOpeningListItem>(&query)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(executor)
            .await
    }

    /// Count a user's openings.
    pub async fn count_for_user(pool: &sqlx::PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM case_opening_history WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
