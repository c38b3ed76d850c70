//! Case opening history: the audit record tying a debit to its outcome.

use casebox_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::status::StatusId;

/// A row from the `case_opening_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CaseOpeningHistory {
    pub id: DbId,
    pub user_id: DbId,
    pub case_id: DbId,
    pub prize_id: DbId,
    pub balance_transaction_id: DbId,
    pub action_taken_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// History row enriched with case, prize, status names and the charged
/// amount, for user-facing lists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CaseOpeningListItem {
    pub id: DbId,
    pub case_id: DbId,
    pub case_name: String,
    pub prize_id: DbId,
    pub prize_name: String,
    pub balance_transaction_id: DbId,
    /// Absolute amount charged for the opening.
    pub amount_charged: Money,
    pub action_taken: String,
    pub created_at: Timestamp,
}
