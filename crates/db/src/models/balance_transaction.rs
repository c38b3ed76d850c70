//! Balance ledger models (append-only `balance_transactions`).

use casebox_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Ledger entry kind, stored as TEXT.
///
/// The table is shared with the deposit, purchase, and referral
/// subsystems; the case-opening engine only writes `OpenCase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    OpenCase,
    Deposit,
    Purchase,
    ReferralBonus,
    PrizeSale,
}

/// A row from the `balance_transactions` table. Debits carry a negative
/// `amount`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BalanceTransaction {
    pub id: DbId,
    pub user_id: DbId,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub description: String,
    pub created_at: Timestamp,
}

/// A ledger row together with the balance it produced.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub transaction: BalanceTransaction,
    pub balance_after: Money,
}

/// Comparison of a user's stored balance against the sum of their ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub user_id: DbId,
    pub balance: Money,
    pub ledger_total: Money,
    pub is_consistent: bool,
}
