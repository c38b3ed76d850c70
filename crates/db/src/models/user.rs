//! User balance rows.

use casebox_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub balance: Money,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a user. Balances always start at zero and are funded
/// through the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
}
