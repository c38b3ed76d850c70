//! Repository for the `users` table.

use casebox_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, username, balance, created_at, updated_at";

/// Read access to users. Balances are only ever changed through
/// [`LedgerRepo`](super::LedgerRepo).
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with a zero balance.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!("INSERT INTO users (username) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .fetch_one(pool)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
