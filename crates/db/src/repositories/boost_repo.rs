//! Repository for the `boost_options` default catalog.

use sqlx::PgPool;

use crate::models::boost::{BoostOption, CreateBoostOption};

/// Column list for `boost_options` queries.
const COLUMNS: &str = "id, key, name, cost_delta, chance_multiplier, created_at, updated_at";

pub struct BoostRepo;

impl BoostRepo {
    /// Add an entry to the default catalog.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBoostOption,
    ) -> Result<BoostOption, sqlx::Error> {
        let query = format!(
            "INSERT INTO boost_options (key, name, cost_delta, chance_multiplier) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoostOption>(&query)
            .bind(&input.key)
            .bind(&input.name)
            .bind(input.cost_delta)
            .bind(input.chance_multiplier)
            .fetch_one(pool)
            .await
    }

    /// List the whole default catalog.
    pub async fn list_defaults<'e, E>(executor: E) -> Result<Vec<BoostOption>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM boost_options ORDER BY key");
        sqlx::query_as::<_, BoostOption>(&query)
            .fetch_all(executor)
            .await
    }
}
