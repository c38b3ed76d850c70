//! Repository for the `cases`, `case_prizes`, and `case_boost_configs`
//! tables.
//!
//! Case administration happens outside this service; the write methods
//! here exist for seeding and tests.

use casebox_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::case::{
    Case, CaseBoostConfig, CaseDefinition, CreateCase, CreatePrize, Prize, UpsertCaseBoostConfig,
};

/// Column list for the `cases` table.
const CASE_COLUMNS: &str = "id, name, base_price, is_active, timer_ends_at, created_at, updated_at";

/// Column list for the `case_prizes` table.
const PRIZE_COLUMNS: &str = "id, case_id, name, base_chance, reward_type, reward_amount, \
    product_id, duration_days, sell_value, sort_order, created_at, updated_at";

/// Column list for the `case_boost_configs` table.
const BOOST_CONFIG_COLUMNS: &str = "id, case_id, boost_key, cost_delta, chance_multiplier, \
    is_active, created_at, updated_at";

pub struct CaseRepo;

impl CaseRepo {
    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a new case.
    pub async fn create(pool: &PgPool, input: &CreateCase) -> Result<Case, sqlx::Error> {
        let query = format!(
            "INSERT INTO cases (name, base_price, is_active, timer_ends_at) \
             VALUES ($1, $2, COALESCE($3, true), $4) \
             RETURNING {CASE_COLUMNS}"
        );
        sqlx::query_as::<_, Case>(&query)
            .bind(&input.name)
            .bind(input.base_price)
            .bind(input.is_active)
            .bind(input.timer_ends_at)
            .fetch_one(pool)
            .await
    }

    /// Add a prize to a case.
    pub async fn add_prize(
        pool: &PgPool,
        case_id: DbId,
        input: &CreatePrize,
    ) -> Result<Prize, sqlx::Error> {
        let query = format!(
            "INSERT INTO case_prizes \
                (case_id, name, base_chance, reward_type, reward_amount, product_id, \
                 duration_days, sell_value, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 0), COALESCE($9, 0)) \
             RETURNING {PRIZE_COLUMNS}"
        );
        sqlx::query_as::<_, Prize>(&query)
            .bind(case_id)
            .bind(&input.name)
            .bind(input.base_chance)
            .bind(input.reward_type)
            .bind(input.reward_amount)
            .bind(input.product_id)
            .bind(input.duration_days)
            .bind(input.sell_value)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Create or replace a case's override of a boost.
    pub async fn upsert_boost_config(
        pool: &PgPool,
        case_id: DbId,
        input: &UpsertCaseBoostConfig,
    ) -> Result<CaseBoostConfig, sqlx::Error> {
        let query = format!(
            "INSERT INTO case_boost_configs \
                (case_id, boost_key, cost_delta, chance_multiplier, is_active) \
             VALUES ($1, $2, $3, $4, COALESCE($5, true)) \
             ON CONFLICT ON CONSTRAINT uq_case_boost_configs_case_key DO UPDATE SET \
                cost_delta = EXCLUDED.cost_delta, \
                chance_multiplier = EXCLUDED.chance_multiplier, \
                is_active = EXCLUDED.is_active \
             RETURNING {BOOST_CONFIG_COLUMNS}"
        );
        sqlx::query_as::<_, CaseBoostConfig>(&query)
            .bind(case_id)
            .bind(&input.boost_key)
            .bind(input.cost_delta)
            .bind(input.chance_multiplier)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Set `is_active` on a case. Returns `false` if no such case exists.
    pub async fn set_active(pool: &PgPool, id: DbId, is_active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE cases SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find a case by ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Case>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = $1");
        sqlx::query_as::<_, Case>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List a case's prizes in stored order.
    pub async fn list_prizes<'e, E>(executor: E, case_id: DbId) -> Result<Vec<Prize>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {PRIZE_COLUMNS} FROM case_prizes \
             WHERE case_id = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Prize>(&query)
            .bind(case_id)
            .fetch_all(executor)
            .await
    }

    /// List a case's boost overrides, active or not.
    pub async fn list_boost_configs<'e, E>(
        executor: E,
        case_id: DbId,
    ) -> Result<Vec<CaseBoostConfig>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {BOOST_CONFIG_COLUMNS} FROM case_boost_configs \
             WHERE case_id = $1 \
             ORDER BY boost_key"
        );
        sqlx::query_as::<_, CaseBoostConfig>(&query)
            .bind(case_id)
            .fetch_all(executor)
            .await
    }

    /// Load a case with its prizes and overrides over a single connection,
    /// so callers inside a transaction see one consistent snapshot.
    pub async fn find_definition(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<CaseDefinition>, sqlx::Error> {
        let Some(case) = Self::find_by_id(&mut *conn, id).await? else {
            return Ok(None);
        };
        let prizes = Self::list_prizes(&mut *conn, id).await?;
        let boost_configs = Self::list_boost_configs(&mut *conn, id).await?;
        Ok(Some(CaseDefinition {
            case,
            prizes,
            boost_configs,
        }))
    }
}
