//! Case, prize, and per-case boost override models.

use casebox_core::boost::{BoostTerms, CaseBoostOverride};
use casebox_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Case
// ---------------------------------------------------------------------------

/// A row from the `cases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Case {
    pub id: DbId,
    pub name: String,
    pub base_price: Money,
    pub is_active: bool,
    pub timer_ends_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Case {
    /// `true` when a timer is set and its end time is not after `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.timer_ends_at.is_some_and(|ends_at| ends_at <= now)
    }
}

/// DTO for creating a case.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCase {
    pub name: String,
    pub base_price: Money,
    pub is_active: Option<bool>,
    pub timer_ends_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Prize
// ---------------------------------------------------------------------------

/// What a prize pays out. Stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    /// GH credited on claim (`reward_amount`).
    Currency,
    /// Time-limited product grant (`product_id`, `duration_days`).
    Product,
}

/// A row from the `case_prizes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prize {
    pub id: DbId,
    pub case_id: DbId,
    pub name: String,
    pub base_chance: f64,
    pub reward_type: RewardType,
    pub reward_amount: Option<Money>,
    pub product_id: Option<DbId>,
    pub duration_days: Option<i32>,
    pub sell_value: Money,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a prize to a case.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrize {
    pub name: String,
    pub base_chance: f64,
    pub reward_type: RewardType,
    pub reward_amount: Option<Money>,
    pub product_id: Option<DbId>,
    pub duration_days: Option<i32>,
    pub sell_value: Option<Money>,
    pub sort_order: Option<i32>,
}

// ---------------------------------------------------------------------------
// Boost override
// ---------------------------------------------------------------------------

/// A row from the `case_boost_configs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CaseBoostConfig {
    pub id: DbId,
    pub case_id: DbId,
    pub boost_key: String,
    pub cost_delta: Money,
    pub chance_multiplier: f64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&CaseBoostConfig> for CaseBoostOverride {
    fn from(row: &CaseBoostConfig) -> Self {
        CaseBoostOverride {
            key: row.boost_key.clone(),
            terms: BoostTerms {
                cost_delta: row.cost_delta,
                chance_multiplier: row.chance_multiplier,
            },
            is_active: row.is_active,
        }
    }
}

/// DTO for creating or replacing a case's override of a boost.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertCaseBoostConfig {
    pub boost_key: String,
    pub cost_delta: Money,
    pub chance_multiplier: f64,
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Everything the opening engine needs to know about a case, loaded in one
/// place.
#[derive(Debug, Clone, Serialize)]
pub struct CaseDefinition {
    pub case: Case,
    /// Prizes in stored order (`sort_order`, then `id`).
    pub prizes: Vec<Prize>,
    pub boost_configs: Vec<CaseBoostConfig>,
}

impl CaseDefinition {
    /// Base chances in prize order.
    pub fn base_chances(&self) -> Vec<f64> {
        self.prizes.iter().map(|p| p.base_chance).collect()
    }

    pub fn boost_overrides(&self) -> Vec<CaseBoostOverride> {
        self.boost_configs.iter().map(CaseBoostOverride::from).collect()
    }
}
