//! Default boost catalog models and DTOs.

use casebox_core::boost::{BoostTerms, DefaultBoost};
use casebox_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `boost_options` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BoostOption {
    pub id: DbId,
    pub key: String,
    pub name: String,
    pub cost_delta: Money,
    pub chance_multiplier: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&BoostOption> for DefaultBoost {
    fn from(row: &BoostOption) -> Self {
        DefaultBoost {
            key: row.key.clone(),
            terms: BoostTerms {
                cost_delta: row.cost_delta,
                chance_multiplier: row.chance_multiplier,
            },
        }
    }
}

/// DTO for adding an entry to the default catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoostOption {
    pub key: String,
    pub name: String,
    pub cost_delta: Money,
    pub chance_multiplier: f64,
}
