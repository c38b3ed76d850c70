//! The `open_case` flow and its read-only odds preview.
//!
//! An opening runs entirely on one database transaction:
//!
//! 1. lock the user's balance row (`FOR UPDATE`)
//! 2. load and validate the case (active, not expired, has prizes)
//! 3. resolve boosts and compute the total cost
//! 4. check funds
//! 5. draw a prize
//! 6. debit the balance and append the ledger row
//! 7. record the opening history
//!
//! Any failure drops the transaction, so no partial state is observable.
//! The row lock serialises concurrent openings by the same user.

use std::sync::Arc;

use casebox_core::boost::{resolve_boosts, AppliedBoost, DefaultBoost, ResolvedBoosts};
use casebox_core::cost::{ensure_funds, total_cost, InsufficientFunds};
use casebox_core::random::RandomSource;
use casebox_core::selection::{normalized_chances, select_prize};
use casebox_core::types::{DbId, Money, Timestamp};
use casebox_db::models::balance_transaction::TransactionType;
use casebox_db::models::case::{CaseDefinition, Prize};
use casebox_db::models::case_opening::CaseOpeningHistory;
use casebox_db::repositories::{BoostRepo, CaseOpeningRepo, CaseRepo, LedgerError, LedgerRepo};
use casebox_db::DbPool;
use chrono::Utc;
use serde::Serialize;
use sqlx::PgConnection;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a case could not be opened (or previewed).
#[derive(Debug, thiserror::Error)]
pub enum OpenCaseError {
    #[error("Case {case_id} not found")]
    CaseNotFound { case_id: DbId },

    #[error("Case {case_id} is not active")]
    CaseInactive { case_id: DbId },

    #[error("Case {case_id} expired at {ended_at}")]
    CaseExpired { case_id: DbId, ended_at: Timestamp },

    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),

    #[error("Case {case_id} has no prizes configured")]
    NoPrizesConfigured { case_id: DbId },

    /// Boost deltas brought the charge to zero or below, which the ledger
    /// cannot record.
    #[error("Case {case_id} resolved to a non-positive cost {total_cost}")]
    InvalidTotalCost { case_id: DbId, total_cost: Money },

    #[error("User {user_id} not found")]
    UserNotFound { user_id: DbId },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl OpenCaseError {
    /// Translate a ledger failure during the debit of an opening.
    fn from_ledger(err: LedgerError, case_id: DbId) -> Self {
        match err {
            LedgerError::UserNotFound { user_id } => Self::UserNotFound { user_id },
            LedgerError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds(InsufficientFunds { balance, required })
            }
            LedgerError::InvalidAmount(total_cost) => Self::InvalidTotalCost {
                case_id,
                total_cost,
            },
            LedgerError::Database(err) => Self::Persistence(err),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A completed opening.
#[derive(Debug, Clone, Serialize)]
pub struct OpeningOutcome {
    pub opening_id: DbId,
    pub balance_transaction_id: DbId,
    pub prize: Prize,
    pub total_cost: Money,
    pub new_balance: Money,
    pub chance_multiplier: f64,
    pub applied_boosts: Vec<AppliedBoost>,
    /// Selected keys that had no effect.
    pub ignored_boosts: Vec<String>,
    pub opened_at: Timestamp,
}

/// Normalised odds of a single prize.
#[derive(Debug, Clone, Serialize)]
pub struct PrizeOdds {
    pub prize_id: DbId,
    pub name: String,
    pub base_chance: f64,
    pub chance: f64,
}

/// What an opening with the given boosts would cost and how likely each
/// prize would be.
#[derive(Debug, Clone, Serialize)]
pub struct OddsPreview {
    pub case_id: DbId,
    pub total_cost: Money,
    pub chance_multiplier: f64,
    pub prizes: Vec<PrizeOdds>,
    pub applied_boosts: Vec<AppliedBoost>,
    pub ignored_boosts: Vec<String>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs case openings against an injected pool and random source.
pub struct CaseOpeningEngine {
    pool: DbPool,
    random: Arc<dyn RandomSource>,
}

impl CaseOpeningEngine {
    pub fn new(pool: DbPool, random: Arc<dyn RandomSource>) -> Self {
        Self { pool, random }
    }

    /// Open a case for a user, charging base price plus boosts and awarding
    /// exactly one prize.
    pub async fn open_case<S: AsRef<str>>(
        &self,
        user_id: DbId,
        case_id: DbId,
        selected_boosts: &[S],
    ) -> Result<OpeningOutcome, OpenCaseError> {
        let mut tx = self.pool.begin().await?;

        let balance = LedgerRepo::lock_balance(&mut tx, user_id)
            .await?
            .ok_or(OpenCaseError::UserNotFound { user_id })?;

        let mut definition = load_valid_definition(&mut tx, case_id).await?;
        let boosts = load_and_resolve(&mut tx, &definition, selected_boosts).await?;

        let cost = total_cost(definition.case.base_price, &boosts);
        if cost <= Money::ZERO {
            tracing::error!(case_id, total_cost = %cost, "Case resolved to a non-positive cost");
            return Err(OpenCaseError::InvalidTotalCost {
                case_id,
                total_cost: cost,
            });
        }
        ensure_funds(balance, cost)?;

        let selection = select_prize(
            &definition.base_chances(),
            boosts.chance_multiplier,
            self.random.as_ref(),
        )
        .map_err(|_| OpenCaseError::NoPrizesConfigured { case_id })?;
        if selection.used_fallback {
            tracing::warn!(
                case_id,
                draw = selection.draw,
                "Cumulative chances fell short of the draw, used uniform fallback",
            );
        }
        let prize = definition.prizes.swap_remove(selection.index);

        let description = format!("Opened case \"{}\"", definition.case.name);
        let entry = LedgerRepo::debit(
            &mut tx,
            user_id,
            cost,
            TransactionType::OpenCase,
            &description,
        )
        .await
        .map_err(|err| OpenCaseError::from_ledger(err, case_id))?;

        let opening: CaseOpeningHistory =
            CaseOpeningRepo::record(&mut tx, user_id, case_id, prize.id, entry.transaction.id)
                .await?;

        tx.commit().await?;

        tracing::info!(
            user_id,
            case_id,
            opening_id = opening.id,
            prize_id = prize.id,
            total_cost = %cost,
            new_balance = %entry.balance_after,
            "Case opened",
        );

        Ok(OpeningOutcome {
            opening_id: opening.id,
            balance_transaction_id: entry.transaction.id,
            prize,
            total_cost: cost,
            new_balance: entry.balance_after,
            chance_multiplier: boosts.chance_multiplier,
            applied_boosts: boosts.applied,
            ignored_boosts: boosts.ignored,
            opened_at: opening.created_at,
        })
    }

    /// Compute cost and normalised odds without drawing or mutating anything.
    pub async fn preview_odds<S: AsRef<str>>(
        &self,
        case_id: DbId,
        selected_boosts: &[S],
    ) -> Result<OddsPreview, OpenCaseError> {
        let mut conn = self.pool.acquire().await?;

        let definition = load_valid_definition(&mut conn, case_id).await?;
        let boosts = load_and_resolve(&mut conn, &definition, selected_boosts).await?;

        let chances = normalized_chances(&definition.base_chances(), boosts.chance_multiplier);
        let prizes = definition
            .prizes
            .iter()
            .zip(chances)
            .map(|(prize, chance)| PrizeOdds {
                prize_id: prize.id,
                name: prize.name.clone(),
                base_chance: prize.base_chance,
                chance,
            })
            .collect();

        Ok(OddsPreview {
            case_id,
            total_cost: total_cost(definition.case.base_price, &boosts),
            chance_multiplier: boosts.chance_multiplier,
            prizes,
            applied_boosts: boosts.applied,
            ignored_boosts: boosts.ignored,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_valid_definition(
    conn: &mut PgConnection,
    case_id: DbId,
) -> Result<CaseDefinition, OpenCaseError> {
    let definition = CaseRepo::find_definition(conn, case_id)
        .await?
        .ok_or(OpenCaseError::CaseNotFound { case_id })?;
    validate_definition(&definition, Utc::now())?;
    Ok(definition)
}

/// Check that a loaded case can be opened at `now`.
fn validate_definition(definition: &CaseDefinition, now: Timestamp) -> Result<(), OpenCaseError> {
    let case = &definition.case;
    if !case.is_active {
        return Err(OpenCaseError::CaseInactive { case_id: case.id });
    }
    if case.is_expired_at(now) {
        return Err(OpenCaseError::CaseExpired {
            case_id: case.id,
            // is_expired_at only holds when a timer is set.
            ended_at: case.timer_ends_at.unwrap_or(now),
        });
    }
    if definition.prizes.is_empty() {
        tracing::error!(case_id = case.id, "Active case has no prizes configured");
        return Err(OpenCaseError::NoPrizesConfigured { case_id: case.id });
    }
    Ok(())
}

async fn load_and_resolve<S: AsRef<str>>(
    conn: &mut PgConnection,
    definition: &CaseDefinition,
    selected_boosts: &[S],
) -> Result<ResolvedBoosts, OpenCaseError> {
    let defaults: Vec<DefaultBoost> = BoostRepo::list_defaults(&mut *conn)
        .await?
        .iter()
        .map(DefaultBoost::from)
        .collect();

    let resolved = resolve_boosts(selected_boosts, &definition.boost_overrides(), &defaults);
    if !resolved.ignored.is_empty() {
        tracing::warn!(
            case_id = definition.case.id,
            ignored = ?resolved.ignored,
            "Ignoring unknown boost selections",
        );
    }
    Ok(resolved)
}
