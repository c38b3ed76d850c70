//! Handlers for opening cases and previewing their odds.
//!
//! All endpoints require authentication via [`AuthUser`].

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use casebox_core::boost::MAX_SELECTED_BOOSTS;
use casebox_core::error::CoreError;
use casebox_core::types::DbId;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest accepted boost key.
const MAX_BOOST_KEY_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /cases/{id}/open`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct OpenCaseRequest {
    /// Selected boost keys. Unknown keys are ignored.
    #[serde(default)]
    #[validate(custom(function = "validate_boost_keys"))]
    pub boosts: Vec<String>,
}

/// Query of `GET /cases/{id}/odds`: comma-separated boost keys.
#[derive(Debug, Default, Deserialize)]
pub struct OddsQuery {
    pub boosts: Option<String>,
}

impl OddsQuery {
    fn keys(&self) -> Vec<String> {
        self.boosts
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn validate_boost_keys(boosts: &[String]) -> Result<(), ValidationError> {
    if boosts.len() > MAX_SELECTED_BOOSTS {
        return Err(ValidationError::new("too_many_boosts"));
    }
    if boosts
        .iter()
        .any(|k| k.is_empty() || k.len() > MAX_BOOST_KEY_LEN)
    {
        return Err(ValidationError::new("invalid_boost_key"));
    }
    Ok(())
}

fn check_boosts(boosts: Vec<String>) -> AppResult<Vec<String>> {
    let request = OpenCaseRequest { boosts };
    request
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
    Ok(request.boosts)
}

// ---------------------------------------------------------------------------
// Open
// ---------------------------------------------------------------------------

/// POST /api/v1/cases/{id}/open
///
/// Charge the caller and award one prize. Returns the prize, the new
/// balance, and the opening id.
pub async fn open_case(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(case_id): Path<DbId>,
    payload: Result<Json<OpenCaseRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let boosts = check_boosts(input.boosts)?;
    let outcome = state
        .engine
        .open_case(auth.user_id, case_id, &boosts)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// GET /api/v1/cases/{id}/odds?boosts=a,b
///
/// Cost and normalised prize odds for the given boosts. Read-only.
pub async fn preview_odds(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(case_id): Path<DbId>,
    query: Result<Query<OddsQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(query) = query?;
    let boosts = check_boosts(query.keys())?;
    let preview = state.engine.preview_odds(case_id, &boosts).await?;
    Ok(Json(DataResponse { data: preview }))
}
