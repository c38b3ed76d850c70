//! Handlers for the authenticated user's balance, ledger, and opening
//! history.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use casebox_core::error::CoreError;
use casebox_db::models::page::PageQuery;
use casebox_db::repositories::{CaseOpeningRepo, LedgerRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/user/balance
///
/// Current balance together with the ledger total it must equal.
pub async fn get_balance(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let report = LedgerRepo::reconcile(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/user/transactions
///
/// Ledger rows, newest first. Supports `limit` and `offset`.
pub async fn list_transactions(
    auth: AuthUser,
    State(state): State<AppState>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(page) = page?;
    let rows = LedgerRepo::list_for_user(&state.pool, auth.user_id, &page).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/user/openings
///
/// Opening history, newest first. Supports `limit` and `offset`.
pub async fn list_openings(
    auth: AuthUser,
    State(state): State<AppState>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(page) = page?;
    let rows = CaseOpeningRepo::list_for_user(&state.pool, auth.user_id, &page).await?;
    Ok(Json(DataResponse { data: rows }))
}
