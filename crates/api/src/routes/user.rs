//! Route definitions for the authenticated user's own resources.

use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user`.
///
/// ```text
/// GET    /balance         -> get_balance
/// GET    /transactions    -> list_transactions
/// GET    /openings        -> list_openings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/balance", get(user::get_balance))
        .route("/transactions", get(user::list_transactions))
        .route("/openings", get(user::list_openings))
}
