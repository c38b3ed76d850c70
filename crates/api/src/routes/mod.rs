pub mod cases;
pub mod health;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /cases/{id}/open                                 open a case (POST)
/// /cases/{id}/odds                                 preview odds (GET)
///
/// /user/balance                                    balance + reconciliation
/// /user/transactions                               ledger page
/// /user/openings                                   opening history page
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/cases", cases::router())
        .nest("/user", user::router())
}
