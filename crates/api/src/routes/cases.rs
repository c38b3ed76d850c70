//! Route definitions for the `/cases` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::cases;
use crate::state::AppState;

/// Routes mounted at `/cases`.
///
/// ```text
/// POST   /{id}/open       -> open_case
/// GET    /{id}/odds       -> preview_odds
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/open", post(cases::open_case))
        .route("/{id}/odds", get(cases::preview_odds))
}
