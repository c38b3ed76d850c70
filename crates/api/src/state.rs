use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::CaseOpeningEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: casebox_db::DbPool,
    /// Server configuration (read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Case-opening engine holding the injected random source.
    pub engine: Arc<CaseOpeningEngine>,
}
