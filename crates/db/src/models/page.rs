//! Limit/offset pagination shared by list endpoints.

use serde::Deserialize;

/// Maximum page size.
pub const MAX_LIMIT: i64 = 100;

/// Default page size.
pub const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for paginated lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    /// Limit clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Offset, never negative.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
