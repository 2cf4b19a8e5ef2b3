//! Query parameter types shared by several handler modules.

use serde::Deserialize;

/// `?limit=&offset=`. Clamped with `mimo_core::pagination` before use.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?include_inactive=true` on list endpoints of soft-deleted entities.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}
