//! CRM interaction model and DTOs.

use mimo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An interaction row from the `crm_interactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Interaction {
    pub id: DbId,
    pub prospect_id: DbId,
    pub kind: String,
    pub description: String,
    pub outcome: Option<String>,
    pub responsible: Option<String>,
    pub occurred_at: Timestamp,
}

/// DTO for logging an interaction with a prospect.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInteraction {
    pub kind: String,
    pub description: String,
    pub outcome: Option<String>,
    pub responsible: Option<String>,
    /// Defaults to now.
    pub occurred_at: Option<Timestamp>,
}

/// An interaction joined with its prospect's name, for activity feeds.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentInteraction {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub interaction: Interaction,
    pub prospect_name: String,
}
