//! Delivery note model and DTOs.

use mimo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A note row from the `delivery_notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeliveryNote {
    pub id: DbId,
    pub delivery_id: DbId,
    pub kind: String,
    pub body: String,
    pub author: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a note to a delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeliveryNote {
    /// Defaults to `"general"` if omitted.
    pub kind: Option<String>,
    pub body: String,
    /// Defaults to `"system"` if omitted.
    pub author: Option<String>,
}

/// DTO for editing a note's text.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDeliveryNote {
    pub body: String,
}

/// Active note counts per kind for one delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteCounts {
    pub general: i64,
    pub production: i64,
    pub delivery: i64,
}
