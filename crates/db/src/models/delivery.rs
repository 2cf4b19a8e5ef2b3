//! Delivery (kanban card) models and DTOs.

use mimo_core::kanban::ColumnInfo;
use mimo_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A delivery row from the `deliveries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Delivery {
    pub id: DbId,
    pub sale_id: DbId,
    pub address: String,
    pub scheduled_date: Option<Date>,
    pub delivered_at: Option<Timestamp>,
    pub status: String,
    pub carrier: Option<String>,
    pub tracking_code: Option<String>,
    pub shipping_fee: f64,
    pub responsible: Option<String>,
    pub priority: i64,
    pub status_changed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A delivery joined with its sale number, customer name and product names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeliveryCard {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub delivery: Delivery,
    pub sale_number: String,
    pub customer_name: Option<String>,
    pub products: Option<String>,
}

/// One column of the delivery board with its cards.
#[derive(Debug, Clone, Serialize)]
pub struct KanbanColumn {
    #[serde(flatten)]
    pub column: ColumnInfo,
    pub count: usize,
    pub cards: Vec<DeliveryCard>,
}

/// DTO for scheduling a delivery for a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDelivery {
    pub sale_id: DbId,
    /// Defaults to the sale's delivery address, then the customer's address.
    pub address: Option<String>,
    /// Defaults to the sale's delivery date.
    pub scheduled_date: Option<Date>,
    pub carrier: Option<String>,
    pub tracking_code: Option<String>,
    pub shipping_fee: Option<f64>,
    pub responsible: Option<String>,
    pub priority: Option<i64>,
}

/// DTO for updating a delivery. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDelivery {
    pub address: Option<String>,
    pub scheduled_date: Option<Date>,
    pub carrier: Option<String>,
    pub tracking_code: Option<String>,
    pub shipping_fee: Option<f64>,
    pub responsible: Option<String>,
    pub priority: Option<i64>,
}

/// DTO for moving a delivery to another kanban status.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveDelivery {
    pub status: String,
    /// Optional note recorded alongside the move.
    pub note: Option<String>,
    pub author: Option<String>,
}
