//! Sale header and line-item models and DTOs.

use mimo_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A sale header row from the `sales` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sale {
    pub id: DbId,
    pub customer_id: Option<DbId>,
    pub sale_number: String,
    pub sold_at: Timestamp,
    pub total_amount: f64,
    pub discount: f64,
    pub final_amount: f64,
    pub status: String,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub seller: Option<String>,
    pub origin: String,
    pub delivery_date: Option<Date>,
    pub delivery_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A sale header joined with its customer's name and line count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SaleSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub sale: Sale,
    pub customer_name: Option<String>,
    pub item_count: i64,
}

/// A line item row from the `sale_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SaleItem {
    pub id: DbId,
    pub sale_id: DbId,
    pub product_id: DbId,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
    pub production_status: String,
    pub produced_at: Option<Timestamp>,
    pub production_responsible: Option<String>,
}

/// A line item joined with its product name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SaleItemDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: SaleItem,
    pub product_name: String,
}

/// A sale with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub summary: SaleSummary,
    pub items: Vec<SaleItemDetail>,
}

/// One line of a [`CreateSale`] request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaleItem {
    pub product_id: DbId,
    pub quantity: i64,
    /// Defaults to the product's current price if omitted.
    pub unit_price: Option<f64>,
}

/// DTO for registering a new sale.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSale {
    pub customer_id: Option<DbId>,
    /// Defaults to 0 if omitted.
    pub discount: Option<f64>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub seller: Option<String>,
    /// Defaults to `"system"` if omitted.
    pub origin: Option<String>,
    pub delivery_date: Option<Date>,
    pub delivery_address: Option<String>,
    pub items: Vec<CreateSaleItem>,
}

/// Filters for listing sales.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub customer_id: Option<DbId>,
    pub status: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// DTO for changing a line item's production status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemProduction {
    pub status: String,
    pub responsible: Option<String>,
}

/// Per-sale production counts used to place sales on the order board.
#[derive(Debug, Clone, FromRow)]
pub struct SaleBoardRow {
    pub id: DbId,
    pub status: String,
    pub delivery_date: Option<Date>,
    pub total_items: i64,
    pub ready_items: i64,
}
