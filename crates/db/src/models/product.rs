//! Product entity model and DTOs.

use mimo_core::stock::{classify_stock, margin_percent, StockStatus};
use mimo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A product row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub cost: Option<f64>,
    pub stock_current: i64,
    pub stock_minimum: i64,
    pub stock_maximum: Option<i64>,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A product enriched with its derived stock status and margin.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
    pub margin_percent: f64,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let stock_status = classify_stock(product.stock_current, product.stock_minimum);
        let margin_percent = margin_percent(product.price, product.cost);
        Self {
            product,
            stock_status,
            margin_percent,
        }
    }
}

/// DTO for creating a new product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub cost: Option<f64>,
    /// Defaults to 0 if omitted.
    pub stock_current: Option<i64>,
    /// Defaults to 0 if omitted.
    pub stock_minimum: Option<i64>,
    pub stock_maximum: Option<i64>,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
}

/// DTO for updating an existing product. All fields are optional.
///
/// Stock on hand is changed through [`AdjustStock`], not here.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub stock_minimum: Option<i64>,
    pub stock_maximum: Option<i64>,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
}

/// Signed stock movement (`+` restock, `-` write-off).
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustStock {
    pub delta: i64,
}
