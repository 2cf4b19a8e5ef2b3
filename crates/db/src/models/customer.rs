//! Customer entity model and DTOs.

use mimo_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A customer row from the `customers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Customer {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub tax_id: Option<String>,
    pub birth_date: Option<Date>,
    pub notes: Option<String>,
    /// Sum of `final_amount` over the customer's non-cancelled sales.
    pub total_spent: f64,
    pub last_purchase_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub tax_id: Option<String>,
    pub birth_date: Option<Date>,
    pub notes: Option<String>,
}

/// DTO for updating an existing customer. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub tax_id: Option<String>,
    pub birth_date: Option<Date>,
    pub notes: Option<String>,
}

/// One sale in a customer's purchase history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PurchaseHistoryEntry {
    pub sale_id: DbId,
    pub sale_number: String,
    pub sold_at: Timestamp,
    pub final_amount: f64,
    pub status: String,
    pub item_count: i64,
    /// Comma-separated product names on the sale.
    pub products: Option<String>,
}

/// A customer whose birthday falls within the requested window.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingBirthday {
    #[serde(flatten)]
    pub customer: Customer,
    pub next_birthday: Date,
    pub days_until: i64,
}
