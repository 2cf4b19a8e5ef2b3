//! Sale lifecycle, totals, numbering, and line-item production progress.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::metrics::{percentage, round_money};
use crate::types::{DbId, Timestamp};
use crate::validation::validate_non_negative;

/// Lifecycle status of a sale header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

impl SaleStatus {
    pub const ALL: [SaleStatus; 4] = [
        SaleStatus::Pending,
        SaleStatus::Confirmed,
        SaleStatus::Delivered,
        SaleStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Confirmed => "confirmed",
            SaleStatus::Delivered => "delivered",
            SaleStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid sale status '{value}'. Must be one of: {}",
                    Self::ALL.map(|s| s.as_str()).join(", ")
                ))
            })
    }

    /// Only pending sales can be confirmed.
    pub fn confirm(self) -> Result<SaleStatus, CoreError> {
        match self {
            SaleStatus::Pending => Ok(SaleStatus::Confirmed),
            other => Err(CoreError::Conflict(format!(
                "Only pending sales can be confirmed (sale is {})",
                other.as_str()
            ))),
        }
    }

    /// Pending and confirmed sales can be cancelled.
    pub fn cancel(self) -> Result<SaleStatus, CoreError> {
        match self {
            SaleStatus::Pending | SaleStatus::Confirmed => Ok(SaleStatus::Cancelled),
            other => Err(CoreError::Conflict(format!(
                "Sale is {} and cannot be cancelled",
                other.as_str()
            ))),
        }
    }
}

/// One priced line of a sale, before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleLine {
    pub product_id: DbId,
    pub quantity: i64,
    pub unit_price: f64,
}

impl SaleLine {
    pub fn subtotal(&self) -> f64 {
        round_money(self.quantity as f64 * self.unit_price)
    }
}

/// Header amounts derived from a sale's lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SaleTotals {
    pub total_amount: f64,
    pub discount: f64,
    pub final_amount: f64,
}

/// Compute `total = sum(quantity * unit_price)` and `final = total - discount`.
///
/// Rejects empty sales, non-positive quantities, negative prices, and
/// discounts outside `[0, total]`.
pub fn compute_totals(lines: &[SaleLine], discount: f64) -> Result<SaleTotals, CoreError> {
    if lines.is_empty() {
        return Err(CoreError::Validation(
            "A sale must contain at least one item".to_string(),
        ));
    }

    for line in lines {
        if line.quantity <= 0 {
            return Err(CoreError::Validation(format!(
                "Quantity for product {} must be positive, got {}",
                line.product_id, line.quantity
            )));
        }
        validate_non_negative("unit_price", line.unit_price)?;
    }
    validate_non_negative("discount", discount)?;

    let total_amount = round_money(lines.iter().map(SaleLine::subtotal).sum());
    let discount = round_money(discount);
    if discount > total_amount {
        return Err(CoreError::Validation(format!(
            "Discount {discount:.2} exceeds sale total {total_amount:.2}"
        )));
    }

    Ok(SaleTotals {
        total_amount,
        discount,
        final_amount: round_money(total_amount - discount),
    })
}

/// Build a human-facing sale number: `VD` + UTC timestamp + 4 random hex chars.
pub fn generate_sale_number(now: Timestamp) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("VD{}-{}", now.format("%Y%m%d%H%M%S"), &suffix[..4].to_uppercase())
}

/// [`generate_sale_number`] at the current time.
pub fn next_sale_number() -> String {
    generate_sale_number(Utc::now())
}

/// Production status of a single sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemProductionStatus {
    ToProduce,
    InProduction,
    Ready,
}

impl ItemProductionStatus {
    pub const ALL: [ItemProductionStatus; 3] = [
        ItemProductionStatus::ToProduce,
        ItemProductionStatus::InProduction,
        ItemProductionStatus::Ready,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemProductionStatus::ToProduce => "to_produce",
            ItemProductionStatus::InProduction => "in_production",
            ItemProductionStatus::Ready => "ready",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid production status '{value}'. Must be one of: {}",
                    Self::ALL.map(|s| s.as_str()).join(", ")
                ))
            })
    }
}

/// Production completion of a sale's line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionProgress {
    pub total_items: i64,
    pub ready_items: i64,
    pub pending_items: i64,
    pub percent_complete: f64,
    pub all_ready: bool,
}

pub fn production_progress(total_items: i64, ready_items: i64) -> ProductionProgress {
    let ready_items = ready_items.clamp(0, total_items.max(0));
    ProductionProgress {
        total_items,
        ready_items,
        pending_items: total_items - ready_items,
        percent_complete: percentage(ready_items, total_items),
        all_ready: total_items > 0 && ready_items == total_items,
    }
}
