//! Stock-level classification and product margin math.

use serde::Serialize;

use crate::error::CoreError;
use crate::metrics::round_to;

/// Visual stock status shown next to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    /// Current stock is at or below the minimum.
    Critical,
    /// Current stock is above the minimum but within 1.5x of it.
    Low,
    Ok,
}

impl StockStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StockStatus::Critical => "critical",
            StockStatus::Low => "low",
            StockStatus::Ok => "ok",
        }
    }
}

/// Classify a product's stock against its configured minimum.
///
/// `current <= minimum` is critical, `current <= 1.5 * minimum` is low.
/// The 1.5x bound is compared as `2 * current <= 3 * minimum` to stay exact
/// on integers.
pub fn classify_stock(current: i64, minimum: i64) -> StockStatus {
    if current <= minimum {
        StockStatus::Critical
    } else if current.saturating_mul(2) <= minimum.saturating_mul(3) {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

/// Markup over cost as a percentage, rounded to 2 decimals.
///
/// Returns `0.0` when either the price or the cost is missing or not positive.
pub fn margin_percent(price: f64, cost: Option<f64>) -> f64 {
    match cost {
        Some(cost) if cost > 0.0 && price > 0.0 => round_to((price - cost) / cost * 100.0, 2),
        _ => 0.0,
    }
}

/// Apply a signed stock movement, rejecting results below zero.
pub fn apply_stock_delta(current: i64, delta: i64) -> Result<i64, CoreError> {
    let next = current
        .checked_add(delta)
        .ok_or_else(|| CoreError::Validation("Stock adjustment overflows".to_string()))?;
    if next < 0 {
        return Err(CoreError::Conflict(format!(
            "Insufficient stock: {current} available, adjustment of {delta} requested"
        )));
    }
    Ok(next)
}
