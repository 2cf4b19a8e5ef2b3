//! Aggregate report shapes produced by `AnalyticsRepo`.
//!
//! `*Row` types map straight onto grouped SQL results. The report structs
//! wrap them with values derived in Rust (tiers, stock status, rates).

use mimo_core::customers::CustomerTier;
use mimo_core::stock::StockStatus;
use mimo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::interaction::RecentInteraction;
use super::sale::SaleSummary;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardKpis {
    pub active_customers: i64,
    pub active_products: i64,
    /// Non-cancelled sales in the current calendar month.
    pub sales_this_month: i64,
    pub revenue_this_month: f64,
    pub average_ticket: f64,
    /// Active products at or below their minimum stock.
    pub low_stock_products: i64,
    /// Deliveries neither delivered nor cancelled.
    pub pending_deliveries: i64,
    /// Mean days from creation to delivery over the last 30 days.
    pub average_delivery_days: f64,
    pub crm_conversion_rate: f64,
    pub average_margin: f64,
}

/// Totals for one month of sales.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct MonthlySummary {
    pub sale_count: i64,
    pub gross_amount: f64,
    pub total_discount: f64,
    pub net_amount: f64,
    pub average_ticket: f64,
    pub smallest_sale: f64,
    pub largest_sale: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailySales {
    /// Day of month, `"01"` to `"31"`.
    pub day: String,
    pub sale_count: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentMethodTotal {
    pub payment_method: String,
    pub sale_count: i64,
    pub total_amount: f64,
}

/// Monthly sales report.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySalesReport {
    /// `MM/YYYY`.
    pub period: String,
    pub sales: Vec<SaleSummary>,
    pub summary: MonthlySummary,
    pub by_day: Vec<DailySales>,
    pub by_payment_method: Vec<PaymentMethodTotal>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomerValueRow {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub purchase_count: i64,
    pub total_value: f64,
    pub average_ticket: f64,
    pub last_purchase_at: Option<Timestamp>,
}

/// One customer in the value analysis, with its tier.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerValue {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub purchase_count: i64,
    pub total_value: f64,
    pub average_ticket: f64,
    pub last_purchase_at: Option<Timestamp>,
    pub tier: CustomerTier,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductPerformanceRow {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub cost: Option<f64>,
    pub stock_current: i64,
    pub stock_minimum: i64,
    pub units_sold: i64,
    pub revenue: f64,
    pub sale_count: i64,
}

/// Sales performance of one product, with margin and stock status.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPerformance {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub cost: Option<f64>,
    pub stock_current: i64,
    pub stock_minimum: i64,
    pub units_sold: i64,
    pub revenue: f64,
    pub sale_count: i64,
    pub margin_percent: f64,
    pub stock_status: StockStatus,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PipelineStageTotal {
    pub stage: String,
    pub prospect_count: i64,
    pub total_value: f64,
    pub average_probability: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonthlyConversions {
    /// `YYYY-MM`.
    pub period: String,
    pub conversions: i64,
    pub converted_value: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SourceRow {
    pub source: String,
    pub prospect_count: i64,
    pub converted: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceConversion {
    pub source: String,
    pub prospect_count: i64,
    pub converted: i64,
    pub conversion_rate: f64,
}

/// CRM pipeline report.
#[derive(Debug, Clone, Serialize)]
pub struct CrmReport {
    pub pipeline: Vec<PipelineStageTotal>,
    /// Conversions over the last 12 months, newest first.
    pub conversions: Vec<MonthlyConversions>,
    pub sources: Vec<SourceConversion>,
    pub recent_activity: Vec<RecentInteraction>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeliveryStatusTotal {
    pub status: String,
    pub delivery_count: i64,
    /// Mean age in days; open deliveries are measured up to now.
    pub average_days: f64,
}

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct DeliveryPerformance {
    pub total: i64,
    pub delivered: i64,
    /// Delivered on or before the scheduled date.
    pub on_time: i64,
    pub average_delivery_days: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ResponsibleRow {
    pub responsible: String,
    pub total: i64,
    pub delivered: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponsiblePerformance {
    pub responsible: String,
    pub total: i64,
    pub delivered: i64,
    pub success_rate: f64,
}

/// Delivery board metrics over the last 30 days.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryMetrics {
    pub by_status: Vec<DeliveryStatusTotal>,
    pub performance: DeliveryPerformance,
    pub by_responsible: Vec<ResponsiblePerformance>,
}
