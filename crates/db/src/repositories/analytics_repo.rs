//! Aggregate reporting queries over sales, customers, products, the CRM
//! pipeline and deliveries.
//!
//! Revenue figures only count non-cancelled sales. SQL does the grouping;
//! rates, tiers and rounding are applied in Rust with `mimo_core` rules.

use std::collections::HashMap;

use mimo_core::customers::classify_customer;
use mimo_core::metrics::{percentage, period_label, round_money, round_to};
use mimo_core::pipeline::ProspectStage;
use mimo_core::stock::{classify_stock, margin_percent};
use sqlx::SqlitePool;

use crate::models::analytics::{
    CrmReport, CustomerValue, CustomerValueRow, DailySales, DashboardKpis, DeliveryMetrics,
    DeliveryPerformance, DeliveryStatusTotal, MonthlyConversions, MonthlySalesReport,
    MonthlySummary, PaymentMethodTotal, PipelineStageTotal, ProductPerformance,
    ProductPerformanceRow, ResponsiblePerformance, ResponsibleRow, SourceConversion, SourceRow,
};
use crate::models::sale::SaleSummary;
use crate::repositories::sale_repo::SUMMARY_SELECT;
use crate::repositories::InteractionRepo;

/// Number of interactions shown in the CRM activity feed.
const RECENT_ACTIVITY_LIMIT: i64 = 20;

/// Look-back window of the delivery metrics.
const DELIVERY_WINDOW: &str = "julianday('now', '-30 days')";

/// Read-only reporting queries.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Headline dashboard numbers for the current month.
    pub async fn dashboard_kpis(pool: &SqlitePool) -> Result<DashboardKpis, sqlx::Error> {
        let active_customers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE is_active = 1")
                .fetch_one(pool)
                .await?;
        let active_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
                .fetch_one(pool)
                .await?;

        let (sales_this_month, revenue_this_month, average_ticket): (i64, f64, f64) =
            sqlx::query_as(
                "SELECT COUNT(*), COALESCE(SUM(final_amount), 0.0), COALESCE(AVG(final_amount), 0.0)
                 FROM sales
                 WHERE status <> 'cancelled'
                   AND strftime('%Y-%m', sold_at) = strftime('%Y-%m', 'now')",
            )
            .fetch_one(pool)
            .await?;

        let low_stock_products: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE is_active = 1 AND stock_current <= stock_minimum",
        )
        .fetch_one(pool)
        .await?;

        let pending_deliveries: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM deliveries WHERE status NOT IN ('delivered', 'cancelled')",
        )
        .fetch_one(pool)
        .await?;

        let average_delivery_days: f64 = sqlx::query_scalar(
            "SELECT COALESCE(AVG(julianday(delivered_at) - julianday(created_at)), 0.0)
             FROM deliveries
             WHERE delivered_at IS NOT NULL
               AND julianday(delivered_at) >= julianday('now', '-30 days')",
        )
        .fetch_one(pool)
        .await?;

        let (prospects, converted): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN stage = 'customer' THEN 1 ELSE 0 END), 0)
             FROM crm_prospects WHERE is_active = 1",
        )
        .fetch_one(pool)
        .await?;

        let average_margin: f64 = sqlx::query_scalar(
            "SELECT COALESCE(AVG((price - cost) / cost * 100.0), 0.0)
             FROM products
             WHERE is_active = 1 AND cost > 0 AND price > 0",
        )
        .fetch_one(pool)
        .await?;

        Ok(DashboardKpis {
            active_customers,
            active_products,
            sales_this_month,
            revenue_this_month: round_money(revenue_this_month),
            average_ticket: round_money(average_ticket),
            low_stock_products,
            pending_deliveries,
            average_delivery_days: round_to(average_delivery_days, 1),
            crm_conversion_rate: percentage(converted, prospects),
            average_margin: round_to(average_margin, 1),
        })
    }

    /// Sales of one calendar month with totals, daily revenue and payment
    /// method breakdown. The caller validates the period.
    pub async fn monthly_sales(
        pool: &SqlitePool,
        year: i32,
        month: u32,
    ) -> Result<MonthlySalesReport, sqlx::Error> {
        let year_str = format!("{year:04}");
        let month_str = format!("{month:02}");
        let period_filter = "strftime('%Y', sold_at) = ?1 AND strftime('%m', sold_at) = ?2";

        let query = format!(
            "{SUMMARY_SELECT}
             WHERE strftime('%Y', s.sold_at) = ?1 AND strftime('%m', s.sold_at) = ?2
             ORDER BY s.sold_at DESC, s.id DESC"
        );
        let sales = sqlx::query_as::<_, SaleSummary>(&query)
            .bind(&year_str)
            .bind(&month_str)
            .fetch_all(pool)
            .await?;

        let query = format!(
            "SELECT COUNT(*) AS sale_count,
                    COALESCE(SUM(total_amount), 0.0) AS gross_amount,
                    COALESCE(SUM(discount), 0.0) AS total_discount,
                    COALESCE(SUM(final_amount), 0.0) AS net_amount,
                    COALESCE(AVG(final_amount), 0.0) AS average_ticket,
                    COALESCE(MIN(final_amount), 0.0) AS smallest_sale,
                    COALESCE(MAX(final_amount), 0.0) AS largest_sale
             FROM sales
             WHERE status <> 'cancelled' AND {period_filter}"
        );
        let raw = sqlx::query_as::<_, MonthlySummary>(&query)
            .bind(&year_str)
            .bind(&month_str)
            .fetch_one(pool)
            .await?;
        let summary = MonthlySummary {
            gross_amount: round_money(raw.gross_amount),
            total_discount: round_money(raw.total_discount),
            net_amount: round_money(raw.net_amount),
            average_ticket: round_money(raw.average_ticket),
            ..raw
        };

        let query = format!(
            "SELECT strftime('%d', sold_at) AS day, COUNT(*) AS sale_count,
                    COALESCE(SUM(final_amount), 0.0) AS revenue
             FROM sales
             WHERE status <> 'cancelled' AND {period_filter}
             GROUP BY day
             ORDER BY day"
        );
        let by_day = sqlx::query_as::<_, DailySales>(&query)
            .bind(&year_str)
            .bind(&month_str)
            .fetch_all(pool)
            .await?;

        let query = format!(
            "SELECT payment_method, COUNT(*) AS sale_count,
                    COALESCE(SUM(final_amount), 0.0) AS total_amount
             FROM sales
             WHERE status <> 'cancelled' AND payment_method IS NOT NULL AND {period_filter}
             GROUP BY payment_method
             ORDER BY total_amount DESC"
        );
        let by_payment_method = sqlx::query_as::<_, PaymentMethodTotal>(&query)
            .bind(&year_str)
            .bind(&month_str)
            .fetch_all(pool)
            .await?;

        Ok(MonthlySalesReport {
            period: period_label(year, month),
            sales,
            summary,
            by_day,
            by_payment_method,
        })
    }

    /// Active customers ranked by lifetime value, with their tier.
    pub async fn customer_value(pool: &SqlitePool) -> Result<Vec<CustomerValue>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CustomerValueRow>(
            "SELECT c.id, c.name, c.email, c.phone,
                    COUNT(s.id) AS purchase_count,
                    COALESCE(SUM(s.final_amount), 0.0) AS total_value,
                    COALESCE(AVG(s.final_amount), 0.0) AS average_ticket,
                    MAX(s.sold_at) AS last_purchase_at
             FROM customers c
             LEFT JOIN sales s ON s.customer_id = c.id AND s.status <> 'cancelled'
             WHERE c.is_active = 1
             GROUP BY c.id
             ORDER BY total_value DESC, c.name COLLATE NOCASE",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CustomerValue {
                tier: classify_customer(row.total_value),
                id: row.id,
                name: row.name,
                email: row.email,
                phone: row.phone,
                purchase_count: row.purchase_count,
                total_value: round_money(row.total_value),
                average_ticket: round_money(row.average_ticket),
                last_purchase_at: row.last_purchase_at,
            })
            .collect())
    }

    /// Units sold and revenue per active product, best sellers first.
    pub async fn product_performance(
        pool: &SqlitePool,
    ) -> Result<Vec<ProductPerformance>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProductPerformanceRow>(
            "SELECT p.id, p.name, p.category, p.price, p.cost, p.stock_current, p.stock_minimum,
                    COALESCE(SUM(x.quantity), 0) AS units_sold,
                    COALESCE(SUM(x.subtotal), 0.0) AS revenue,
                    COUNT(DISTINCT x.sale_id) AS sale_count
             FROM products p
             LEFT JOIN (
                 SELECT si.product_id, si.sale_id, si.quantity, si.subtotal
                 FROM sale_items si
                 JOIN sales s ON s.id = si.sale_id
                 WHERE s.status <> 'cancelled'
             ) x ON x.product_id = p.id
             WHERE p.is_active = 1
             GROUP BY p.id
             ORDER BY units_sold DESC, p.name COLLATE NOCASE",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProductPerformance {
                margin_percent: margin_percent(row.price, row.cost),
                stock_status: classify_stock(row.stock_current, row.stock_minimum),
                id: row.id,
                name: row.name,
                category: row.category,
                price: row.price,
                cost: row.cost,
                stock_current: row.stock_current,
                stock_minimum: row.stock_minimum,
                units_sold: row.units_sold,
                revenue: round_money(row.revenue),
                sale_count: row.sale_count,
            })
            .collect())
    }

    /// Pipeline totals per stage, monthly conversions, lead sources and
    /// recent activity.
    pub async fn crm_report(pool: &SqlitePool) -> Result<CrmReport, sqlx::Error> {
        let stage_rows = sqlx::query_as::<_, PipelineStageTotal>(
            "SELECT stage, COUNT(*) AS prospect_count,
                    COALESCE(SUM(estimated_value), 0.0) AS total_value,
                    COALESCE(AVG(probability), 0.0) AS average_probability
             FROM crm_prospects
             WHERE is_active = 1
             GROUP BY stage",
        )
        .fetch_all(pool)
        .await?;
        let mut by_stage: HashMap<String, PipelineStageTotal> = stage_rows
            .into_iter()
            .map(|row| (row.stage.clone(), row))
            .collect();
        let pipeline = ProspectStage::ALL
            .into_iter()
            .map(|stage| match by_stage.remove(stage.as_str()) {
                Some(row) => PipelineStageTotal {
                    total_value: round_money(row.total_value),
                    average_probability: round_to(row.average_probability, 1),
                    ..row
                },
                None => PipelineStageTotal {
                    stage: stage.as_str().to_string(),
                    prospect_count: 0,
                    total_value: 0.0,
                    average_probability: 0.0,
                },
            })
            .collect();

        let conversions = sqlx::query_as::<_, MonthlyConversions>(
            "SELECT strftime('%Y-%m', converted_at) AS period, COUNT(*) AS conversions,
                    COALESCE(SUM(estimated_value), 0.0) AS converted_value
             FROM crm_prospects
             WHERE converted_at IS NOT NULL
               AND julianday(converted_at) >= julianday('now', '-12 months')
             GROUP BY period
             ORDER BY period DESC",
        )
        .fetch_all(pool)
        .await?;

        let sources = sqlx::query_as::<_, SourceRow>(
            "SELECT source, COUNT(*) AS prospect_count,
                    COALESCE(SUM(CASE WHEN stage = 'customer' THEN 1 ELSE 0 END), 0) AS converted
             FROM crm_prospects
             WHERE is_active = 1 AND source IS NOT NULL
             GROUP BY source
             ORDER BY prospect_count DESC, source",
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| SourceConversion {
            conversion_rate: percentage(row.converted, row.prospect_count),
            source: row.source,
            prospect_count: row.prospect_count,
            converted: row.converted,
        })
        .collect();

        let recent_activity = InteractionRepo::recent(pool, RECENT_ACTIVITY_LIMIT).await?;

        Ok(CrmReport {
            pipeline,
            conversions,
            sources,
            recent_activity,
        })
    }

    /// Delivery counts, ages and success rates over the last 30 days.
    pub async fn delivery_metrics(pool: &SqlitePool) -> Result<DeliveryMetrics, sqlx::Error> {
        let query = format!(
            "SELECT status, COUNT(*) AS delivery_count,
                    COALESCE(AVG(COALESCE(julianday(delivered_at), julianday('now'))
                                 - julianday(created_at)), 0.0) AS average_days
             FROM deliveries
             WHERE julianday(created_at) >= {DELIVERY_WINDOW}
             GROUP BY status
             ORDER BY status"
        );
        let by_status = sqlx::query_as::<_, DeliveryStatusTotal>(&query)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|row| DeliveryStatusTotal {
                average_days: round_to(row.average_days, 1),
                ..row
            })
            .collect();

        let query = format!(
            "SELECT COUNT(*) AS total,
                    COALESCE(SUM(CASE WHEN status = 'delivered' THEN 1 ELSE 0 END), 0) AS delivered,
                    COALESCE(SUM(CASE WHEN delivered_at IS NOT NULL AND scheduled_date IS NOT NULL
                                       AND date(delivered_at) <= scheduled_date
                                  THEN 1 ELSE 0 END), 0) AS on_time,
                    COALESCE(AVG(CASE WHEN delivered_at IS NOT NULL
                                      THEN julianday(delivered_at) - julianday(created_at) END),
                             0.0) AS average_delivery_days
             FROM deliveries
             WHERE julianday(created_at) >= {DELIVERY_WINDOW}"
        );
        let raw = sqlx::query_as::<_, DeliveryPerformance>(&query)
            .fetch_one(pool)
            .await?;
        let performance = DeliveryPerformance {
            average_delivery_days: round_to(raw.average_delivery_days, 1),
            ..raw
        };

        let query = format!(
            "SELECT responsible, COUNT(*) AS total,
                    COALESCE(SUM(CASE WHEN status = 'delivered' THEN 1 ELSE 0 END), 0) AS delivered
             FROM deliveries
             WHERE responsible IS NOT NULL AND julianday(created_at) >= {DELIVERY_WINDOW}
             GROUP BY responsible"
        );
        let mut by_responsible: Vec<ResponsiblePerformance> =
            sqlx::query_as::<_, ResponsibleRow>(&query)
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(|row| ResponsiblePerformance {
                    success_rate: percentage(row.delivered, row.total),
                    responsible: row.responsible,
                    total: row.total,
                    delivered: row.delivered,
                })
                .collect();
        by_responsible.sort_by(|a, b| {
            b.success_rate
                .total_cmp(&a.success_rate)
                .then_with(|| b.total.cmp(&a.total))
        });

        Ok(DeliveryMetrics {
            by_status,
            performance,
            by_responsible,
        })
    }
}
