//! Integration tests for the reporting queries.

mod common;

use chrono::{Datelike, Utc};
use mimo_core::customers::CustomerTier;
use mimo_core::kanban::DeliveryStatus;
use mimo_core::pipeline::ProspectStage;
use mimo_core::stock::StockStatus;
use mimo_db::models::delivery::CreateDelivery;
use mimo_db::models::prospect::{CreateProspect, UpdateProspect};
use mimo_db::repositories::{AnalyticsRepo, DeliveryRepo, ProspectRepo, SaleRepo};
use sqlx::SqlitePool;

fn prospect(name: &str, source: &str, value: f64) -> CreateProspect {
    CreateProspect {
        name: name.to_string(),
        email: None,
        phone: None,
        whatsapp: None,
        company: None,
        job_title: None,
        source: Some(source.to_string()),
        estimated_value: Some(value),
        stage: None,
        notes: None,
        owner: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_kpis_on_empty_database(pool: SqlitePool) {
    let kpis = AnalyticsRepo::dashboard_kpis(&pool).await.unwrap();
    assert_eq!(kpis.active_customers, 0);
    assert_eq!(kpis.sales_this_month, 0);
    assert_eq!(kpis.revenue_this_month, 0.0);
    assert_eq!(kpis.average_ticket, 0.0);
    assert_eq!(kpis.crm_conversion_rate, 0.0);
    assert_eq!(kpis.average_margin, 0.0);
    assert_eq!(kpis.average_delivery_days, 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_kpis_exclude_cancelled_sales(pool: SqlitePool) {
    let customer = common::customer(&pool, "Ana").await;
    let cake = common::product(&pool, "Cake", 100.0, 10).await;
    common::sale(&pool, Some(customer.id), &[(cake.id, 1)]).await;
    common::sale(&pool, Some(customer.id), &[(cake.id, 2)]).await;
    let cancelled = common::sale(&pool, Some(customer.id), &[(cake.id, 5)]).await;
    SaleRepo::cancel(&pool, cancelled.summary.sale.id).await.unwrap();

    let kpis = AnalyticsRepo::dashboard_kpis(&pool).await.unwrap();
    assert_eq!(kpis.active_customers, 1);
    assert_eq!(kpis.active_products, 1);
    assert_eq!(kpis.sales_this_month, 2);
    assert_eq!(kpis.revenue_this_month, 300.0);
    assert_eq!(kpis.average_ticket, 150.0);
    // Cost is half the price: 100% markup.
    assert_eq!(kpis.average_margin, 100.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_monthly_report_for_current_month(pool: SqlitePool) {
    let cake = common::product(&pool, "Cake", 20.0, 50).await;
    common::sale(&pool, None, &[(cake.id, 1)]).await;
    common::sale(&pool, None, &[(cake.id, 3)]).await;

    let now = Utc::now();
    let report = AnalyticsRepo::monthly_sales(&pool, now.year(), now.month())
        .await
        .unwrap();
    assert_eq!(report.period, format!("{:02}/{}", now.month(), now.year()));
    assert_eq!(report.sales.len(), 2);
    assert_eq!(report.summary.sale_count, 2);
    assert_eq!(report.summary.net_amount, 80.0);
    assert_eq!(report.summary.smallest_sale, 20.0);
    assert_eq!(report.summary.largest_sale, 60.0);
    assert_eq!(report.by_day.len(), 1);
    assert_eq!(report.by_payment_method[0].payment_method, "pix");
    assert_eq!(report.by_payment_method[0].sale_count, 2);

    let empty = AnalyticsRepo::monthly_sales(&pool, 2001, 1).await.unwrap();
    assert!(empty.sales.is_empty());
    assert_eq!(empty.summary.sale_count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_customer_value_tiers(pool: SqlitePool) {
    let big = common::customer(&pool, "Big").await;
    let small = common::customer(&pool, "Small").await;
    common::customer(&pool, "Idle").await;
    let cake = common::product(&pool, "Cake", 600.0, 10).await;
    let candy = common::product(&pool, "Candy", 50.0, 10).await;
    common::sale(&pool, Some(big.id), &[(cake.id, 2)]).await;
    common::sale(&pool, Some(small.id), &[(candy.id, 3)]).await;

    let rows = AnalyticsRepo::customer_value(&pool).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].name, "Big");
    assert_eq!(rows[0].tier, CustomerTier::Vip);
    assert_eq!(rows[0].total_value, 1200.0);
    assert_eq!(rows[1].tier, CustomerTier::Regular);
    assert_eq!(rows[2].tier, CustomerTier::New);
    assert_eq!(rows[2].purchase_count, 0);
    assert!(rows[2].last_purchase_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_product_performance(pool: SqlitePool) {
    let cake = common::product(&pool, "Cake", 40.0, 3).await;
    let pie = common::product(&pool, "Pie", 10.0, 20).await;
    common::sale(&pool, None, &[(cake.id, 1), (pie.id, 4)]).await;
    common::sale(&pool, None, &[(pie.id, 2)]).await;

    let rows = AnalyticsRepo::product_performance(&pool).await.unwrap();
    assert_eq!(rows[0].name, "Pie");
    assert_eq!(rows[0].units_sold, 6);
    assert_eq!(rows[0].revenue, 60.0);
    assert_eq!(rows[0].sale_count, 2);
    assert_eq!(rows[0].margin_percent, 100.0);
    assert_eq!(rows[1].name, "Cake");
    // 3 - 1 = 2 left against a minimum of 2.
    assert_eq!(rows[1].stock_status, StockStatus::Critical);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_crm_report(pool: SqlitePool) {
    let won = ProspectRepo::create(&pool, &prospect("Won", "instagram", 500.0), ProspectStage::Prospect)
        .await
        .unwrap();
    ProspectRepo::create(&pool, &prospect("Open", "instagram", 200.0), ProspectStage::Contact)
        .await
        .unwrap();
    ProspectRepo::create(&pool, &prospect("Ref", "referral", 100.0), ProspectStage::Prospect)
        .await
        .unwrap();
    ProspectRepo::move_stage(&pool, won.id, ProspectStage::Customer)
        .await
        .unwrap();

    let report = AnalyticsRepo::crm_report(&pool).await.unwrap();
    let stages: Vec<&str> = report.pipeline.iter().map(|s| s.stage.as_str()).collect();
    assert_eq!(stages, vec!["prospect", "contact", "negotiation", "customer"]);
    assert_eq!(report.pipeline[0].prospect_count, 1);
    assert_eq!(report.pipeline[2].prospect_count, 0);
    assert_eq!(report.pipeline[3].total_value, 500.0);
    assert_eq!(report.pipeline[3].average_probability, 100.0);

    assert_eq!(report.conversions.len(), 1);
    assert_eq!(report.conversions[0].conversions, 1);

    assert_eq!(report.sources[0].source, "instagram");
    assert_eq!(report.sources[0].prospect_count, 2);
    assert_eq!(report.sources[0].conversion_rate, 50.0);

    let kpis = AnalyticsRepo::dashboard_kpis(&pool).await.unwrap();
    assert_eq!(kpis.crm_conversion_rate, 33.3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_crm_conversions_keep_their_month_after_edits(pool: SqlitePool) {
    let lead = ProspectRepo::create(&pool, &prospect("Bia", "instagram", 300.0), ProspectStage::Negotiation)
        .await
        .unwrap();
    let (converted, _) = ProspectRepo::convert_to_customer(&pool, lead.id, &common::new_customer("Bia"))
        .await
        .unwrap()
        .unwrap();
    assert!(converted.converted_at.is_some());

    sqlx::query(
        "UPDATE crm_prospects
         SET converted_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', 'start of month', '-2 months')
         WHERE id = ?1",
    )
    .bind(lead.id)
    .execute(&pool)
    .await
    .unwrap();
    let expected: String = sqlx::query_scalar("SELECT strftime('%Y-%m', 'now', 'start of month', '-2 months')")
        .fetch_one(&pool)
        .await
        .unwrap();

    let edit = UpdateProspect {
        name: None,
        email: None,
        phone: None,
        whatsapp: None,
        company: None,
        job_title: None,
        source: None,
        estimated_value: None,
        notes: Some("Asked for a catalogue".to_string()),
        owner: None,
    };
    ProspectRepo::update(&pool, lead.id, &edit).await.unwrap().unwrap();
    assert!(ProspectRepo::deactivate(&pool, lead.id).await.unwrap());

    let report = AnalyticsRepo::crm_report(&pool).await.unwrap();
    assert_eq!(report.conversions.len(), 1);
    assert_eq!(report.conversions[0].period, expected);
    assert_eq!(report.conversions[0].conversions, 1);
    assert_eq!(report.conversions[0].converted_value, 300.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delivery_metrics(pool: SqlitePool) {
    let cake = common::product(&pool, "Cake", 10.0, 10).await;
    let sale = common::sale(&pool, None, &[(cake.id, 1)]).await;
    let create = |responsible: &str| CreateDelivery {
        sale_id: sale.summary.sale.id,
        address: Some("Rua C".to_string()),
        scheduled_date: None,
        carrier: None,
        tracking_code: None,
        shipping_fee: None,
        responsible: Some(responsible.to_string()),
        priority: None,
    };
    let done = DeliveryRepo::create(&pool, &create("Rafa")).await.unwrap();
    DeliveryRepo::create(&pool, &create("Rafa")).await.unwrap();
    DeliveryRepo::create(&pool, &create("Tati")).await.unwrap();
    DeliveryRepo::move_status(&pool, done.id, DeliveryStatus::Delivered, None, None)
        .await
        .unwrap();

    let metrics = AnalyticsRepo::delivery_metrics(&pool).await.unwrap();
    assert_eq!(metrics.performance.total, 3);
    assert_eq!(metrics.performance.delivered, 1);
    assert_eq!(metrics.by_status.len(), 2);
    assert_eq!(metrics.by_responsible[0].responsible, "Rafa");
    assert_eq!(metrics.by_responsible[0].success_rate, 50.0);
    assert_eq!(metrics.by_responsible[1].success_rate, 0.0);

    let kpis = AnalyticsRepo::dashboard_kpis(&pool).await.unwrap();
    assert_eq!(kpis.pending_deliveries, 2);
}
