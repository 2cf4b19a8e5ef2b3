//! Handlers for the `/analytics` reports. Every report is wrapped in
//! [`DataResponse`].

use axum::extract::{Query, State};
use axum::Json;
use chrono::Datelike;
use mimo_core::metrics::validate_period;
use mimo_db::models::analytics::{
    CrmReport, CustomerValue, DashboardKpis, DeliveryMetrics, MonthlySalesReport,
    ProductPerformance,
};
use mimo_db::repositories::AnalyticsRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// `?year=&month=`, defaulting to the current UTC month.
#[derive(Debug, Deserialize)]
pub struct PeriodParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/v1/analytics/kpis
pub async fn kpis(State(state): State<AppState>) -> AppResult<Json<DataResponse<DashboardKpis>>> {
    let data = AnalyticsRepo::dashboard_kpis(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/analytics/sales/monthly
pub async fn monthly_sales(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> AppResult<Json<DataResponse<MonthlySalesReport>>> {
    let today = chrono::Utc::now().date_naive();
    let year = params.year.unwrap_or(today.year());
    let month = params.month.unwrap_or(today.month());
    validate_period(year, month)?;

    let data = AnalyticsRepo::monthly_sales(&state.pool, year, month).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/analytics/customers/value
pub async fn customer_value(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CustomerValue>>>> {
    let data = AnalyticsRepo::customer_value(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/analytics/products/performance
pub async fn product_performance(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProductPerformance>>>> {
    let data = AnalyticsRepo::product_performance(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/analytics/crm
pub async fn crm(State(state): State<AppState>) -> AppResult<Json<DataResponse<CrmReport>>> {
    let data = AnalyticsRepo::crm_report(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/analytics/deliveries
pub async fn deliveries(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DeliveryMetrics>>> {
    let data = AnalyticsRepo::delivery_metrics(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}
