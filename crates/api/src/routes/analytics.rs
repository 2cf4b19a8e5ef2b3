//! Route definitions for the `/analytics` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Routes mounted at `/analytics`.
///
/// ```text
/// GET /kpis                   -> kpis
/// GET /sales/monthly          -> monthly_sales (?year=&month=)
/// GET /customers/value        -> customer_value
/// GET /products/performance   -> product_performance
/// GET /crm                    -> crm
/// GET /deliveries             -> deliveries
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/kpis", get(analytics::kpis))
        .route("/sales/monthly", get(analytics::monthly_sales))
        .route("/customers/value", get(analytics::customer_value))
        .route("/products/performance", get(analytics::product_performance))
        .route("/crm", get(analytics::crm))
        .route("/deliveries", get(analytics::deliveries))
}
