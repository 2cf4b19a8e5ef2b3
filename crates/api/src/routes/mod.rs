pub mod admin;
pub mod analytics;
pub mod auth;
pub mod crm;
pub mod customers;
pub mod deliveries;
pub mod health;
pub mod products;
pub mod sales;

use axum::Router;

use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login, /auth/refresh              public
/// /auth/logout, /auth/me                  any authenticated user
/// /admin/users[/{id}]                     admin only
/// /customers, /products, /sales,
/// /deliveries, /crm, /analytics           any authenticated user
/// ```
///
/// The business resources sit behind a [`RequireAuth`] route layer; `auth`
/// and `admin` check credentials in their handlers.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/customers", customers::router())
        .nest("/products", products::router())
        .nest("/sales", sales::router())
        .nest("/deliveries", deliveries::router())
        .nest("/crm", crm::router())
        .nest("/analytics", analytics::router())
        .route_layer(axum::middleware::from_extractor_with_state::<
            RequireAuth,
            AppState,
        >(state.clone()));

    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .merge(protected)
}
