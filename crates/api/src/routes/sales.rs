//! Route definitions for the `/sales` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::sales;
use crate::state::AppState;

/// Routes mounted at `/sales`.
///
/// ```text
/// GET  /                                  -> list (?customer_id=&status=&limit=&offset=)
/// POST /                                  -> create
/// GET  /{id}                              -> get_by_id
/// POST /{id}/confirm                      -> confirm
/// POST /{id}/cancel                       -> cancel
/// GET  /{id}/production                   -> production
/// PUT  /{id}/items/{item_id}/production   -> update_item_production
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sales::list).post(sales::create))
        .route("/{id}", get(sales::get_by_id))
        .route("/{id}/confirm", post(sales::confirm))
        .route("/{id}/cancel", post(sales::cancel))
        .route("/{id}/production", get(sales::production))
        .route(
            "/{id}/items/{item_id}/production",
            put(sales::update_item_production),
        )
}
