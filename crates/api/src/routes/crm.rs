//! Route definitions for the `/crm` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::crm;
use crate::state::AppState;

/// Routes mounted at `/crm`.
///
/// ```text
/// GET    /stages                          -> stages
/// GET    /pipeline                        -> pipeline
/// GET    /prospects                       -> list_prospects (?stage=)
/// POST   /prospects                       -> create_prospect
/// GET    /prospects/{id}                  -> get_prospect
/// PUT    /prospects/{id}                  -> update_prospect
/// DELETE /prospects/{id}                  -> delete_prospect
/// POST   /prospects/{id}/move             -> move_prospect
/// POST   /prospects/{id}/convert          -> convert_prospect
/// GET    /prospects/{id}/interactions     -> list_interactions
/// POST   /prospects/{id}/interactions     -> create_interaction
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stages", get(crm::stages))
        .route("/pipeline", get(crm::pipeline))
        .route(
            "/prospects",
            get(crm::list_prospects).post(crm::create_prospect),
        )
        .route(
            "/prospects/{id}",
            get(crm::get_prospect)
                .put(crm::update_prospect)
                .delete(crm::delete_prospect),
        )
        .route("/prospects/{id}/move", post(crm::move_prospect))
        .route("/prospects/{id}/convert", post(crm::convert_prospect))
        .route(
            "/prospects/{id}/interactions",
            get(crm::list_interactions).post(crm::create_interaction),
        )
}
