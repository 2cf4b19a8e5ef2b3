//! Route definitions for the `/deliveries` resource and its notes.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{deliveries, delivery_notes};
use crate::state::AppState;

/// Routes mounted at `/deliveries`.
///
/// ```text
/// GET    /                   -> list (?status=)
/// POST   /                   -> create
/// GET    /kanban             -> kanban
/// GET    /board-counters     -> board_counters
/// GET    /{id}               -> get_by_id
/// PUT    /{id}               -> update
/// DELETE /{id}               -> delete
/// POST   /{id}/move          -> move_status
/// GET    /{id}/notes         -> delivery_notes::list (?kind=)
/// POST   /{id}/notes         -> delivery_notes::create
/// GET    /{id}/notes/counts  -> delivery_notes::counts
/// PUT    /notes/{note_id}    -> delivery_notes::update
/// DELETE /notes/{note_id}    -> delivery_notes::delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(deliveries::list).post(deliveries::create))
        .route("/kanban", get(deliveries::kanban))
        .route("/board-counters", get(deliveries::board_counters))
        .route(
            "/{id}",
            get(deliveries::get_by_id)
                .put(deliveries::update)
                .delete(deliveries::delete),
        )
        .route("/{id}/move", post(deliveries::move_status))
        .route(
            "/{id}/notes",
            get(delivery_notes::list).post(delivery_notes::create),
        )
        .route("/{id}/notes/counts", get(delivery_notes::counts))
        .route(
            "/notes/{note_id}",
            put(delivery_notes::update).delete(delivery_notes::delete),
        )
}
