//! Handlers for notes attached to a delivery.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mimo_core::error::CoreError;
use mimo_core::kanban::{validate_note_kind, NOTE_GENERAL};
use mimo_core::types::DbId;
use mimo_core::validation::{reject_blank, require_non_empty};
use mimo_db::models::delivery_note::{
    CreateDeliveryNote, DeliveryNote, NoteCounts, UpdateDeliveryNote,
};
use mimo_db::repositories::{DeliveryNoteRepo, DeliveryRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// `?kind=`
#[derive(Debug, Deserialize)]
pub struct NoteListParams {
    pub kind: Option<String>,
}

/// POST /api/v1/deliveries/{id}/notes
pub async fn create(
    State(state): State<AppState>,
    Path(delivery_id): Path<DbId>,
    Json(input): Json<CreateDeliveryNote>,
) -> AppResult<(StatusCode, Json<DeliveryNote>)> {
    let kind = input.kind.as_deref().unwrap_or(NOTE_GENERAL);
    validate_note_kind(kind)?;
    require_non_empty("body", &input.body)?;
    reject_blank("author", input.author.as_deref())?;
    ensure_delivery(&state, delivery_id).await?;

    let note = DeliveryNoteRepo::create(
        &state.pool,
        delivery_id,
        kind,
        input.body.trim(),
        input.author.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/v1/deliveries/{id}/notes
pub async fn list(
    State(state): State<AppState>,
    Path(delivery_id): Path<DbId>,
    Query(params): Query<NoteListParams>,
) -> AppResult<Json<Vec<DeliveryNote>>> {
    if let Some(kind) = params.kind.as_deref() {
        validate_note_kind(kind)?;
    }
    ensure_delivery(&state, delivery_id).await?;

    let notes =
        DeliveryNoteRepo::list_by_delivery(&state.pool, delivery_id, params.kind.as_deref())
            .await?;
    Ok(Json(notes))
}

/// GET /api/v1/deliveries/{id}/notes/counts
pub async fn counts(
    State(state): State<AppState>,
    Path(delivery_id): Path<DbId>,
) -> AppResult<Json<NoteCounts>> {
    ensure_delivery(&state, delivery_id).await?;
    let counts = DeliveryNoteRepo::count_by_kind(&state.pool, delivery_id).await?;
    Ok(Json(counts))
}

/// PUT /api/v1/deliveries/notes/{note_id}
pub async fn update(
    State(state): State<AppState>,
    Path(note_id): Path<DbId>,
    Json(input): Json<UpdateDeliveryNote>,
) -> AppResult<Json<DeliveryNote>> {
    require_non_empty("body", &input.body)?;
    let note = DeliveryNoteRepo::update(&state.pool, note_id, input.body.trim())
        .await?
        .ok_or(note_not_found(note_id))?;
    Ok(Json(note))
}

/// DELETE /api/v1/deliveries/notes/{note_id}
pub async fn delete(
    State(state): State<AppState>,
    Path(note_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if DeliveryNoteRepo::deactivate(&state.pool, note_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(note_not_found(note_id))
    }
}

async fn ensure_delivery(state: &AppState, id: DbId) -> AppResult<()> {
    DeliveryRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Delivery",
            id,
        }))
}

fn note_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "DeliveryNote",
        id,
    })
}
