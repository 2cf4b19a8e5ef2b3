//! Handlers for the `/deliveries` resource: CRUD, the kanban board, status
//! moves and the order-board counters.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mimo_core::error::CoreError;
use mimo_core::kanban::{classify_sale_for_board, BoardCounters, DeliveryStatus};
use mimo_core::sales::SaleStatus;
use mimo_core::types::DbId;
use mimo_core::validation::{reject_blank, validate_non_negative};
use mimo_db::models::delivery::{
    CreateDelivery, Delivery, DeliveryCard, KanbanColumn, MoveDelivery, UpdateDelivery,
};
use mimo_db::repositories::{DeliveryRepo, SaleRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// `?status=`
#[derive(Debug, Deserialize)]
pub struct DeliveryListParams {
    pub status: Option<String>,
}

/// POST /api/v1/deliveries
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDelivery>,
) -> AppResult<(StatusCode, Json<Delivery>)> {
    reject_blank("address", input.address.as_deref())?;
    if let Some(fee) = input.shipping_fee {
        validate_non_negative("shipping_fee", fee)?;
    }

    let delivery = DeliveryRepo::create(&state.pool, &input).await?;
    tracing::info!(delivery_id = delivery.id, sale_id = delivery.sale_id, "Delivery created");
    Ok((StatusCode::CREATED, Json(delivery)))
}

/// GET /api/v1/deliveries
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<DeliveryListParams>,
) -> AppResult<Json<Vec<DeliveryCard>>> {
    let status = params
        .status
        .as_deref()
        .map(DeliveryStatus::parse)
        .transpose()?;
    let cards = DeliveryRepo::list(&state.pool, status.map(DeliveryStatus::as_str)).await?;
    Ok(Json(cards))
}

/// GET /api/v1/deliveries/kanban
pub async fn kanban(State(state): State<AppState>) -> AppResult<Json<Vec<KanbanColumn>>> {
    let columns = DeliveryRepo::kanban(&state.pool).await?;
    Ok(Json(columns))
}

/// GET /api/v1/deliveries/board-counters
///
/// Counts non-cancelled sales per order-board column as of today (UTC).
pub async fn board_counters(State(state): State<AppState>) -> AppResult<Json<BoardCounters>> {
    let today = chrono::Utc::now().date_naive();
    let rows = SaleRepo::board_rows(&state.pool).await?;

    let mut counters = BoardCounters::default();
    for row in rows {
        let status = SaleStatus::parse(&row.status)?;
        counters.record(classify_sale_for_board(
            status,
            row.total_items,
            row.ready_items,
            row.delivery_date,
            today,
        ));
    }
    Ok(Json(counters))
}

/// GET /api/v1/deliveries/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DeliveryCard>> {
    let card = DeliveryRepo::find_card(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(card))
}

/// PUT /api/v1/deliveries/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDelivery>,
) -> AppResult<Json<Delivery>> {
    reject_blank("address", input.address.as_deref())?;
    if let Some(fee) = input.shipping_fee {
        validate_non_negative("shipping_fee", fee)?;
    }

    let delivery = DeliveryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(delivery))
}

/// DELETE /api/v1/deliveries/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if DeliveryRepo::delete(&state.pool, id).await? {
        tracing::info!(delivery_id = id, "Delivery deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/deliveries/{id}/move
///
/// Moves the card to another column. A non-blank `note` is recorded as a
/// delivery note in the same transaction.
pub async fn move_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MoveDelivery>,
) -> AppResult<Json<Delivery>> {
    let target = DeliveryStatus::parse(&input.status)?;

    let delivery = DeliveryRepo::move_status(
        &state.pool,
        id,
        target,
        input.note.as_deref(),
        input.author.as_deref(),
    )
    .await?
    .ok_or(not_found(id))?;

    tracing::info!(delivery_id = id, status = %delivery.status, "Delivery moved");
    Ok(Json(delivery))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Delivery",
        id,
    })
}
