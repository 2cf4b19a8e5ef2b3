//! Handlers for the `/sales` resource, including line-item production.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mimo_core::error::CoreError;
use mimo_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use mimo_core::sales::{ItemProductionStatus, ProductionProgress, SaleStatus};
use mimo_core::types::DbId;
use mimo_core::validation::reject_blank;
use mimo_db::models::sale::{
    CreateSale, Sale, SaleDetail, SaleFilter, SaleItem, SaleSummary, UpdateItemProduction,
};
use mimo_db::repositories::SaleRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::state::AppState;

/// `?customer_id=&status=`
#[derive(Debug, Deserialize)]
pub struct SaleListParams {
    pub customer_id: Option<DbId>,
    pub status: Option<String>,
}

/// POST /api/v1/sales
///
/// Registers the sale with its items and decrements stock in one
/// transaction.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSale>,
) -> AppResult<(StatusCode, Json<SaleDetail>)> {
    if input.items.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A sale needs at least one item".into(),
        )));
    }
    reject_blank("payment_method", input.payment_method.as_deref())?;

    let detail = SaleRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/sales
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SaleListParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Vec<SaleSummary>>> {
    let status = params
        .status
        .as_deref()
        .map(SaleStatus::parse)
        .transpose()?
        .map(|s| s.as_str().to_string());

    let filter = SaleFilter {
        customer_id: params.customer_id,
        status,
        limit: clamp_limit(page.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
        offset: clamp_offset(page.offset),
    };
    let sales = SaleRepo::list(&state.pool, &filter).await?;
    Ok(Json(sales))
}

/// GET /api/v1/sales/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SaleDetail>> {
    let detail = SaleRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(detail))
}

/// POST /api/v1/sales/{id}/confirm
pub async fn confirm(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Json<Sale>> {
    let sale = SaleRepo::confirm(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    tracing::info!(sale_id = id, "Sale confirmed");
    Ok(Json(sale))
}

/// POST /api/v1/sales/{id}/cancel
///
/// Restores stock and cancels the sale's open deliveries.
pub async fn cancel(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Json<Sale>> {
    let sale = SaleRepo::cancel(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    tracing::info!(sale_id = id, "Sale cancelled");
    Ok(Json(sale))
}

/// GET /api/v1/sales/{id}/production
pub async fn production(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProductionProgress>> {
    let progress = SaleRepo::production_progress(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(progress))
}

/// PUT /api/v1/sales/{id}/items/{item_id}/production
pub async fn update_item_production(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateItemProduction>,
) -> AppResult<Json<SaleItem>> {
    let status = ItemProductionStatus::parse(&input.status)?;
    reject_blank("responsible", input.responsible.as_deref())?;

    let item = SaleRepo::update_item_production(
        &state.pool,
        id,
        item_id,
        status,
        input.responsible.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "SaleItem",
        id: item_id,
    }))?;
    Ok(Json(item))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Sale", id })
}
