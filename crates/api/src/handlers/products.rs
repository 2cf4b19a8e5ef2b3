//! Handlers for the `/products` resource.
//!
//! Responses are [`ProductView`]s, so every product carries its stock
//! status and margin.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mimo_core::error::CoreError;
use mimo_core::types::DbId;
use mimo_core::validation::{
    reject_blank, require_non_empty, validate_non_negative, validate_non_negative_int,
};
use mimo_db::models::product::{AdjustStock, CreateProduct, ProductView, UpdateProduct};
use mimo_db::repositories::ProductRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::query::IncludeInactiveParams;
use crate::state::AppState;

/// `?category=`
#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    pub category: Option<String>,
}

/// POST /api/v1/products
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<ProductView>)> {
    require_non_empty("name", &input.name)?;
    validate_non_negative("price", input.price)?;
    if let Some(cost) = input.cost {
        validate_non_negative("cost", cost)?;
    }
    validate_non_negative_int("stock_current", input.stock_current.unwrap_or(0))?;
    validate_non_negative_int("stock_minimum", input.stock_minimum.unwrap_or(0))?;

    let product = ProductRepo::create(&state.pool, &input).await?;
    tracing::info!(product_id = product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /api/v1/products
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
    Query(inactive): Query<IncludeInactiveParams>,
) -> AppResult<Json<Vec<ProductView>>> {
    let category = params.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let products = ProductRepo::list(&state.pool, category, inactive.include_inactive).await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// GET /api/v1/products/low-stock
///
/// Active products at `critical` or `low` stock, most urgent first.
pub async fn low_stock(State(state): State<AppState>) -> AppResult<Json<Vec<ProductView>>> {
    let products = ProductRepo::list_low_stock(&state.pool).await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProductView>> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(product.into()))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<ProductView>> {
    reject_blank("name", input.name.as_deref())?;
    if let Some(price) = input.price {
        validate_non_negative("price", price)?;
    }
    if let Some(cost) = input.cost {
        validate_non_negative("cost", cost)?;
    }
    if let Some(minimum) = input.stock_minimum {
        validate_non_negative_int("stock_minimum", minimum)?;
    }

    let product = ProductRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(product.into()))
}

/// DELETE /api/v1/products/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if ProductRepo::deactivate(&state.pool, id).await? {
        tracing::info!(product_id = id, "Product deactivated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/products/{id}/stock
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AdjustStock>,
) -> AppResult<Json<ProductView>> {
    let product = ProductRepo::adjust_stock(&state.pool, id, input.delta)
        .await?
        .ok_or(not_found(id))?;
    tracing::info!(product_id = id, delta = input.delta, stock = product.stock_current, "Stock adjusted");
    Ok(Json(product.into()))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Product",
        id,
    })
}
