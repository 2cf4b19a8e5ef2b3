//! Handlers for the `/customers` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mimo_core::customers::DEFAULT_BIRTHDAY_WINDOW_DAYS;
use mimo_core::error::CoreError;
use mimo_core::types::DbId;
use mimo_core::validation::{reject_blank, require_non_empty, validate_email};
use mimo_db::models::customer::{
    CreateCustomer, Customer, PurchaseHistoryEntry, UpcomingBirthday, UpdateCustomer,
};
use mimo_db::repositories::CustomerRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::query::IncludeInactiveParams;
use crate::state::AppState;

/// Longest birthday look-ahead accepted, one full year.
const MAX_BIRTHDAY_WINDOW_DAYS: i64 = 366;

/// `?search=`
#[derive(Debug, Deserialize)]
pub struct CustomerListParams {
    pub search: Option<String>,
}

/// `?days=`
#[derive(Debug, Deserialize)]
pub struct BirthdayParams {
    pub days: Option<i64>,
}

/// POST /api/v1/customers
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCustomer>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    require_non_empty("name", &input.name)?;
    validate_email("email", input.email.as_deref())?;

    let customer = CustomerRepo::create(&state.pool, &input).await?;
    tracing::info!(customer_id = customer.id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /api/v1/customers
///
/// A non-blank `search` matches name, email, phone, WhatsApp or tax id.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CustomerListParams>,
    Query(inactive): Query<IncludeInactiveParams>,
) -> AppResult<Json<Vec<Customer>>> {
    let customers = match params.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            CustomerRepo::search(&state.pool, term, inactive.include_inactive).await?
        }
        _ => CustomerRepo::list(&state.pool, inactive.include_inactive).await?,
    };
    Ok(Json(customers))
}

/// GET /api/v1/customers/birthdays
pub async fn birthdays(
    State(state): State<AppState>,
    Query(params): Query<BirthdayParams>,
) -> AppResult<Json<Vec<UpcomingBirthday>>> {
    let days = params.days.unwrap_or(DEFAULT_BIRTHDAY_WINDOW_DAYS);
    if !(0..=MAX_BIRTHDAY_WINDOW_DAYS).contains(&days) {
        return Err(AppError::BadRequest(format!(
            "days must be between 0 and {MAX_BIRTHDAY_WINDOW_DAYS}"
        )));
    }

    let today = chrono::Utc::now().date_naive();
    let upcoming = CustomerRepo::upcoming_birthdays(&state.pool, today, days).await?;
    Ok(Json(upcoming))
}

/// GET /api/v1/customers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Customer>> {
    let customer = CustomerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(customer))
}

/// PUT /api/v1/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCustomer>,
) -> AppResult<Json<Customer>> {
    reject_blank("name", input.name.as_deref())?;
    validate_email("email", input.email.as_deref())?;

    let customer = CustomerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(customer))
}

/// DELETE /api/v1/customers/{id}
///
/// Soft delete; the customer's sales remain.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if CustomerRepo::deactivate(&state.pool, id).await? {
        tracing::info!(customer_id = id, "Customer deactivated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/customers/{id}/purchases
pub async fn purchases(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<PurchaseHistoryEntry>>> {
    CustomerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    let history = CustomerRepo::purchase_history(&state.pool, id).await?;
    Ok(Json(history))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Customer",
        id,
    })
}
