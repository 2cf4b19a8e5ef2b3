//! Handlers for the `/crm` resource: stage table, pipeline, prospects,
//! conversion into customers and interactions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mimo_core::error::CoreError;
use mimo_core::pipeline::{stage_table, validate_interaction_kind, ProspectStage, StageInfo};
use mimo_core::types::{Date, DbId};
use mimo_core::validation::{
    reject_blank, require_non_empty, validate_email, validate_non_negative,
};
use mimo_db::models::customer::{CreateCustomer, Customer};
use mimo_db::models::interaction::{CreateInteraction, Interaction};
use mimo_db::models::prospect::{
    CreateProspect, MoveProspect, PipelineColumn, Prospect, UpdateProspect,
};
use mimo_db::repositories::{InteractionRepo, ProspectRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// `?stage=`
#[derive(Debug, Deserialize)]
pub struct ProspectListParams {
    pub stage: Option<String>,
}

/// Customer fields for a conversion. Omitted name and contact fields are
/// taken from the prospect.
#[derive(Debug, Default, Deserialize)]
pub struct ConvertProspectRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub tax_id: Option<String>,
    pub birth_date: Option<Date>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub prospect: Prospect,
    pub customer: Customer,
}

/// GET /api/v1/crm/stages
pub async fn stages() -> Json<Vec<StageInfo>> {
    Json(stage_table())
}

/// GET /api/v1/crm/pipeline
pub async fn pipeline(State(state): State<AppState>) -> AppResult<Json<Vec<PipelineColumn>>> {
    let columns = ProspectRepo::pipeline(&state.pool).await?;
    Ok(Json(columns))
}

/// POST /api/v1/crm/prospects
///
/// New prospects start in `prospect` unless a stage is given.
pub async fn create_prospect(
    State(state): State<AppState>,
    Json(input): Json<CreateProspect>,
) -> AppResult<(StatusCode, Json<Prospect>)> {
    require_non_empty("name", &input.name)?;
    validate_email("email", input.email.as_deref())?;
    if let Some(value) = input.estimated_value {
        validate_non_negative("estimated_value", value)?;
    }
    let stage = input
        .stage
        .as_deref()
        .map(ProspectStage::parse)
        .transpose()?
        .unwrap_or(ProspectStage::Prospect);

    let prospect = ProspectRepo::create(&state.pool, &input, stage).await?;
    tracing::info!(prospect_id = prospect.id, stage = %prospect.stage, "Prospect created");
    Ok((StatusCode::CREATED, Json(prospect)))
}

/// GET /api/v1/crm/prospects
pub async fn list_prospects(
    State(state): State<AppState>,
    Query(params): Query<ProspectListParams>,
) -> AppResult<Json<Vec<Prospect>>> {
    let stage = params
        .stage
        .as_deref()
        .map(ProspectStage::parse)
        .transpose()?;
    let prospects = ProspectRepo::list(&state.pool, stage).await?;
    Ok(Json(prospects))
}

/// GET /api/v1/crm/prospects/{id}
pub async fn get_prospect(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Prospect>> {
    let prospect = ProspectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(prospect))
}

/// PUT /api/v1/crm/prospects/{id}
///
/// Stage changes go through the move endpoint.
pub async fn update_prospect(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProspect>,
) -> AppResult<Json<Prospect>> {
    reject_blank("name", input.name.as_deref())?;
    validate_email("email", input.email.as_deref())?;
    if let Some(value) = input.estimated_value {
        validate_non_negative("estimated_value", value)?;
    }

    let prospect = ProspectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(prospect))
}

/// DELETE /api/v1/crm/prospects/{id}
pub async fn delete_prospect(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ProspectRepo::deactivate(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/crm/prospects/{id}/move
pub async fn move_prospect(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MoveProspect>,
) -> AppResult<Json<Prospect>> {
    let target = ProspectStage::parse(&input.stage)?;
    let prospect = ProspectRepo::move_stage(&state.pool, id, target)
        .await?
        .ok_or(not_found(id))?;
    tracing::info!(prospect_id = id, stage = %prospect.stage, "Prospect moved");
    Ok(Json(prospect))
}

/// POST /api/v1/crm/prospects/{id}/convert
pub async fn convert_prospect(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<ConvertProspectRequest>>,
) -> AppResult<(StatusCode, Json<ConversionResponse>)> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let prospect = ProspectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;

    let customer = CreateCustomer {
        name: input.name.unwrap_or(prospect.name),
        email: input.email.or(prospect.email),
        phone: input.phone.or(prospect.phone),
        whatsapp: input.whatsapp.or(prospect.whatsapp),
        address: input.address,
        city: input.city,
        state: input.state,
        postal_code: input.postal_code,
        tax_id: input.tax_id,
        birth_date: input.birth_date,
        notes: input.notes.or(prospect.notes),
    };
    require_non_empty("name", &customer.name)?;
    validate_email("email", customer.email.as_deref())?;

    let (prospect, customer) = ProspectRepo::convert_to_customer(&state.pool, id, &customer)
        .await?
        .ok_or(not_found(id))?;
    Ok((
        StatusCode::CREATED,
        Json(ConversionResponse { prospect, customer }),
    ))
}

/// POST /api/v1/crm/prospects/{id}/interactions
pub async fn create_interaction(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateInteraction>,
) -> AppResult<(StatusCode, Json<Interaction>)> {
    validate_interaction_kind(&input.kind)?;
    require_non_empty("description", &input.description)?;
    ProspectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;

    let interaction = InteractionRepo::create(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(interaction)))
}

/// GET /api/v1/crm/prospects/{id}/interactions
pub async fn list_interactions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Interaction>>> {
    ProspectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    let interactions = InteractionRepo::list_by_prospect(&state.pool, id).await?;
    Ok(Json(interactions))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Prospect",
        id,
    })
}
