//! CRM prospect model and DTOs.

use mimo_core::pipeline::StageInfo;
use mimo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A prospect row from the `crm_prospects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prospect {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    /// Where the lead came from (e.g. `"instagram"`, `"referral"`).
    pub source: Option<String>,
    pub estimated_value: f64,
    pub stage: String,
    /// Always the probability of `stage`.
    pub probability: i64,
    pub notes: Option<String>,
    pub owner: Option<String>,
    pub converted_customer_id: Option<DbId>,
    /// When the prospect entered the `customer` stage.
    pub converted_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a prospect.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProspect {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub source: Option<String>,
    pub estimated_value: Option<f64>,
    /// Defaults to `"prospect"`.
    pub stage: Option<String>,
    pub notes: Option<String>,
    pub owner: Option<String>,
}

/// DTO for updating a prospect. Stage changes go through [`MoveProspect`].
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProspect {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub source: Option<String>,
    pub estimated_value: Option<f64>,
    pub notes: Option<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveProspect {
    pub stage: String,
}

/// One pipeline column: a stage with its active prospects.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineColumn {
    #[serde(flatten)]
    pub stage: StageInfo,
    pub count: usize,
    pub total_value: f64,
    pub prospects: Vec<Prospect>,
}
