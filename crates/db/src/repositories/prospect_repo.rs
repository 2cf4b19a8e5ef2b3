//! Repository for the `crm_prospects` table.

use std::collections::HashMap;

use mimo_core::error::CoreError;
use mimo_core::pipeline::{validate_stage_move, ProspectStage};
use mimo_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::customer::{CreateCustomer, Customer};
use crate::models::prospect::{CreateProspect, PipelineColumn, Prospect, UpdateProspect};
use crate::repositories::CustomerRepo;
use crate::{DbError, NOW};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, phone, whatsapp, company, job_title, source, \
     estimated_value, stage, probability, notes, owner, converted_customer_id, converted_at, \
     is_active, created_at, updated_at";

/// Provides CRUD and pipeline operations for CRM prospects.
pub struct ProspectRepo;

impl ProspectRepo {
    /// Insert a new prospect in `stage`, with that stage's probability.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateProspect,
        stage: ProspectStage,
    ) -> Result<Prospect, sqlx::Error> {
        let query = format!(
            "INSERT INTO crm_prospects
                (name, email, phone, whatsapp, company, job_title, source, estimated_value,
                 stage, probability, notes, owner, converted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, COALESCE(?8, 0.0), ?9, ?10, ?11, ?12,
                     CASE WHEN ?9 = 'customer' THEN {NOW} END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prospect>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.whatsapp)
            .bind(&input.company)
            .bind(&input.job_title)
            .bind(&input.source)
            .bind(input.estimated_value)
            .bind(stage.as_str())
            .bind(stage.probability())
            .bind(&input.notes)
            .bind(&input.owner)
            .fetch_one(pool)
            .await
    }

    /// Find an active prospect by ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Prospect>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM crm_prospects WHERE id = ?1 AND is_active = 1");
        sqlx::query_as::<_, Prospect>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active prospects, most recently updated first, optionally in one stage.
    pub async fn list(
        pool: &SqlitePool,
        stage: Option<ProspectStage>,
    ) -> Result<Vec<Prospect>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM crm_prospects
             WHERE is_active = 1 AND (?1 IS NULL OR stage = ?1)
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Prospect>(&query)
            .bind(stage.map(ProspectStage::as_str))
            .fetch_all(pool)
            .await
    }

    /// The sales funnel: every stage in order with its active prospects and
    /// their summed estimated value. Empty stages are still listed.
    pub async fn pipeline(pool: &SqlitePool) -> Result<Vec<PipelineColumn>, sqlx::Error> {
        let prospects = Self::list(pool, None).await?;

        let mut by_stage: HashMap<String, Vec<Prospect>> = HashMap::new();
        for prospect in prospects {
            by_stage
                .entry(prospect.stage.clone())
                .or_default()
                .push(prospect);
        }

        Ok(ProspectStage::ALL
            .into_iter()
            .map(|stage| {
                let prospects = by_stage.remove(stage.as_str()).unwrap_or_default();
                PipelineColumn {
                    stage: stage.info(),
                    count: prospects.len(),
                    total_value: prospects.iter().map(|p| p.estimated_value).sum(),
                    prospects,
                }
            })
            .collect())
    }

    /// Update a prospect's contact and deal fields.
    ///
    /// Returns `None` if no active prospect with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateProspect,
    ) -> Result<Option<Prospect>, sqlx::Error> {
        let query = format!(
            "UPDATE crm_prospects SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                phone = COALESCE(?4, phone),
                whatsapp = COALESCE(?5, whatsapp),
                company = COALESCE(?6, company),
                job_title = COALESCE(?7, job_title),
                source = COALESCE(?8, source),
                estimated_value = COALESCE(?9, estimated_value),
                notes = COALESCE(?10, notes),
                owner = COALESCE(?11, owner),
                updated_at = {NOW}
             WHERE id = ?1 AND is_active = 1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prospect>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.whatsapp)
            .bind(&input.company)
            .bind(&input.job_title)
            .bind(&input.source)
            .bind(input.estimated_value)
            .bind(&input.notes)
            .bind(&input.owner)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a prospect. Returns `true` if an active row was deactivated.
    pub async fn deactivate(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE crm_prospects SET is_active = 0, updated_at = {NOW}
             WHERE id = ?1 AND is_active = 1"
        );
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a prospect to another pipeline stage, updating its probability.
    ///
    /// Entering `customer` stamps `converted_at` once; leaving it clears the stamp.
    ///
    /// Returns `None` if no active prospect with the given `id` exists.
    pub async fn move_stage(
        pool: &SqlitePool,
        id: DbId,
        target: ProspectStage,
    ) -> Result<Option<Prospect>, DbError> {
        let mut tx = crate::begin_write(pool).await?;

        let row: Option<(String, Option<DbId>)> = sqlx::query_as(
            "SELECT stage, converted_customer_id FROM crm_prospects WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((current, converted)) = row else {
            return Ok(None);
        };
        let current = ProspectStage::parse(&current)?;
        validate_stage_move(current, target, converted.is_some())?;

        let query = format!(
            "UPDATE crm_prospects SET
                stage = ?2, probability = ?3,
                converted_at = CASE WHEN ?2 = 'customer' THEN COALESCE(converted_at, {NOW}) END,
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        let prospect = sqlx::query_as::<_, Prospect>(&query)
            .bind(id)
            .bind(target.as_str())
            .bind(target.probability())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(prospect))
    }

    /// Convert a prospect into a customer in one transaction.
    ///
    /// Creates the customer, moves the prospect to `customer` with 100%
    /// probability and links the two. A prospect converts only once.
    /// Returns `None` if no active prospect with the given `id` exists.
    pub async fn convert_to_customer(
        pool: &SqlitePool,
        id: DbId,
        customer: &CreateCustomer,
    ) -> Result<Option<(Prospect, Customer)>, DbError> {
        let mut tx = crate::begin_write(pool).await?;

        let converted: Option<Option<DbId>> = sqlx::query_scalar(
            "SELECT converted_customer_id FROM crm_prospects WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        match converted {
            None => return Ok(None),
            Some(Some(customer_id)) => {
                return Err(CoreError::Conflict(format!(
                    "Prospect {id} was already converted into customer {customer_id}"
                ))
                .into())
            }
            Some(None) => {}
        }

        let created = CustomerRepo::create_in(&mut tx, customer).await?;

        let stage = ProspectStage::Customer;
        let query = format!(
            "UPDATE crm_prospects SET
                stage = ?2, probability = ?3, converted_customer_id = ?4,
                converted_at = COALESCE(converted_at, {NOW}), updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        let prospect = sqlx::query_as::<_, Prospect>(&query)
            .bind(id)
            .bind(stage.as_str())
            .bind(stage.probability())
            .bind(created.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(prospect_id = id, customer_id = created.id, "Prospect converted");
        Ok(Some((prospect, created)))
    }
}
