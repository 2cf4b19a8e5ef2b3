//! Repository for the `crm_interactions` table.

use mimo_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::interaction::{CreateInteraction, Interaction, RecentInteraction};
use crate::NOW;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, prospect_id, kind, description, outcome, responsible, occurred_at";

/// Provides operations for prospect interactions.
pub struct InteractionRepo;

impl InteractionRepo {
    /// Log an interaction. `occurred_at` defaults to now.
    pub async fn create(
        pool: &SqlitePool,
        prospect_id: DbId,
        input: &CreateInteraction,
    ) -> Result<Interaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO crm_interactions
                (prospect_id, kind, description, outcome, responsible, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, {NOW}))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Interaction>(&query)
            .bind(prospect_id)
            .bind(&input.kind)
            .bind(&input.description)
            .bind(&input.outcome)
            .bind(&input.responsible)
            .bind(input.occurred_at)
            .fetch_one(pool)
            .await
    }

    /// All interactions with a prospect, newest first.
    pub async fn list_by_prospect(
        pool: &SqlitePool,
        prospect_id: DbId,
    ) -> Result<Vec<Interaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM crm_interactions
             WHERE prospect_id = ?1
             ORDER BY julianday(occurred_at) DESC, id DESC"
        );
        sqlx::query_as::<_, Interaction>(&query)
            .bind(prospect_id)
            .fetch_all(pool)
            .await
    }

    /// The latest interactions across all prospects.
    pub async fn recent(
        pool: &SqlitePool,
        limit: i64,
    ) -> Result<Vec<RecentInteraction>, sqlx::Error> {
        sqlx::query_as::<_, RecentInteraction>(
            "SELECT i.id, i.prospect_id, i.kind, i.description, i.outcome, i.responsible,
                    i.occurred_at, p.name AS prospect_name
             FROM crm_interactions i
             JOIN crm_prospects p ON p.id = i.prospect_id
             ORDER BY julianday(i.occurred_at) DESC, i.id DESC
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
