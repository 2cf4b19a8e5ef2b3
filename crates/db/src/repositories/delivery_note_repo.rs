//! Repository for the `delivery_notes` table.

use mimo_core::kanban::{NOTE_DELIVERY, NOTE_GENERAL, NOTE_PRODUCTION};
use mimo_core::types::DbId;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::delivery_note::{DeliveryNote, NoteCounts};
use crate::NOW;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, delivery_id, kind, body, author, is_active, created_at, updated_at";

/// Provides CRUD operations for delivery notes.
pub struct DeliveryNoteRepo;

impl DeliveryNoteRepo {
    /// Insert a note, returning the created row. `author` defaults to `"system"`.
    pub async fn create(
        pool: &SqlitePool,
        delivery_id: DbId,
        kind: &str,
        body: &str,
        author: Option<&str>,
    ) -> Result<DeliveryNote, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_in(&mut conn, delivery_id, kind, body, author).await
    }

    pub(crate) async fn create_in(
        conn: &mut SqliteConnection,
        delivery_id: DbId,
        kind: &str,
        body: &str,
        author: Option<&str>,
    ) -> Result<DeliveryNote, sqlx::Error> {
        let query = format!(
            "INSERT INTO delivery_notes (delivery_id, kind, body, author)
             VALUES (?1, ?2, ?3, COALESCE(?4, 'system'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeliveryNote>(&query)
            .bind(delivery_id)
            .bind(kind)
            .bind(body)
            .bind(author)
            .fetch_one(conn)
            .await
    }

    /// Active notes of a delivery, newest first, optionally of one kind.
    pub async fn list_by_delivery(
        pool: &SqlitePool,
        delivery_id: DbId,
        kind: Option<&str>,
    ) -> Result<Vec<DeliveryNote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM delivery_notes
             WHERE delivery_id = ?1 AND is_active = 1 AND (?2 IS NULL OR kind = ?2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, DeliveryNote>(&query)
            .bind(delivery_id)
            .bind(kind)
            .fetch_all(pool)
            .await
    }

    /// Replace the text of an active note. Returns `None` if it does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        body: &str,
    ) -> Result<Option<DeliveryNote>, sqlx::Error> {
        let query = format!(
            "UPDATE delivery_notes SET body = ?2, updated_at = {NOW}
             WHERE id = ?1 AND is_active = 1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeliveryNote>(&query)
            .bind(id)
            .bind(body)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a note. Returns `true` if an active row was deactivated.
    pub async fn deactivate(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE delivery_notes SET is_active = 0, updated_at = {NOW}
             WHERE id = ?1 AND is_active = 1"
        );
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a delivery's active notes per kind.
    pub async fn count_by_kind(
        pool: &SqlitePool,
        delivery_id: DbId,
    ) -> Result<NoteCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT kind, COUNT(*) FROM delivery_notes
             WHERE delivery_id = ?1 AND is_active = 1
             GROUP BY kind",
        )
        .bind(delivery_id)
        .fetch_all(pool)
        .await?;

        let mut counts = NoteCounts::default();
        for (kind, count) in rows {
            match kind.as_str() {
                NOTE_GENERAL => counts.general = count,
                NOTE_PRODUCTION => counts.production = count,
                NOTE_DELIVERY => counts.delivery = count,
                _ => {}
            }
        }
        Ok(counts)
    }
}
