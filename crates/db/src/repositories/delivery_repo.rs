//! Repository for the `deliveries` table and the delivery board.

use std::collections::HashMap;

use mimo_core::error::CoreError;
use mimo_core::kanban::{validate_delivery_move, DeliveryStatus, DELIVERED_VISIBLE_DAYS, NOTE_DELIVERY};
use mimo_core::types::{Date, DbId};
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::delivery::{CreateDelivery, Delivery, DeliveryCard, KanbanColumn, UpdateDelivery};
use crate::repositories::DeliveryNoteRepo;
use crate::{DbError, NOW};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, sale_id, address, scheduled_date, delivered_at, status, carrier, \
     tracking_code, shipping_fee, responsible, priority, status_changed_at, created_at, \
     updated_at";

/// Delivery columns joined with the sale number, customer and product summary.
const CARD_SELECT: &str = "SELECT d.id, d.sale_id, d.address, d.scheduled_date, d.delivered_at, \
     d.status, d.carrier, d.tracking_code, d.shipping_fee, d.responsible, d.priority, \
     d.status_changed_at, d.created_at, d.updated_at, \
     s.sale_number, c.name AS customer_name, \
     (SELECT GROUP_CONCAT(p.name || ' x' || si.quantity, ', ') \
        FROM sale_items si JOIN products p ON p.id = si.product_id \
        WHERE si.sale_id = d.sale_id) AS products \
     FROM deliveries d \
     JOIN sales s ON s.id = d.sale_id \
     LEFT JOIN customers c ON c.id = s.customer_id";

const CARD_ORDER: &str = "ORDER BY d.priority DESC, d.scheduled_date IS NULL, d.scheduled_date, d.id";

/// Provides CRUD and kanban operations for deliveries.
pub struct DeliveryRepo;

impl DeliveryRepo {
    /// Schedule a delivery for a sale.
    ///
    /// The sale must exist and not be cancelled. Without an explicit address
    /// the sale's delivery address is used, then the customer's address.
    pub async fn create(pool: &SqlitePool, input: &CreateDelivery) -> Result<Delivery, DbError> {
        let mut tx = crate::begin_write(pool).await?;

        let sale: Option<(String, Option<String>, Option<Date>, Option<String>)> = sqlx::query_as(
            "SELECT s.status, s.delivery_address, s.delivery_date, c.address
             FROM sales s LEFT JOIN customers c ON c.id = s.customer_id
             WHERE s.id = ?1",
        )
        .bind(input.sale_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (sale_status, sale_address, sale_date, customer_address) =
            sale.ok_or(CoreError::NotFound {
                entity: "Sale",
                id: input.sale_id,
            })?;
        if sale_status == "cancelled" {
            return Err(CoreError::Conflict(format!(
                "Sale {} is cancelled and cannot be delivered",
                input.sale_id
            ))
            .into());
        }

        let address = [input.address.clone(), sale_address, customer_address]
            .into_iter()
            .flatten()
            .find(|a| !a.trim().is_empty())
            .ok_or_else(|| {
                CoreError::Validation(
                    "address is required when the sale and customer have none".to_string(),
                )
            })?;

        let query = format!(
            "INSERT INTO deliveries
                (sale_id, address, scheduled_date, carrier, tracking_code, shipping_fee,
                 responsible, priority, status_changed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, 0.0), ?7, COALESCE(?8, 0), {NOW})
             RETURNING {COLUMNS}"
        );
        let delivery = sqlx::query_as::<_, Delivery>(&query)
            .bind(input.sale_id)
            .bind(address)
            .bind(input.scheduled_date.or(sale_date))
            .bind(&input.carrier)
            .bind(&input.tracking_code)
            .bind(input.shipping_fee)
            .bind(&input.responsible)
            .bind(input.priority)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(delivery)
    }

    /// Find a delivery by ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Delivery>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deliveries WHERE id = ?1");
        sqlx::query_as::<_, Delivery>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a delivery with its sale number, customer and products.
    pub async fn find_card(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<DeliveryCard>, sqlx::Error> {
        let query = format!("{CARD_SELECT} WHERE d.id = ?1");
        sqlx::query_as::<_, DeliveryCard>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List deliveries ordered by scheduled date, optionally of one status.
    pub async fn list(
        pool: &SqlitePool,
        status: Option<&str>,
    ) -> Result<Vec<DeliveryCard>, sqlx::Error> {
        let query = format!(
            "{CARD_SELECT}
             WHERE (?1 IS NULL OR d.status = ?1)
             ORDER BY d.scheduled_date IS NULL, d.scheduled_date, d.priority DESC, d.id"
        );
        sqlx::query_as::<_, DeliveryCard>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Update a delivery's logistics fields. Status changes go through
    /// [`DeliveryRepo::move_status`].
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateDelivery,
    ) -> Result<Option<Delivery>, sqlx::Error> {
        let query = format!(
            "UPDATE deliveries SET
                address = COALESCE(?2, address),
                scheduled_date = COALESCE(?3, scheduled_date),
                carrier = COALESCE(?4, carrier),
                tracking_code = COALESCE(?5, tracking_code),
                shipping_fee = COALESCE(?6, shipping_fee),
                responsible = COALESCE(?7, responsible),
                priority = COALESCE(?8, priority),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Delivery>(&query)
            .bind(id)
            .bind(&input.address)
            .bind(input.scheduled_date)
            .bind(&input.carrier)
            .bind(&input.tracking_code)
            .bind(input.shipping_fee)
            .bind(&input.responsible)
            .bind(input.priority)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a delivery and its notes, then resync the sale
    /// status with the deliveries that remain. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = crate::begin_write(pool).await?;

        let sale_id: Option<DbId> =
            sqlx::query_scalar("DELETE FROM deliveries WHERE id = ?1 RETURNING sale_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(sale_id) = sale_id else {
            return Ok(false);
        };
        Self::sync_sale_status(&mut tx, sale_id).await?;

        tx.commit().await?;
        tracing::info!(delivery_id = id, sale_id, "Delivery deleted");
        Ok(true)
    }

    /// The delivery board: one column per board status with its cards.
    ///
    /// Cancelled deliveries are hidden, and delivered ones only stay on the
    /// board for [`DELIVERED_VISIBLE_DAYS`] days.
    pub async fn kanban(pool: &SqlitePool) -> Result<Vec<KanbanColumn>, sqlx::Error> {
        let query = format!(
            "{CARD_SELECT}
             WHERE d.status <> 'cancelled'
               AND (d.status <> 'delivered' OR d.delivered_at IS NULL
                    OR julianday(d.delivered_at) >= julianday('now', '-{DELIVERED_VISIBLE_DAYS} days'))
             {CARD_ORDER}"
        );
        let cards = sqlx::query_as::<_, DeliveryCard>(&query)
            .fetch_all(pool)
            .await?;

        let mut by_status: HashMap<String, Vec<DeliveryCard>> = HashMap::new();
        for card in cards {
            by_status
                .entry(card.delivery.status.clone())
                .or_default()
                .push(card);
        }

        Ok(DeliveryStatus::BOARD
            .into_iter()
            .map(|status| {
                let cards = by_status.remove(status.as_str()).unwrap_or_default();
                KanbanColumn {
                    column: status.column_info(),
                    count: cards.len(),
                    cards,
                }
            })
            .collect())
    }

    /// Move a delivery to another status in one transaction.
    ///
    /// Entering `delivered` stamps `delivered_at` and leaving it clears the
    /// stamp. The sale status is then resynced with all of its deliveries. A non-blank `note` is recorded as a delivery note.
    /// Returns `None` if the delivery does not exist.
    pub async fn move_status(
        pool: &SqlitePool,
        id: DbId,
        target: DeliveryStatus,
        note: Option<&str>,
        author: Option<&str>,
    ) -> Result<Option<Delivery>, DbError> {
        let mut tx = crate::begin_write(pool).await?;

        let row: Option<(DbId, String)> =
            sqlx::query_as("SELECT sale_id, status FROM deliveries WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((sale_id, current)) = row else {
            return Ok(None);
        };
        let current = DeliveryStatus::parse(&current)?;
        validate_delivery_move(current, target)?;

        if target != current {
            let query = format!(
                "UPDATE deliveries SET
                    status = ?2,
                    delivered_at = CASE WHEN ?2 = 'delivered' THEN {NOW} END,
                    status_changed_at = {NOW},
                    updated_at = {NOW}
                 WHERE id = ?1"
            );
            sqlx::query(&query)
                .bind(id)
                .bind(target.as_str())
                .execute(&mut *tx)
                .await?;

            Self::sync_sale_status(&mut tx, sale_id).await?;
        }

        if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
            DeliveryNoteRepo::create_in(&mut tx, id, NOTE_DELIVERY, note, author).await?;
        }

        let query = format!("SELECT {COLUMNS} FROM deliveries WHERE id = ?1");
        let delivery = sqlx::query_as::<_, Delivery>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(
            delivery_id = id,
            from = current.as_str(),
            to = target.as_str(),
            "Delivery moved"
        );
        Ok(Some(delivery))
    }

    /// Derive the sale status from all of its deliveries: a pending or
    /// confirmed sale becomes `delivered` while any delivery is delivered,
    /// and a delivered sale returns to `confirmed` once none is.
    async fn sync_sale_status(conn: &mut SqliteConnection, sale_id: DbId) -> Result<(), sqlx::Error> {
        let any_delivered: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM deliveries WHERE sale_id = ?1 AND status = 'delivered')",
        )
        .bind(sale_id)
        .fetch_one(&mut *conn)
        .await?;

        let query = if any_delivered {
            format!(
                "UPDATE sales SET status = 'delivered', updated_at = {NOW}
                 WHERE id = ?1 AND status IN ('pending', 'confirmed')"
            )
        } else {
            format!(
                "UPDATE sales SET status = 'confirmed', updated_at = {NOW}
                 WHERE id = ?1 AND status = 'delivered'"
            )
        };
        sqlx::query(&query).bind(sale_id).execute(&mut *conn).await?;
        Ok(())
    }
}
