//! Repository for the `sales` and `sale_items` tables.

use mimo_core::error::CoreError;
use mimo_core::kanban::DELIVERED_VISIBLE_DAYS;
use mimo_core::sales::{
    compute_totals, next_sale_number, production_progress, ItemProductionStatus,
    ProductionProgress, SaleLine, SaleStatus,
};
use mimo_core::stock::apply_stock_delta;
use mimo_core::types::DbId;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::sale::{
    CreateSale, Sale, SaleBoardRow, SaleDetail, SaleFilter, SaleItem, SaleItemDetail,
    SaleSummary,
};
use crate::repositories::CustomerRepo;
use crate::{DbError, NOW};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, customer_id, sale_number, sold_at, total_amount, discount, \
     final_amount, status, payment_method, notes, seller, origin, delivery_date, \
     delivery_address, created_at, updated_at";

/// Sale columns qualified with the `s` alias, for joined queries.
pub(crate) const SUMMARY_SELECT: &str = "SELECT s.id, s.customer_id, s.sale_number, s.sold_at, \
     s.total_amount, s.discount, s.final_amount, s.status, s.payment_method, s.notes, \
     s.seller, s.origin, s.delivery_date, s.delivery_address, s.created_at, s.updated_at, \
     c.name AS customer_name, \
     (SELECT COUNT(*) FROM sale_items si WHERE si.sale_id = s.id) AS item_count \
     FROM sales s LEFT JOIN customers c ON c.id = s.customer_id";

const ITEM_COLUMNS: &str = "id, sale_id, product_id, quantity, unit_price, subtotal, \
     production_status, produced_at, production_responsible";

/// Provides registration, lifecycle and production tracking for sales.
pub struct SaleRepo;

impl SaleRepo {
    /// Register a sale in one transaction.
    ///
    /// Validates the customer and every product, prices lines that omit a
    /// unit price at the product's current price, computes totals, inserts
    /// the header and items, decrements stock and refreshes the customer's
    /// purchase totals. Any failure rolls the whole sale back.
    pub async fn create(pool: &SqlitePool, input: &CreateSale) -> Result<SaleDetail, DbError> {
        let mut tx = crate::begin_write(pool).await?;

        if let Some(customer_id) = input.customer_id {
            let exists: Option<DbId> =
                sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1 AND is_active = 1")
                    .bind(customer_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if exists.is_none() {
                return Err(CoreError::NotFound {
                    entity: "Customer",
                    id: customer_id,
                }
                .into());
            }
        }

        let mut lines = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let price: Option<f64> =
                sqlx::query_scalar("SELECT price FROM products WHERE id = ?1 AND is_active = 1")
                    .bind(item.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let price = price.ok_or(CoreError::NotFound {
                entity: "Product",
                id: item.product_id,
            })?;
            lines.push(SaleLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price.unwrap_or(price),
            });
        }
        let totals = compute_totals(&lines, input.discount.unwrap_or(0.0))?;

        let query = format!(
            "INSERT INTO sales
                (customer_id, sale_number, total_amount, discount, final_amount, payment_method,
                 notes, seller, origin, delivery_date, delivery_address)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, COALESCE(?9, 'system'), ?10, ?11)
             RETURNING {COLUMNS}"
        );
        let sale = sqlx::query_as::<_, Sale>(&query)
            .bind(input.customer_id)
            .bind(next_sale_number())
            .bind(totals.total_amount)
            .bind(totals.discount)
            .bind(totals.final_amount)
            .bind(&input.payment_method)
            .bind(&input.notes)
            .bind(&input.seller)
            .bind(&input.origin)
            .bind(input.delivery_date)
            .bind(&input.delivery_address)
            .fetch_one(&mut *tx)
            .await?;

        for line in &lines {
            sqlx::query(
                "INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, subtotal)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(sale.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.subtotal())
            .execute(&mut *tx)
            .await?;

            Self::move_stock(&mut tx, line.product_id, -line.quantity).await?;
        }

        if let Some(customer_id) = sale.customer_id {
            CustomerRepo::refresh_purchase_totals(&mut tx, customer_id).await?;
        }

        let detail = Self::load_detail(&mut tx, sale.id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Sale",
                id: sale.id,
            })?;

        tx.commit().await?;
        tracing::info!(
            sale_id = detail.summary.sale.id,
            sale_number = %detail.summary.sale.sale_number,
            final_amount = detail.summary.sale.final_amount,
            "Sale registered"
        );
        Ok(detail)
    }

    /// Find a sale header by ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Sale>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sales WHERE id = ?1");
        sqlx::query_as::<_, Sale>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a sale with its customer name and line items.
    pub async fn find_detail(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<SaleDetail>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::load_detail(&mut conn, id).await
    }

    /// List sales newest first, filtered by customer and/or status.
    pub async fn list(
        pool: &SqlitePool,
        filter: &SaleFilter,
    ) -> Result<Vec<SaleSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE (?1 IS NULL OR s.customer_id = ?1)
               AND (?2 IS NULL OR s.status = ?2)
             ORDER BY s.sold_at DESC, s.id DESC
             LIMIT ?3 OFFSET ?4"
        );
        sqlx::query_as::<_, SaleSummary>(&query)
            .bind(filter.customer_id)
            .bind(&filter.status)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Move a pending sale to `confirmed`.
    ///
    /// Returns `None` if the sale does not exist.
    pub async fn confirm(pool: &SqlitePool, id: DbId) -> Result<Option<Sale>, DbError> {
        let mut tx = crate::begin_write(pool).await?;
        let Some(status) = Self::current_status(&mut tx, id).await? else {
            return Ok(None);
        };
        let next = status.confirm()?;

        let sale = Self::set_status(&mut tx, id, next).await?;
        tx.commit().await?;
        Ok(Some(sale))
    }

    /// Cancel a pending or confirmed sale.
    ///
    /// Restores the stock of every line, cancels the sale's open deliveries
    /// and refreshes the customer's purchase totals.
    pub async fn cancel(pool: &SqlitePool, id: DbId) -> Result<Option<Sale>, DbError> {
        let mut tx = crate::begin_write(pool).await?;
        let Some(status) = Self::current_status(&mut tx, id).await? else {
            return Ok(None);
        };
        let next = status.cancel()?;

        let items: Vec<(DbId, i64)> =
            sqlx::query_as("SELECT product_id, quantity FROM sale_items WHERE sale_id = ?1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        for (product_id, quantity) in items {
            Self::move_stock(&mut tx, product_id, quantity).await?;
        }

        let query = format!(
            "UPDATE deliveries SET status = 'cancelled', status_changed_at = {NOW},
                updated_at = {NOW}
             WHERE sale_id = ?1 AND status NOT IN ('delivered', 'cancelled')"
        );
        sqlx::query(&query).bind(id).execute(&mut *tx).await?;

        let sale = Self::set_status(&mut tx, id, next).await?;
        if let Some(customer_id) = sale.customer_id {
            CustomerRepo::refresh_purchase_totals(&mut tx, customer_id).await?;
        }

        tx.commit().await?;
        tracing::info!(sale_id = id, "Sale cancelled, stock restored");
        Ok(Some(sale))
    }

    /// Set the production status of one line item.
    ///
    /// Moving to `ready` stamps `produced_at`; moving away clears it.
    /// Returns `None` if the item does not belong to the sale.
    pub async fn update_item_production(
        pool: &SqlitePool,
        sale_id: DbId,
        item_id: DbId,
        status: ItemProductionStatus,
        responsible: Option<&str>,
    ) -> Result<Option<SaleItem>, DbError> {
        let mut tx = crate::begin_write(pool).await?;
        let Some(sale_status) = Self::current_status(&mut tx, sale_id).await? else {
            return Ok(None);
        };
        if sale_status == SaleStatus::Cancelled {
            return Err(CoreError::Conflict(
                "Production cannot change on a cancelled sale".to_string(),
            )
            .into());
        }

        let query = format!(
            "UPDATE sale_items SET
                production_status = ?3,
                produced_at = CASE WHEN ?3 = 'ready' THEN COALESCE(produced_at, {NOW}) END,
                production_responsible = COALESCE(?4, production_responsible)
             WHERE id = ?2 AND sale_id = ?1
             RETURNING {ITEM_COLUMNS}"
        );
        let item = sqlx::query_as::<_, SaleItem>(&query)
            .bind(sale_id)
            .bind(item_id)
            .bind(status.as_str())
            .bind(responsible)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Production completion of a sale's items. `None` if the sale does not exist.
    pub async fn production_progress(
        pool: &SqlitePool,
        sale_id: DbId,
    ) -> Result<Option<ProductionProgress>, sqlx::Error> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM sale_items WHERE sale_id = s.id),
                (SELECT COUNT(*) FROM sale_items
                 WHERE sale_id = s.id AND production_status = 'ready')
             FROM sales s WHERE s.id = ?1",
        )
        .bind(sale_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(total, ready)| production_progress(total, ready)))
    }

    /// Production counts for every non-cancelled sale, for the order board.
    ///
    /// Delivered sales drop off after [`DELIVERED_VISIBLE_DAYS`] days, counted
    /// from their latest delivery (or their last update when none is recorded),
    /// matching the delivery kanban.
    pub async fn board_rows(pool: &SqlitePool) -> Result<Vec<SaleBoardRow>, sqlx::Error> {
        let query = format!(
            "SELECT s.id, s.status, s.delivery_date,
                    COUNT(si.id) AS total_items,
                    COALESCE(SUM(CASE WHEN si.production_status = 'ready' THEN 1 ELSE 0 END), 0)
                        AS ready_items
             FROM sales s
             LEFT JOIN sale_items si ON si.sale_id = s.id
             WHERE s.status <> 'cancelled'
               AND (s.status <> 'delivered'
                    OR julianday(COALESCE(
                           (SELECT MAX(d.delivered_at) FROM deliveries d WHERE d.sale_id = s.id),
                           s.updated_at))
                       >= julianday('now', '-{DELIVERED_VISIBLE_DAYS} days'))
             GROUP BY s.id"
        );
        sqlx::query_as::<_, SaleBoardRow>(&query)
            .fetch_all(pool)
            .await
    }

    async fn load_detail(
        conn: &mut SqliteConnection,
        id: DbId,
    ) -> Result<Option<SaleDetail>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE s.id = ?1");
        let Some(summary) = sqlx::query_as::<_, SaleSummary>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, SaleItemDetail>(
            "SELECT si.id, si.sale_id, si.product_id, si.quantity, si.unit_price, si.subtotal,
                    si.production_status, si.produced_at, si.production_responsible,
                    p.name AS product_name
             FROM sale_items si
             JOIN products p ON p.id = si.product_id
             WHERE si.sale_id = ?1
             ORDER BY si.id",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(SaleDetail { summary, items }))
    }

    async fn current_status(
        conn: &mut SqliteConnection,
        id: DbId,
    ) -> Result<Option<SaleStatus>, DbError> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        status
            .as_deref()
            .map(SaleStatus::parse)
            .transpose()
            .map_err(DbError::from)
    }

    async fn set_status(
        conn: &mut SqliteConnection,
        id: DbId,
        status: SaleStatus,
    ) -> Result<Sale, sqlx::Error> {
        let query = format!(
            "UPDATE sales SET status = ?2, updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_one(conn)
            .await
    }

    /// Apply a stock movement for one product, rejecting negative stock.
    async fn move_stock(
        conn: &mut SqliteConnection,
        product_id: DbId,
        delta: i64,
    ) -> Result<(), DbError> {
        let current: i64 = sqlx::query_scalar("SELECT stock_current FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_one(&mut *conn)
            .await?;
        let next = apply_stock_delta(current, delta)?;

        let query =
            format!("UPDATE products SET stock_current = ?2, updated_at = {NOW} WHERE id = ?1");
        sqlx::query(&query)
            .bind(product_id)
            .bind(next)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
