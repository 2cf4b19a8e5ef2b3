//! Repository for the `products` table.

use mimo_core::stock::apply_stock_delta;
use mimo_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::product::{CreateProduct, Product, UpdateProduct};
use crate::{DbError, NOW};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, name, description, category, price, cost, stock_current, \
     stock_minimum, stock_maximum, barcode, sku, weight, dimensions, is_active, created_at, \
     updated_at";

/// Provides CRUD and stock operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create(pool: &SqlitePool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products
                (name, description, category, price, cost, stock_current, stock_minimum,
                 stock_maximum, barcode, sku, weight, dimensions)
             VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, 0), COALESCE(?7, 0), ?8, ?9, ?10, ?11, ?12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.price)
            .bind(input.cost)
            .bind(input.stock_current)
            .bind(input.stock_minimum)
            .bind(input.stock_maximum)
            .bind(&input.barcode)
            .bind(&input.sku)
            .bind(input.weight)
            .bind(&input.dimensions)
            .fetch_one(pool)
            .await
    }

    /// Find an active product by ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = ?1 AND is_active = 1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List products ordered by name, optionally restricted to one category.
    pub async fn list(
        pool: &SqlitePool,
        category: Option<&str>,
        include_inactive: bool,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE (?1 IS NULL OR category = ?1)
               AND (?2 OR is_active = 1)
             ORDER BY name COLLATE NOCASE"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(category)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Active products whose stock is critical or low, lowest relative
    /// stock first.
    pub async fn list_low_stock(pool: &SqlitePool) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE is_active = 1 AND 2 * stock_current <= 3 * stock_minimum
             ORDER BY stock_current - stock_minimum, name COLLATE NOCASE"
        );
        sqlx::query_as::<_, Product>(&query).fetch_all(pool).await
    }

    /// Update a product. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no active product with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                category = COALESCE(?4, category),
                price = COALESCE(?5, price),
                cost = COALESCE(?6, cost),
                stock_minimum = COALESCE(?7, stock_minimum),
                stock_maximum = COALESCE(?8, stock_maximum),
                barcode = COALESCE(?9, barcode),
                sku = COALESCE(?10, sku),
                weight = COALESCE(?11, weight),
                dimensions = COALESCE(?12, dimensions),
                updated_at = {NOW}
             WHERE id = ?1 AND is_active = 1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.price)
            .bind(input.cost)
            .bind(input.stock_minimum)
            .bind(input.stock_maximum)
            .bind(&input.barcode)
            .bind(&input.sku)
            .bind(input.weight)
            .bind(&input.dimensions)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a product. Returns `true` if an active row was deactivated.
    pub async fn deactivate(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE products SET is_active = 0, updated_at = {NOW}
             WHERE id = ?1 AND is_active = 1"
        );
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a signed stock movement.
    ///
    /// Returns `None` if the product does not exist, and a conflict if the
    /// movement would take stock below zero.
    pub async fn adjust_stock(
        pool: &SqlitePool,
        id: DbId,
        delta: i64,
    ) -> Result<Option<Product>, DbError> {
        let mut tx = crate::begin_write(pool).await?;

        let current: Option<i64> = sqlx::query_scalar(
            "SELECT stock_current FROM products WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current) = current else {
            return Ok(None);
        };
        let next = apply_stock_delta(current, delta)?;

        let query = format!(
            "UPDATE products SET stock_current = ?2, updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(next)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(product))
    }
}
