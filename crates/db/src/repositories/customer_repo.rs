//! Repository for the `customers` table.

use mimo_core::customers::next_birthday;
use mimo_core::types::{Date, DbId};
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::customer::{
    CreateCustomer, Customer, PurchaseHistoryEntry, UpcomingBirthday, UpdateCustomer,
};
use crate::NOW;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, name, email, phone, whatsapp, address, city, state, \
     postal_code, tax_id, birth_date, notes, total_spent, last_purchase_at, is_active, \
     created_at, updated_at";

/// Provides CRUD, search and purchase-history queries for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a new customer, returning the created row.
    pub async fn create(pool: &SqlitePool, input: &CreateCustomer) -> Result<Customer, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_in(&mut conn, input).await
    }

    /// Insert a new customer on an existing connection (used by prospect
    /// conversion inside its transaction).
    pub(crate) async fn create_in(
        conn: &mut SqliteConnection,
        input: &CreateCustomer,
    ) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers
                (name, email, phone, whatsapp, address, city, state, postal_code, tax_id,
                 birth_date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.whatsapp)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.postal_code)
            .bind(&input.tax_id)
            .bind(input.birth_date)
            .bind(&input.notes)
            .fetch_one(conn)
            .await
    }

    /// Find an active customer by ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = ?1 AND is_active = 1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List customers ordered by name.
    pub async fn list(
        pool: &SqlitePool,
        include_inactive: bool,
    ) -> Result<Vec<Customer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customers
             WHERE (?1 OR is_active = 1)
             ORDER BY name COLLATE NOCASE"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring search over name, email, phone, WhatsApp
    /// and tax id.
    pub async fn search(
        pool: &SqlitePool,
        term: &str,
        include_inactive: bool,
    ) -> Result<Vec<Customer>, sqlx::Error> {
        let pattern = format!("%{}%", term.trim());
        let query = format!(
            "SELECT {COLUMNS} FROM customers
             WHERE (?2 OR is_active = 1)
               AND (name LIKE ?1 OR email LIKE ?1 OR phone LIKE ?1
                    OR whatsapp LIKE ?1 OR tax_id LIKE ?1)
             ORDER BY name COLLATE NOCASE"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(pattern)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a customer. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no active customer with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                phone = COALESCE(?4, phone),
                whatsapp = COALESCE(?5, whatsapp),
                address = COALESCE(?6, address),
                city = COALESCE(?7, city),
                state = COALESCE(?8, state),
                postal_code = COALESCE(?9, postal_code),
                tax_id = COALESCE(?10, tax_id),
                birth_date = COALESCE(?11, birth_date),
                notes = COALESCE(?12, notes),
                updated_at = {NOW}
             WHERE id = ?1 AND is_active = 1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.whatsapp)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.postal_code)
            .bind(&input.tax_id)
            .bind(input.birth_date)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a customer. Returns `true` if an active row was deactivated.
    pub async fn deactivate(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET is_active = 0, updated_at = {NOW}
             WHERE id = ?1 AND is_active = 1"
        );
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// All sales of a customer, newest first, with item counts and product names.
    pub async fn purchase_history(
        pool: &SqlitePool,
        customer_id: DbId,
    ) -> Result<Vec<PurchaseHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, PurchaseHistoryEntry>(
            "SELECT s.id AS sale_id, s.sale_number, s.sold_at, s.final_amount, s.status,
                    COUNT(si.id) AS item_count,
                    GROUP_CONCAT(p.name, ', ') AS products
             FROM sales s
             LEFT JOIN sale_items si ON si.sale_id = s.id
             LEFT JOIN products p ON p.id = si.product_id
             WHERE s.customer_id = ?1
             GROUP BY s.id
             ORDER BY s.sold_at DESC, s.id DESC",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await
    }

    /// Active customers whose next birthday is within `days` of `today`,
    /// soonest first. The window wraps across the end of the year.
    pub async fn upcoming_birthdays(
        pool: &SqlitePool,
        today: Date,
        days: i64,
    ) -> Result<Vec<UpcomingBirthday>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customers
             WHERE is_active = 1 AND birth_date IS NOT NULL"
        );
        let customers = sqlx::query_as::<_, Customer>(&query).fetch_all(pool).await?;

        let mut upcoming: Vec<UpcomingBirthday> = customers
            .into_iter()
            .filter_map(|customer| {
                let next = next_birthday(customer.birth_date?, today)?;
                let days_until = (next - today).num_days();
                (days_until <= days).then_some(UpcomingBirthday {
                    customer,
                    next_birthday: next,
                    days_until,
                })
            })
            .collect();
        upcoming.sort_by(|a, b| {
            a.days_until
                .cmp(&b.days_until)
                .then_with(|| a.customer.name.cmp(&b.customer.name))
        });
        Ok(upcoming)
    }

    /// Recompute `total_spent` and `last_purchase_at` from the customer's
    /// non-cancelled sales.
    pub async fn refresh_purchase_totals(
        conn: &mut SqliteConnection,
        customer_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let query = format!(
            "UPDATE customers SET
                total_spent = (SELECT COALESCE(SUM(final_amount), 0.0) FROM sales
                               WHERE customer_id = ?1 AND status <> 'cancelled'),
                last_purchase_at = (SELECT MAX(sold_at) FROM sales
                                    WHERE customer_id = ?1 AND status <> 'cancelled'),
                updated_at = {NOW}
             WHERE id = ?1"
        );
        sqlx::query(&query).bind(customer_id).execute(conn).await?;
        Ok(())
    }
}
