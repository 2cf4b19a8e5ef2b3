//! Integration tests for customer and product repositories:
//! - Create, update, soft delete and search
//! - Upcoming birthdays across the year boundary
//! - Stock adjustment and low-stock listing

mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use mimo_core::error::CoreError;
use mimo_db::models::customer::{CreateCustomer, UpdateCustomer};
use mimo_db::models::product::UpdateProduct;
use mimo_db::repositories::{CustomerRepo, ProductRepo};
use mimo_db::DbError;
use sqlx::SqlitePool;

use common::{new_customer, new_product};

fn with_contact(name: &str, email: &str, phone: &str) -> CreateCustomer {
    CreateCustomer {
        email: Some(email.to_string()),
        phone: Some(phone.to_string()),
        ..new_customer(name)
    }
}

fn empty_update() -> UpdateCustomer {
    UpdateCustomer {
        name: None,
        email: None,
        phone: None,
        whatsapp: None,
        address: None,
        city: None,
        state: None,
        postal_code: None,
        tax_id: None,
        birth_date: None,
        notes: None,
    }
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_update_customer(pool: SqlitePool) {
    let customer = CustomerRepo::create(&pool, &with_contact("Maria", "maria@x.com", "1199"))
        .await
        .unwrap();
    assert_eq!(customer.name, "Maria");
    assert!(customer.is_active);
    assert_eq!(customer.total_spent, 0.0);

    let update = UpdateCustomer {
        city: Some("Campinas".to_string()),
        ..empty_update()
    };
    let updated = CustomerRepo::update(&pool, customer.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.city.as_deref(), Some("Campinas"));
    assert_eq!(updated.email.as_deref(), Some("maria@x.com"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_customer_email_rejected(pool: SqlitePool) {
    CustomerRepo::create(&pool, &with_contact("A", "dup@x.com", "1"))
        .await
        .unwrap();
    let result = CustomerRepo::create(&pool, &with_contact("B", "dup@x.com", "2")).await;
    assert!(result.is_err(), "Duplicate email should fail");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_deleted_customer_hidden(pool: SqlitePool) {
    let customer = common::customer(&pool, "Gone").await;

    assert!(CustomerRepo::deactivate(&pool, customer.id).await.unwrap());
    assert!(!CustomerRepo::deactivate(&pool, customer.id).await.unwrap());

    assert!(CustomerRepo::find_by_id(&pool, customer.id)
        .await
        .unwrap()
        .is_none());
    assert!(CustomerRepo::list(&pool, false).await.unwrap().is_empty());
    assert_eq!(CustomerRepo::list(&pool, true).await.unwrap().len(), 1);
    assert!(CustomerRepo::update(&pool, customer.id, &empty_update())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_matches_contact_fields(pool: SqlitePool) {
    CustomerRepo::create(&pool, &with_contact("Joana Silva", "joana@mail.com", "11 9999"))
        .await
        .unwrap();
    CustomerRepo::create(&pool, &with_contact("Pedro", "pedro@mail.com", "21 8888"))
        .await
        .unwrap();

    let by_name = CustomerRepo::search(&pool, "silva", false).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Joana Silva");

    let by_phone = CustomerRepo::search(&pool, "8888", false).await.unwrap();
    assert_eq!(by_phone[0].name, "Pedro");

    let by_domain = CustomerRepo::search(&pool, "mail.com", false).await.unwrap();
    assert_eq!(by_domain.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upcoming_birthdays_wrap_year_end(pool: SqlitePool) {
    let born = |m, d| NaiveDate::from_ymd_opt(1990, m, d);
    for (name, birth_date) in [
        ("New Year", born(1, 2)),
        ("Christmas", born(12, 25)),
        ("Midyear", born(6, 15)),
    ] {
        let input = CreateCustomer {
            birth_date,
            ..new_customer(name)
        };
        CustomerRepo::create(&pool, &input).await.unwrap();
    }

    let today = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
    let upcoming = CustomerRepo::upcoming_birthdays(&pool, today, 30)
        .await
        .unwrap();

    let names: Vec<&str> = upcoming.iter().map(|b| b.customer.name.as_str()).collect();
    assert_eq!(names, vec!["Christmas", "New Year"]);
    assert_eq!(upcoming[0].days_until, 5);
    assert_eq!(
        upcoming[1].next_birthday,
        NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_product_defaults_and_category_filter(pool: SqlitePool) {
    let mut input = new_product("Brigadeiro", 3.5, 0, 0);
    input.stock_current = None;
    input.stock_minimum = None;
    let product = ProductRepo::create(&pool, &input).await.unwrap();
    assert_eq!(product.stock_current, 0);
    assert_eq!(product.stock_minimum, 0);

    let mut other = new_product("Card", 10.0, 5, 1);
    other.category = Some("gifts".to_string());
    ProductRepo::create(&pool, &other).await.unwrap();

    let cakes = ProductRepo::list(&pool, Some("cakes"), false).await.unwrap();
    assert_eq!(cakes.len(), 1);
    assert_eq!(ProductRepo::list(&pool, None, false).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_adjust_stock_rejects_negative(pool: SqlitePool) {
    let product = common::product(&pool, "Cake", 50.0, 3).await;

    let restocked = ProductRepo::adjust_stock(&pool, product.id, 7)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restocked.stock_current, 10);

    let err = ProductRepo::adjust_stock(&pool, product.id, -11)
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));

    let unchanged = ProductRepo::find_by_id(&pool, product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.stock_current, 10);

    assert!(ProductRepo::adjust_stock(&pool, 9999, 1)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_low_stock_listing(pool: SqlitePool) {
    ProductRepo::create(&pool, &new_product("Critical", 1.0, 2, 4)).await.unwrap();
    ProductRepo::create(&pool, &new_product("Low", 1.0, 6, 4)).await.unwrap();
    ProductRepo::create(&pool, &new_product("Plenty", 1.0, 7, 4)).await.unwrap();

    let low = ProductRepo::list_low_stock(&pool).await.unwrap();
    let names: Vec<&str> = low.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Critical", "Low"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_product_keeps_unset_fields(pool: SqlitePool) {
    let product = common::product(&pool, "Pie", 20.0, 5).await;
    let update = UpdateProduct {
        name: None,
        description: None,
        category: None,
        price: Some(25.0),
        cost: None,
        stock_minimum: None,
        stock_maximum: None,
        barcode: None,
        sku: None,
        weight: None,
        dimensions: None,
    };
    let updated = ProductRepo::update(&pool, product.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.price, 25.0);
    assert_eq!(updated.name, "Pie");
    assert_eq!(updated.stock_current, 5);
}
