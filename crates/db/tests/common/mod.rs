//! Fixture builders shared by the repository integration tests.

#![allow(dead_code)]

use mimo_db::models::customer::{CreateCustomer, Customer};
use mimo_db::models::product::{CreateProduct, Product};
use mimo_db::models::sale::{CreateSale, CreateSaleItem, SaleDetail};
use mimo_db::repositories::{CustomerRepo, ProductRepo, SaleRepo};
use sqlx::SqlitePool;

pub fn new_customer(name: &str) -> CreateCustomer {
    CreateCustomer {
        name: name.to_string(),
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

pub fn new_product(name: &str, price: f64, stock: i64, minimum: i64) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        description: None,
        category: Some("cakes".to_string()),
        price,
        cost: Some(price / 2.0),
        stock_current: Some(stock),
        stock_minimum: Some(minimum),
        stock_maximum: None,
        barcode: None,
        sku: None,
        weight: None,
        dimensions: None,
    }
}

pub fn new_sale(customer_id: Option<i64>, items: &[(i64, i64)]) -> CreateSale {
    CreateSale {
        customer_id,
        discount: None,
        payment_method: Some("pix".to_string()),
        notes: None,
        seller: None,
        origin: None,
        delivery_date: None,
        delivery_address: None,
        items: items
            .iter()
            .map(|&(product_id, quantity)| CreateSaleItem {
                product_id,
                quantity,
                unit_price: None,
            })
            .collect(),
    }
}

pub async fn customer(pool: &SqlitePool, name: &str) -> Customer {
    CustomerRepo::create(pool, &new_customer(name)).await.unwrap()
}

pub async fn product(pool: &SqlitePool, name: &str, price: f64, stock: i64) -> Product {
    ProductRepo::create(pool, &new_product(name, price, stock, 2))
        .await
        .unwrap()
}

pub async fn sale(pool: &SqlitePool, customer_id: Option<i64>, items: &[(i64, i64)]) -> SaleDetail {
    SaleRepo::create(pool, &new_sale(customer_id, items))
        .await
        .unwrap()
}
