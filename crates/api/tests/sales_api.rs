//! `/sales`: registration, lifecycle transitions and production tracking.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, get_auth, post_auth, post_json_auth, put_json_auth, user_token};
use serde_json::{json, Value};
use sqlx::SqlitePool;

async fn create_product(app: &Router, token: &str, name: &str, price: f64, stock: i64) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/products",
        json!({ "name": name, "price": price, "stock_current": stock, "stock_minimum": 1 }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn create_customer(app: &Router, token: &str) -> i64 {
    let response = post_json_auth(app, "/api/v1/customers", json!({ "name": "Gabi" }), token).await;
    body_json(response).await["id"].as_i64().unwrap()
}

async fn stock_of(app: &Router, token: &str, product_id: i64) -> i64 {
    let product = body_json(get_auth(app, &format!("/api/v1/products/{product_id}"), token).await).await;
    product["stock_current"].as_i64().unwrap()
}

async fn register_sale(app: &Router, token: &str, body: Value) -> Value {
    let response = post_json_auth(app, "/api/v1/sales", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sale_registration_prices_lines_and_moves_stock(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);
    let customer = create_customer(&app, &token).await;
    let mug = create_product(&app, &token, "Caneca", 40.0, 10).await;
    let frame = create_product(&app, &token, "Quadro", 100.0, 5).await;

    let sale = register_sale(
        &app,
        &token,
        json!({
            "customer_id": customer,
            "discount": 10.0,
            "payment_method": "pix",
            "items": [
                { "product_id": mug, "quantity": 2 },
                { "product_id": frame, "quantity": 1, "unit_price": 90.0 },
            ],
        }),
    )
    .await;

    assert_eq!(sale["status"], "pending");
    assert_eq!(sale["total_amount"], 170.0);
    assert_eq!(sale["final_amount"], 160.0);
    assert_eq!(sale["customer_name"], "Gabi");
    assert_eq!(sale["items"].as_array().unwrap().len(), 2);
    assert!(sale["sale_number"].as_str().unwrap().starts_with("VD"));

    assert_eq!(stock_of(&app, &token, mug).await, 8);
    assert_eq!(stock_of(&app, &token, frame).await, 4);

    let customer = body_json(get_auth(&app, &format!("/api/v1/customers/{customer}"), &token).await).await;
    assert_eq!(customer["total_spent"], 160.0);
    assert!(customer["last_purchase_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sale_rejections_leave_stock_untouched(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);
    let mug = create_product(&app, &token, "Caneca", 40.0, 3).await;

    let empty = post_json_auth(&app, "/api/v1/sales", json!({ "items": [] }), &token).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let too_many = post_json_auth(
        &app,
        "/api/v1/sales",
        json!({ "items": [{ "product_id": mug, "quantity": 4 }] }),
        &token,
    )
    .await;
    assert_eq!(too_many.status(), StatusCode::CONFLICT);

    let unknown_product = post_json_auth(
        &app,
        "/api/v1/sales",
        json!({ "items": [{ "product_id": 999, "quantity": 1 }] }),
        &token,
    )
    .await;
    assert_eq!(unknown_product.status(), StatusCode::NOT_FOUND);

    let discount_too_big = post_json_auth(
        &app,
        "/api/v1/sales",
        json!({ "discount": 50.0, "items": [{ "product_id": mug, "quantity": 1 }] }),
        &token,
    )
    .await;
    assert_eq!(discount_too_big.status(), StatusCode::BAD_REQUEST);

    assert_eq!(stock_of(&app, &token, mug).await, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirm_and_cancel_transitions(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);
    let mug = create_product(&app, &token, "Caneca", 40.0, 10).await;

    let sale = register_sale(
        &app,
        &token,
        json!({ "items": [{ "product_id": mug, "quantity": 3 }] }),
    )
    .await;
    let id = sale["id"].as_i64().unwrap();

    let confirmed = post_auth(&app, &format!("/api/v1/sales/{id}/confirm"), &token).await;
    assert_eq!(confirmed.status(), StatusCode::OK);
    assert_eq!(body_json(confirmed).await["status"], "confirmed");

    let again = post_auth(&app, &format!("/api/v1/sales/{id}/confirm"), &token).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let cancelled = post_auth(&app, &format!("/api/v1/sales/{id}/cancel"), &token).await;
    assert_eq!(body_json(cancelled).await["status"], "cancelled");
    assert_eq!(stock_of(&app, &token, mug).await, 10);

    let twice = post_auth(&app, &format!("/api/v1/sales/{id}/cancel"), &token).await;
    assert_eq!(twice.status(), StatusCode::CONFLICT);

    let missing = post_auth(&app, "/api/v1/sales/999/confirm", &token).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_status(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);
    let mug = create_product(&app, &token, "Caneca", 40.0, 10).await;

    let body = json!({ "items": [{ "product_id": mug, "quantity": 1 }] });
    let first = register_sale(&app, &token, body.clone()).await;
    register_sale(&app, &token, body).await;
    let first_id = first["id"].as_i64().unwrap();
    post_auth(&app, &format!("/api/v1/sales/{first_id}/confirm"), &token).await;

    let all = body_json(get_auth(&app, "/api/v1/sales", &token).await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[0]["item_count"], 1);

    let confirmed = body_json(get_auth(&app, "/api/v1/sales?status=confirmed", &token).await).await;
    let confirmed = confirmed.as_array().unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0]["id"], first_id);

    let page = body_json(get_auth(&app, "/api/v1/sales?limit=1&offset=1", &token).await).await;
    assert_eq!(page.as_array().unwrap().len(), 1);

    let invalid = get_auth(&app, "/api/v1/sales?status=shipped", &token).await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn production_progress_follows_items(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);
    let mug = create_product(&app, &token, "Caneca", 40.0, 10).await;
    let frame = create_product(&app, &token, "Quadro", 100.0, 5).await;

    let sale = register_sale(
        &app,
        &token,
        json!({ "items": [
            { "product_id": mug, "quantity": 1 },
            { "product_id": frame, "quantity": 1 },
        ] }),
    )
    .await;
    let id = sale["id"].as_i64().unwrap();
    let item_id = sale["items"][0]["id"].as_i64().unwrap();
    assert_eq!(sale["items"][0]["production_status"], "to_produce");

    let item = put_json_auth(
        &app,
        &format!("/api/v1/sales/{id}/items/{item_id}/production"),
        json!({ "status": "ready", "responsible": "Marina" }),
        &token,
    )
    .await;
    assert_eq!(item.status(), StatusCode::OK);
    let item = body_json(item).await;
    assert_eq!(item["production_status"], "ready");
    assert_eq!(item["production_responsible"], "Marina");
    assert!(item["produced_at"].is_string());

    let progress = body_json(get_auth(&app, &format!("/api/v1/sales/{id}/production"), &token).await).await;
    assert_eq!(progress["total_items"], 2);
    assert_eq!(progress["ready_items"], 1);
    assert_eq!(progress["percent_complete"], 50.0);
    assert_eq!(progress["all_ready"], false);

    let bad_status = put_json_auth(
        &app,
        &format!("/api/v1/sales/{id}/items/{item_id}/production"),
        json!({ "status": "painting" }),
        &token,
    )
    .await;
    assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);

    let foreign_item = put_json_auth(
        &app,
        &format!("/api/v1/sales/{id}/items/999/production"),
        json!({ "status": "ready" }),
        &token,
    )
    .await;
    assert_eq!(foreign_item.status(), StatusCode::NOT_FOUND);
}
