//! `/crm`: stage table, prospects, pipeline, conversion and interactions.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    body_json, delete_auth, get_auth, post_auth, post_json_auth, put_json_auth, user_token,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

async fn create_prospect(app: &Router, token: &str, body: Value) -> Value {
    let response = post_json_auth(app, "/api/v1/crm/prospects", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stage_table_has_probabilities(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);

    let stages = body_json(get_auth(&app, "/api/v1/crm/stages", &token).await).await;
    let probabilities: Vec<i64> = stages
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["probability"].as_i64().unwrap())
        .collect();
    assert_eq!(probabilities, vec![25, 50, 75, 100]);
    assert_eq!(stages[0]["stage"], "prospect");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn moving_a_prospect_updates_probability(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);

    let prospect = create_prospect(
        &app,
        &token,
        json!({ "name": "Loja Aurora", "company": "Aurora Ltda", "estimated_value": 1500.0 }),
    )
    .await;
    assert_eq!(prospect["stage"], "prospect");
    assert_eq!(prospect["probability"], 25);
    let id = prospect["id"].as_i64().unwrap();

    let moved = post_json_auth(
        &app,
        &format!("/api/v1/crm/prospects/{id}/move"),
        json!({ "stage": "negotiation" }),
        &token,
    )
    .await;
    let moved = body_json(moved).await;
    assert_eq!(moved["stage"], "negotiation");
    assert_eq!(moved["probability"], 75);

    let invalid = post_json_auth(
        &app,
        &format!("/api/v1/crm/prospects/{id}/move"),
        json!({ "stage": "won" }),
        &token,
    )
    .await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let filtered = body_json(get_auth(&app, "/api/v1/crm/prospects?stage=negotiation", &token).await).await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn prospect_update_and_delete(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);

    let prospect = create_prospect(&app, &token, json!({ "name": "Bistrô Sol" })).await;
    let id = prospect["id"].as_i64().unwrap();
    let uri = format!("/api/v1/crm/prospects/{id}");

    let updated = body_json(
        put_json_auth(&app, &uri, json!({ "owner": "Dona Mimo", "estimated_value": 800.0 }), &token).await,
    )
    .await;
    assert_eq!(updated["owner"], "Dona Mimo");
    assert_eq!(updated["estimated_value"], 800.0);
    assert_eq!(updated["stage"], "prospect");

    let negative = put_json_auth(&app, &uri, json!({ "estimated_value": -5.0 }), &token).await;
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

    let deleted = delete_auth(&app, &uri, &token).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    let gone = get_auth(&app, &uri, &token).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pipeline_groups_every_stage(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);

    create_prospect(&app, &token, json!({ "name": "A", "estimated_value": 100.0 })).await;
    create_prospect(&app, &token, json!({ "name": "B", "estimated_value": 250.0 })).await;
    create_prospect(&app, &token, json!({ "name": "C", "stage": "contact" })).await;

    let pipeline = body_json(get_auth(&app, "/api/v1/crm/pipeline", &token).await).await;
    let columns = pipeline.as_array().unwrap();
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[0]["stage"], "prospect");
    assert_eq!(columns[0]["count"], 2);
    assert_eq!(columns[0]["total_value"], 350.0);
    assert_eq!(columns[1]["count"], 1);
    assert_eq!(columns[3]["count"], 0);
    assert_eq!(columns[3]["prospects"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn conversion_creates_customer_once(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);

    let prospect = create_prospect(
        &app,
        &token,
        json!({ "name": "Clara Dias", "email": "clara@lead.test", "whatsapp": "11988887777" }),
    )
    .await;
    let id = prospect["id"].as_i64().unwrap();
    let uri = format!("/api/v1/crm/prospects/{id}/convert");

    let converted = post_auth(&app, &uri, &token).await;
    assert_eq!(converted.status(), StatusCode::CREATED);
    let converted = body_json(converted).await;
    assert_eq!(converted["customer"]["name"], "Clara Dias");
    assert_eq!(converted["customer"]["email"], "clara@lead.test");
    assert_eq!(converted["prospect"]["stage"], "customer");
    assert_eq!(converted["prospect"]["probability"], 100);
    assert_eq!(
        converted["prospect"]["converted_customer_id"],
        converted["customer"]["id"]
    );

    let again = post_json_auth(&app, &uri, json!({ "name": "Clara D." }), &token).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let back = post_json_auth(
        &app,
        &format!("/api/v1/crm/prospects/{id}/move"),
        json!({ "stage": "contact" }),
        &token,
    )
    .await;
    assert_eq!(back.status(), StatusCode::CONFLICT);

    let customers = body_json(get_auth(&app, "/api/v1/customers", &token).await).await;
    assert_eq!(customers.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn conversion_body_overrides_prospect_fields(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);

    let prospect = create_prospect(&app, &token, json!({ "name": "Davi" })).await;
    let id = prospect["id"].as_i64().unwrap();

    let converted = post_json_auth(
        &app,
        &format!("/api/v1/crm/prospects/{id}/convert"),
        json!({ "name": "Davi Nunes", "city": "Santos" }),
        &token,
    )
    .await;
    let converted = body_json(converted).await;
    assert_eq!(converted["customer"]["name"], "Davi Nunes");
    assert_eq!(converted["customer"]["city"], "Santos");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn interactions_are_logged_per_prospect(pool: SqlitePool) {
    let token = user_token(&pool).await;
    let app = common::build_test_app(pool);

    let prospect = create_prospect(&app, &token, json!({ "name": "Eli" })).await;
    let id = prospect["id"].as_i64().unwrap();
    let uri = format!("/api/v1/crm/prospects/{id}/interactions");

    let call = post_json_auth(
        &app,
        &uri,
        json!({ "kind": "call", "description": "Apresentou catálogo", "outcome": "Pediu orçamento" }),
        &token,
    )
    .await;
    assert_eq!(call.status(), StatusCode::CREATED);
    assert!(body_json(call).await["occurred_at"].is_string());

    let bad_kind = post_json_auth(&app, &uri, json!({ "kind": "telepathy", "description": "?" }), &token).await;
    assert_eq!(bad_kind.status(), StatusCode::BAD_REQUEST);

    let blank = post_json_auth(&app, &uri, json!({ "kind": "email", "description": " " }), &token).await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let listed = body_json(get_auth(&app, &uri, &token).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["kind"], "call");

    let missing = get_auth(&app, "/api/v1/crm/prospects/999/interactions", &token).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
