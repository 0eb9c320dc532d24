mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use cadastro::handlers;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;

async fn app() -> Router {
    handlers::router(test_state().await)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn maria() -> Value {
    json!({
        "fullName": "Maria da Silva",
        "documentType": "CPF",
        "cpf": "11144477735",
        "phone1": "11987654321",
        "state": "sp"
    })
}

#[tokio::test]
async fn insert_then_fetch_by_id() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/api/customers", Some(maria())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/customers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cpf"], CPF_A);
    assert_eq!(body["documentType"], "CPF");
    assert_eq!(body["phone1"], "(11) 98765-4321");
    assert_eq!(body["state"], "SP");
    assert!(body["registeredAt"].is_string());
}

#[tokio::test]
async fn duplicate_document_is_a_conflict() {
    let app = app().await;

    send(&app, "POST", "/api/customers", Some(maria())).await;
    let (status, body) = send(&app, "POST", "/api/customers", Some(maria())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["field"], "cpf");
    assert_eq!(body["value"], CPF_A);
}

#[tokio::test]
async fn invalid_fields_come_back_as_details() {
    let app = app().await;

    let mut payload = maria();
    payload["cpf"] = json!("111.444.777-36");
    payload["state"] = json!("XX");

    let (status, body) = send(&app, "POST", "/api/customers", Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let details = body["details"].as_array().unwrap();
    let fields: Vec<&str> = details.iter().map(|d| d["field"].as_str().unwrap()).collect();
    assert_eq!(fields, ["cpf", "state"]);
    assert_eq!(details[0]["code"], "invalid_document");
}

#[tokio::test]
async fn missing_customer_is_not_found() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/api/customers/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn query_validates_paging() {
    let app = app().await;
    send(&app, "POST", "/api/customers", Some(maria())).await;

    let (status, _) = send(&app, "GET", "/api/customers?page=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/customers?search=maria&state=SP", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["rows"][0]["fullName"], "Maria da Silva");
}

#[tokio::test]
async fn reconcile_endpoint_applies_deletes() {
    let app = app().await;
    let (_, created) = send(&app, "POST", "/api/customers", Some(maria())).await;
    let id = created["id"].as_i64().unwrap();

    let (_, baseline) = send(&app, "GET", &format!("/api/customers/{id}"), None).await;
    let mut edited = baseline.clone();
    edited["delete"] = json!(true);

    let (status, body) = send(
        &app,
        "POST",
        "/api/customers/reconcile",
        Some(json!({ "edited": [edited], "baseline": [baseline] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "updated": 0, "deleted": 1 }));

    let (status, _) = send(&app, "GET", &format!("/api/customers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
