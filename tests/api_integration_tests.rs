//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rate_cache::{api::create_router, AppState, RateRepository};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_app_with_lifetime(Duration::from_secs(3600))
}

fn create_app_with_lifetime(lifetime: Duration) -> Router {
    let state = AppState::new(RateRepository::new(lifetime), Duration::from_millis(250));
    create_router(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_rate(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/currency")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn seed(app: &Router, from: &str, to: &str, rate: f64, day: &str) {
    let body = format!(
        r#"{{"from":"{from}","to":"{to}","rate":{rate},"reportedOn":"{day}"}}"#
    );
    let response = app.clone().oneshot(post_rate(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// == POST /currency ==

#[tokio::test]
async fn test_post_rate_success() {
    let app = create_test_app();

    let response = app
        .oneshot(post_rate(
            r#"{"from":"usd","to":"eur","rate":0.91,"reportedOn":"2024-03-15"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["from"], "USD");
    assert_eq!(json["to"], "EUR");
    assert_eq!(json["rate"], 0.91);
    assert_eq!(json["reportedOn"], "2024-03-15");
}

#[tokio::test]
async fn test_post_rate_same_currency() {
    let app = create_test_app();

    let response = app
        .oneshot(post_rate(
            r#"{"from":"USD","to":"usd","rate":1.0,"reportedOn":"2024-03-15"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "From/To must be different currency codes");
}

#[tokio::test]
async fn test_post_rate_field_errors() {
    let app = create_test_app();

    let response = app
        .oneshot(post_rate(
            r#"{"from":"ZZZ","to":"EUR","rate":-2.5,"reportedOn":"2024-13-01"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Invalid arguments");

    let fields: Vec<&str> = json["metadata"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["from", "rate", "reportedOn"]);
}

#[tokio::test]
async fn test_post_invalid_json() {
    let app = create_test_app();

    let response = app.oneshot(post_rate("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("message").is_some());
}

// == GET /currency/latest ==

#[tokio::test]
async fn test_latest_returns_most_recent_day() {
    let app = create_test_app();
    seed(&app, "USD", "CAD", 1.34, "2024-03-13").await;
    seed(&app, "USD", "CAD", 1.36, "2024-03-15").await;
    seed(&app, "USD", "CAD", 1.35, "2024-03-14").await;

    let response = app
        .oneshot(get("/currency/latest?fromCurrencyCode=usd&toCurrencyCode=cad"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["reportedOn"], "2024-03-15");
    assert_eq!(json["rate"], 1.36);
}

#[tokio::test]
async fn test_latest_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(get("/currency/latest?fromCurrencyCode=USD&toCurrencyCode=EUR"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("USD->EUR"));
}

#[tokio::test]
async fn test_latest_missing_query_params() {
    let app = create_test_app();

    let response = app.oneshot(get("/currency/latest")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["metadata"]["fields"].as_array().unwrap().len(), 2);
}

// == GET /currency/:iso_date ==

#[tokio::test]
async fn test_rate_for_date() {
    let app = create_test_app();
    seed(&app, "EUR", "GBP", 0.85, "2024-03-14").await;

    let found = app
        .clone()
        .oneshot(get("/currency/2024-03-14?fromCurrencyCode=EUR&toCurrencyCode=GBP"))
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    let json = body_to_json(found.into_body()).await;
    assert_eq!(json["rate"], 0.85);

    let missing = app
        .clone()
        .oneshot(get("/currency/2024-03-15?fromCurrencyCode=EUR&toCurrencyCode=GBP"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let invalid = app
        .oneshot(get("/currency/15-03-2024?fromCurrencyCode=EUR&toCurrencyCode=GBP"))
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

// == GET /currency ==

#[tokio::test]
async fn test_history_is_per_direction() {
    let app = create_test_app();
    seed(&app, "USD", "JPY", 149.5, "2024-03-13").await;
    seed(&app, "USD", "JPY", 150.1, "2024-03-14").await;
    seed(&app, "JPY", "USD", 0.0067, "2024-03-14").await;

    let response = app
        .oneshot(get("/currency?fromCurrencyCode=USD&toCurrencyCode=JPY"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let days: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["reportedOn"].as_str().unwrap())
        .collect();
    assert_eq!(days, vec!["2024-03-13", "2024-03-14"]);
}

#[tokio::test]
async fn test_history_empty_for_unknown_pair() {
    let app = create_test_app();

    let response = app
        .oneshot(get("/currency?fromCurrencyCode=CHF&toCurrencyCode=SEK"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

// == Expiration ==

#[tokio::test]
async fn test_rate_expires_via_api() {
    let app = create_app_with_lifetime(Duration::from_millis(100));
    seed(&app, "USD", "EUR", 0.91, "2024-03-15").await;

    let response = app
        .clone()
        .oneshot(get("/currency/latest?fromCurrencyCode=USD&toCurrencyCode=EUR"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(250)).await;

    let response = app
        .oneshot(get("/currency/latest?fromCurrencyCode=USD&toCurrencyCode=EUR"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == GET /health ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
