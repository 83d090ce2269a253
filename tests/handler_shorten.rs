mod common;

use axum::{Router, routing::post};
use axum_test::TestServer;
use live_shortener::api::dto::shorten::ShortenResponse;
use live_shortener::api::handlers::shorten_handler;
use serde_json::{Value, json};

fn server(ctx: &common::TestContext) -> TestServer {
    let app = Router::new()
        .route("/shorten", post(shorten_handler))
        .with_state(ctx.state.clone());

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_shorten_success() {
    let ctx = common::create_test_state();
    let server = server(&ctx);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com/some/long/path" }))
        .await;

    response.assert_status_ok();

    let body: ShortenResponse = response.json();
    assert_eq!(body.short_code.len(), 6);
    assert!(body.short_code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(
        body.shortened_url,
        format!("{}/{}", common::BASE_URL, body.short_code)
    );
    assert_eq!(body.original_url, "https://example.com/some/long/path");

    let stored = ctx.repository.get(&body.short_code).unwrap();
    assert_eq!(stored.redirect_count, 0);
}

#[tokio::test]
async fn test_shorten_normalizes_url() {
    let ctx = common::create_test_state();
    let server = server(&ctx);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "  HTTPS://Example.COM:443/path?q=1#section  " }))
        .await;

    response.assert_status_ok();

    let body: ShortenResponse = response.json();
    assert_eq!(body.original_url, "https://example.com/path?q=1#section");
}

#[tokio::test]
async fn test_shorten_same_url_twice_gets_distinct_codes() {
    let ctx = common::create_test_state();
    let server = server(&ctx);

    let first: ShortenResponse = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .json();
    let second: ShortenResponse = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .json();

    assert_ne!(first.short_code, second.short_code);
    assert_eq!(ctx.repository.len(), 2);
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let ctx = common::create_test_state();
    let server = server(&ctx);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "not-a-valid-url" }))
        .await;

    assert_eq!(response.status_code(), 422);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(ctx.repository.len(), 0);
}

#[tokio::test]
async fn test_shorten_rejects_non_http_scheme() {
    let ctx = common::create_test_state();
    let server = server(&ctx);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "ftp://files.example.com/archive.zip" }))
        .await;

    assert_eq!(response.status_code(), 422);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_shorten_missing_field() {
    let ctx = common::create_test_state();
    let server = server(&ctx);

    let response = server.post("/shorten").json(&json!({})).await;

    assert_eq!(response.status_code(), 422);
}

#[tokio::test]
async fn test_shorten_store_unavailable() {
    let ctx = common::create_test_state();
    ctx.repository.set_down(true);
    let server = server(&ctx);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), 500);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "internal_error");
}
