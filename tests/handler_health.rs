mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use live_shortener::api::handlers::{health_handler, info_handler};
use live_shortener::realtime::ObserverHandle;
use serde_json::Value;

fn server(ctx: &common::TestContext) -> TestServer {
    let app = Router::new()
        .route("/", get(info_handler))
        .route("/health", get(health_handler))
        .with_state(ctx.state.clone());

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_ok() {
    let ctx = common::create_test_state();
    let server = server(&ctx);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["realtime"]["status"], "ok");
}

#[tokio::test]
async fn test_health_reports_observers() {
    let ctx = common::create_test_state();
    let (first, _rx1) = ObserverHandle::channel(1);
    let (second, _rx2) = ObserverHandle::channel(1);
    ctx.state.registry.subscribe("AbC123", first);
    ctx.state.registry.subscribe("XyZ789", second);
    let server = server(&ctx);

    let body: Value = server.get("/health").await.json();

    assert_eq!(
        body["checks"]["realtime"]["message"],
        "2 observers on 2 codes"
    );
}

#[tokio::test]
async fn test_health_degraded_when_database_down() {
    let ctx = common::create_test_state();
    ctx.repository.set_down(true);
    let server = server(&ctx);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);

    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["database"]["status"], "error");
}

#[tokio::test]
async fn test_info_lists_endpoints() {
    let ctx = common::create_test_state();
    let server = server(&ctx);

    let response = server.get("/").await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["endpoints"]["shorten"], "POST /shorten");
    assert_eq!(
        body["endpoints"]["websocket"],
        "GET /ws/analytics/{short_code}"
    );
}
