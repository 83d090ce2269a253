mod common;

use axum::ServiceExt;
use axum::extract::Request;
use futures::{SinkExt, StreamExt};
use live_shortener::realtime::{ObserverMessage, SessionSettings};
use live_shortener::routes::app_router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn spawn_server(ctx: &common::TestContext) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_router(ctx.state.clone());

    tokio::spawn(async move {
        axum::serve(
            listener,
            ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
        )
        .await
        .unwrap();
    });

    addr
}

async fn connect(addr: SocketAddr, code: &str) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws/analytics/{code}"))
        .await
        .unwrap();
    client
}

async fn next_message(client: &mut Client) -> ObserverMessage {
    loop {
        let frame = timeout(WAIT, client.next())
            .await
            .expect("no message within timeout")
            .expect("connection closed")
            .unwrap();

        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn wait_for_observers(ctx: &common::TestContext, code: &str, expected: usize) {
    timeout(WAIT, async {
        while ctx.state.registry.observer_count(code) != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("observer count never settled");
}

#[tokio::test]
async fn test_snapshot_then_live_updates() {
    let ctx = common::create_test_state();
    ctx.repository.insert("AbC123", "https://example.com/", 3);
    let addr = spawn_server(&ctx).await;

    let mut client = connect(addr, "AbC123").await;

    match next_message(&mut client).await {
        ObserverMessage::Snapshot(snapshot) => {
            assert_eq!(snapshot.short_code, "AbC123");
            assert_eq!(snapshot.redirect_count, 3);
        }
        other => panic!("expected snapshot, got {other:?}"),
    }

    ctx.state.link_service.record_redirect("AbC123").await.unwrap();
    ctx.state.link_service.record_redirect("AbC123").await.unwrap();

    for expected in [4, 5] {
        match next_message(&mut client).await {
            ObserverMessage::Update(update) => {
                assert_eq!(update.short_code, "AbC123");
                assert_eq!(update.redirect_count, expected);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_every_observer_of_a_code_receives_update() {
    let ctx = common::create_test_state();
    ctx.repository.insert("AbC123", "https://example.com/", 0);
    ctx.repository.insert("XyZ789", "https://example.org/", 0);
    let addr = spawn_server(&ctx).await;

    let mut first = connect(addr, "AbC123").await;
    let mut second = connect(addr, "AbC123").await;
    let mut elsewhere = connect(addr, "XyZ789").await;

    for client in [&mut first, &mut second, &mut elsewhere] {
        assert!(matches!(
            next_message(client).await,
            ObserverMessage::Snapshot(_)
        ));
    }

    ctx.state.link_service.record_redirect("AbC123").await.unwrap();
    ctx.state.link_service.record_redirect("XyZ789").await.unwrap();

    for client in [&mut first, &mut second] {
        match next_message(client).await {
            ObserverMessage::Update(update) => {
                assert_eq!(update.short_code, "AbC123");
                assert_eq!(update.redirect_count, 1);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    match next_message(&mut elsewhere).await {
        ObserverMessage::Update(update) => assert_eq!(update.short_code, "XyZ789"),
        other => panic!("expected update, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_code_gets_heartbeats_without_snapshot() {
    let ctx = common::create_test_state_with(SessionSettings {
        heartbeat_interval: Duration::from_millis(100),
        buffer: 8,
    });
    let addr = spawn_server(&ctx).await;

    let mut client = connect(addr, "nothere").await;

    assert!(matches!(
        next_message(&mut client).await,
        ObserverMessage::Heartbeat(_)
    ));
    assert!(matches!(
        next_message(&mut client).await,
        ObserverMessage::Heartbeat(_)
    ));
    assert_eq!(ctx.state.registry.observer_count("nothere"), 1);
}

#[tokio::test]
async fn test_code_created_after_subscribe_streams_updates() {
    let ctx = common::create_test_state_with(SessionSettings {
        heartbeat_interval: Duration::from_secs(30),
        buffer: 8,
    });
    let addr = spawn_server(&ctx).await;

    let mut client = connect(addr, "later1").await;
    wait_for_observers(&ctx, "later1", 1).await;

    ctx.repository.insert("later1", "https://example.com/", 0);
    ctx.state.link_service.record_redirect("later1").await.unwrap();

    match next_message(&mut client).await {
        ObserverMessage::Update(update) => assert_eq!(update.redirect_count, 1),
        other => panic!("expected update, got {other:?}"),
    }
}

#[tokio::test]
async fn test_disconnect_unsubscribes() {
    let ctx = common::create_test_state();
    ctx.repository.insert("AbC123", "https://example.com/", 0);
    let addr = spawn_server(&ctx).await;

    let mut client = connect(addr, "AbC123").await;
    next_message(&mut client).await;
    assert_eq!(ctx.state.registry.observer_count("AbC123"), 1);

    client.send(Message::Close(None)).await.unwrap();

    wait_for_observers(&ctx, "AbC123", 0).await;
    assert!(!ctx.state.registry.has_subscribers("AbC123"));
    assert_eq!(ctx.state.registry.total_observers(), 0);

    ctx.state.link_service.record_redirect("AbC123").await.unwrap();
}

#[tokio::test]
async fn test_dropped_connection_unsubscribes() {
    let ctx = common::create_test_state();
    ctx.repository.insert("AbC123", "https://example.com/", 0);
    let addr = spawn_server(&ctx).await;

    let mut client = connect(addr, "AbC123").await;
    next_message(&mut client).await;

    drop(client);

    wait_for_observers(&ctx, "AbC123", 0).await;
}
