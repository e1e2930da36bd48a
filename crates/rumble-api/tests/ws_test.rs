//! Integration tests for the WebSocket observer endpoints.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rumble_round::RoundHandle;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    round: RoundHandle,
    server: JoinHandle<()>,
    service: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
        self.service.abort();
    }
}

async fn start_test_server() -> TestServer {
    let app = common::spawn_test_app();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router;
    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        addr,
        round: app.round,
        server,
        service: app.service,
    }
}

async fn connect(server: &TestServer, path: &str) -> Socket {
    let (socket, _) = connect_async(format!("ws://{}{path}", server.addr))
        .await
        .unwrap();
    socket
}

async fn recv_json(socket: &mut Socket) -> Value {
    loop {
        match timeout(Duration::from_secs(5), socket.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return serde_json::from_str(&text).unwrap(),
            Ok(Some(Ok(Message::Close(_)))) => panic!("connection closed"),
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(e))) => panic!("frame error: {e:?}"),
            Ok(None) => panic!("stream ended"),
            Err(_) => panic!("timed out waiting for a frame"),
        }
    }
}

/// Reads frames until one of type `event_type` arrives, returning it and
/// every frame skipped on the way.
async fn recv_until(socket: &mut Socket, event_type: &str) -> (Value, Vec<Value>) {
    let mut skipped = Vec::new();
    loop {
        let frame = recv_json(socket).await;
        if frame["type"] == event_type {
            return (frame, skipped);
        }
        skipped.push(frame);
    }
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket.send(Message::Text(value.to_string())).await.unwrap();
}

#[tokio::test]
async fn test_connect_sends_welcome_then_snapshot() {
    // Arrange
    let server = start_test_server().await;
    let mut first = connect(&server, "/ws").await;
    let _ = recv_until(&mut first, "playersUpdate").await;

    // Act
    let mut second = connect(&server, "/ws").await;

    // Assert
    let welcome = recv_json(&mut second).await;
    assert_eq!(welcome["type"], "welcome");
    assert!(welcome["identity"].is_string());
    let cached = recv_json(&mut second).await;
    assert_eq!(cached["type"], "playersUpdate");
    assert_eq!(cached["state"], "WAITING");
}

#[tokio::test]
async fn test_rejection_reaches_only_the_sender() {
    // Arrange
    let server = start_test_server().await;
    let mut alice = connect(&server, "/ws").await;
    let (welcome, _) = recv_until(&mut alice, "welcome").await;
    let mut bystander = connect(&server, "/ws").await;
    let _ = recv_until(&mut bystander, "welcome").await;

    // Act
    send_json(&mut alice, json!({ "type": "enroll", "name": "Al" })).await;
    let (rejected, _) = recv_until(&mut alice, "rejected").await;
    send_json(&mut alice, json!({ "type": "enroll", "name": "Alice" })).await;

    // Assert
    assert_eq!(rejected["code"], "name_too_short");
    loop {
        let (update, skipped) = recv_until(&mut bystander, "playersUpdate").await;
        assert!(skipped.iter().all(|frame| frame["type"] != "rejected"));
        let enrolled = update["players"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["identity"] == welcome["identity"] && p["enrolled"] == true);
        if enrolled {
            break;
        }
    }
}

#[tokio::test]
async fn test_admin_observer_cannot_enroll() {
    // Arrange
    let server = start_test_server().await;
    let mut admin = connect(&server, "/admin/ws").await;
    let _ = recv_until(&mut admin, "welcome").await;

    // Act
    send_json(&mut admin, json!({ "type": "enroll", "name": "Overseer" })).await;
    sleep(Duration::from_millis(200)).await;

    // Assert
    let status = server.round.status().await.unwrap();
    assert!(status.players.is_empty());
}

#[tokio::test]
async fn test_disconnect_removes_participant() {
    // Arrange
    let server = start_test_server().await;
    let mut socket = connect(&server, "/ws").await;
    let _ = recv_until(&mut socket, "playersUpdate").await;
    assert_eq!(server.round.status().await.unwrap().players.len(), 1);

    // Act
    socket.close(None).await.unwrap();

    // Assert
    let emptied = timeout(Duration::from_secs(5), async {
        while !server.round.status().await.unwrap().players.is_empty() {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(emptied.is_ok());
}
