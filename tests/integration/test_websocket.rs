//! Integration tests for the HTTP control API and the WebSocket event stream.
//!
//! These tests run the real server on a local port, drive the session over
//! HTTP and watch the resulting events arrive at WebSocket clients.

use std::net::TcpListener;
use std::time::Duration;

use algoviz_engine::{EngineConfig, PlaybackEvent, PlaybackStatus};
use algoviz_server::{create_router, AppState, ControlResponse};
use futures::SinkExt;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tungstenite::Message;

/// Helper to find an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Helper type for WebSocket client
type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Running test server addresses.
struct TestServer {
    http_url: String,
    ws_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawns the test server with slow playback so tests can act mid-run.
async fn spawn_test_server(speed_ms: u64) -> TestServer {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");

    let state = AppState::new(EngineConfig {
        default_speed_ms: speed_ms,
        ..EngineConfig::default()
    });
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        http_url: format!("http://{addr}/api"),
        ws_url: format!("ws://{addr}/ws"),
        _handle: handle,
    }
}

/// Connects a WebSocket client to the given URL.
async fn connect_client(url: &str) -> WsClient {
    let (ws_stream, _) = connect_async(url)
        .await
        .expect("Failed to connect to WebSocket");
    ws_stream
}

/// Receives the next text message from the WebSocket and parses it as a
/// `PlaybackEvent`. Automatically handles ping frames by responding with pong.
async fn receive_event(client: &mut WsClient) -> PlaybackEvent {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("Timeout waiting for message")
            .expect("Stream ended")
            .expect("WebSocket error");

        match msg {
            Message::Text(text) => {
                return serde_json::from_str(&text).expect("Failed to parse event");
            }
            Message::Ping(data) => {
                client
                    .send(Message::Pong(data))
                    .await
                    .expect("Failed to send pong");
            }
            Message::Pong(_) => {}
            other => panic!("Expected text message, got: {other:?}"),
        }
    }
}

/// Skips events until one with the given name arrives.
async fn receive_until(client: &mut WsClient, name: &str) -> PlaybackEvent {
    loop {
        let event = receive_event(client).await;
        if event.event_name() == name {
            return event;
        }
    }
}

/// Posts a control request and returns the decoded response.
async fn post(server: &TestServer, path: &str, body: serde_json::Value) -> ControlResponse {
    let response = reqwest::Client::new()
        .post(format!("{}/{path}", server.http_url))
        .json(&body)
        .send()
        .await
        .expect("Request failed");
    assert!(
        response.status().is_success(),
        "POST {path} failed: {}",
        response.status()
    );
    response.json().await.expect("Failed to parse response")
}

// ============================================================================
// Connection Tests
// ============================================================================

/// Tests that a WebSocket client receives a connected event on connection.
#[tokio::test]
async fn test_client_receives_connected_event_on_connect() {
    let server = spawn_test_server(500).await;

    let mut client = connect_client(&server.ws_url).await;
    let event = receive_event(&mut client).await;

    let PlaybackEvent::Connected(payload) = event else {
        panic!("Expected Connected event, got: {event:?}");
    };
    assert_eq!(payload.playback.status, PlaybackStatus::Idle);
    assert_eq!(payload.playback.cursor, None);
    assert_eq!(payload.playback.speed_ms, 500);
}

/// Tests that a client joining mid-run sees the live state in its connected event.
#[tokio::test]
async fn test_late_client_sees_current_state() {
    let server = spawn_test_server(5_000).await;

    let started = post(&server, "start", serde_json::json!({})).await;
    assert!(started.applied);
    post(&server, "pause", serde_json::json!({})).await;

    let mut client = connect_client(&server.ws_url).await;
    let PlaybackEvent::Connected(payload) = receive_event(&mut client).await else {
        panic!("Expected Connected event");
    };
    assert_eq!(payload.playback.status, PlaybackStatus::Paused);
    assert_eq!(payload.playback.cursor, Some(0));
    assert!(payload.playback.total_steps > 0);
}

// ============================================================================
// Control Over HTTP
// ============================================================================

/// Tests that actions posted over HTTP reach WebSocket clients in order.
#[tokio::test]
async fn test_http_actions_stream_to_client() {
    let server = spawn_test_server(5_000).await;
    let mut client = connect_client(&server.ws_url).await;
    receive_until(&mut client, "connected").await;

    post(&server, "input/text", serde_json::json!({ "text": "3, 2, 1" })).await;
    post(&server, "start", serde_json::json!({})).await;

    let PlaybackEvent::Started(started) = receive_event(&mut client).await else {
        panic!("Expected Started event");
    };
    assert_eq!(started.total_steps, 9);

    let PlaybackEvent::StepAdvanced(first) = receive_event(&mut client).await else {
        panic!("Expected StepAdvanced event");
    };
    assert_eq!(first.cursor, 0);
    assert_eq!(first.step.narrative, "Compare 3 and 2");

    post(&server, "pause", serde_json::json!({})).await;
    assert_eq!(receive_event(&mut client).await.event_name(), "paused");

    let response = post(&server, "seek", serde_json::json!({ "index": 4 })).await;
    assert!(response.applied);
    let PlaybackEvent::Seeked(seeked) = receive_event(&mut client).await else {
        panic!("Expected Seeked event");
    };
    assert_eq!(seeked.cursor, 4);
    assert_eq!(response.snapshot.playback.cursor, Some(4));

    post(&server, "stop", serde_json::json!({})).await;
    assert_eq!(receive_event(&mut client).await.event_name(), "cancelled");
}

/// Tests that an ignored action produces no event.
#[tokio::test]
async fn test_ignored_action_is_silent() {
    let server = spawn_test_server(5_000).await;
    let mut client = connect_client(&server.ws_url).await;
    receive_until(&mut client, "connected").await;

    let response = post(&server, "resume", serde_json::json!({})).await;
    assert!(!response.applied);

    post(&server, "speed", serde_json::json!({ "speedMs": 200 })).await;
    let PlaybackEvent::SpeedChanged(payload) = receive_event(&mut client).await else {
        panic!("Expected SpeedChanged event");
    };
    assert_eq!(payload.speed_ms, 200);
}

/// Tests that bad user input is rejected with 400 and a suggestion.
#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let server = spawn_test_server(500).await;

    let response = reqwest::Client::new()
        .post(format!("{}/input/text", server.http_url))
        .json(&serde_json::json!({ "text": "1, x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("'x' is not a whole number"));
    assert!(error.contains("Suggestion:"));
}

// ============================================================================
// Multiple Client Tests
// ============================================================================

/// Tests that every connected client receives the same events.
#[tokio::test]
async fn test_multiple_clients_receive_same_events() {
    let server = spawn_test_server(20).await;

    let mut first = connect_client(&server.ws_url).await;
    let mut second = connect_client(&server.ws_url).await;
    receive_until(&mut first, "connected").await;
    receive_until(&mut second, "connected").await;

    post(&server, "input/text", serde_json::json!({ "text": "2, 1" })).await;
    post(&server, "start", serde_json::json!({})).await;

    for client in [&mut first, &mut second] {
        let mut names = Vec::new();
        loop {
            let event = receive_event(client).await;
            names.push(event.event_name());
            if event.event_name() == "completed" {
                break;
            }
        }
        assert_eq!(
            names,
            vec![
                "started",
                "step_advanced",
                "step_advanced",
                "step_advanced",
                "step_advanced",
                "completed"
            ]
        );
    }
}

/// Tests that a disconnecting client does not disturb the others.
#[tokio::test]
async fn test_client_disconnect_does_not_affect_others() {
    let server = spawn_test_server(5_000).await;

    let mut staying = connect_client(&server.ws_url).await;
    let mut leaving = connect_client(&server.ws_url).await;
    receive_until(&mut staying, "connected").await;
    receive_until(&mut leaving, "connected").await;

    leaving.close(None).await.unwrap();
    drop(leaving);
    tokio::time::sleep(Duration::from_millis(50)).await;

    post(&server, "start", serde_json::json!({})).await;
    assert_eq!(receive_event(&mut staying).await.event_name(), "started");
    assert_eq!(receive_event(&mut staying).await.event_name(), "step_advanced");
}
