//! Connection probe integration tests
//!
//! Each test starts an axum server with WebSocket routes that misbehave in
//! one specific way and checks how the probe classifies it.

use std::borrow::Cow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use lc_core::config::ProbeConfig;
use lc_probe::{ConnectionProbe, ErrorCategory, MessageKind, ProbeOutcome};

/// What the server observed from the client
#[derive(Default)]
struct Observed {
    origin: Mutex<Option<Option<String>>>,
    received: Mutex<Vec<&'static str>>,
}

/// Short windows so tests run quickly
fn fast_config() -> ProbeConfig {
    ProbeConfig {
        handshake_timeout: Duration::from_secs(2),
        message_wait: Duration::from_millis(300),
        hold_open: Duration::from_millis(200),
        close_timeout: Duration::from_secs(1),
        preview_chars: 80,
    }
}

/// Keep the socket open, recording what the client sends, until it closes
async fn record_until_closed(mut socket: WebSocket, observed: Arc<Observed>) {
    while let Some(Ok(message)) = socket.recv().await {
        let kind = match message {
            Message::Text(_) => "text",
            Message::Binary(_) => "binary",
            Message::Ping(_) => "ping",
            Message::Pong(_) => "pong",
            Message::Close(_) => "close",
        };
        observed.received.lock().unwrap().push(kind);
        if kind == "close" {
            break;
        }
    }
}

async fn silent(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(observed): State<Arc<Observed>>,
) -> Response {
    let origin = headers
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *observed.origin.lock().unwrap() = Some(origin);
    ws.on_upgrade(move |socket| record_until_closed(socket, observed))
}

async fn ready_after_delay(ws: WebSocketUpgrade, State(observed): State<Arc<Observed>>) -> Response {
    ws.on_upgrade(move |mut socket| async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        if socket.send(Message::Text("ready".into())).await.is_err() {
            return;
        }
        record_until_closed(socket, observed).await;
    })
}

async fn rfb_banner(ws: WebSocketUpgrade, State(observed): State<Arc<Observed>>) -> Response {
    ws.on_upgrade(move |mut socket| async move {
        if socket
            .send(Message::Binary(b"RFB 003.008\n".to_vec()))
            .await
            .is_err()
        {
            return;
        }
        record_until_closed(socket, observed).await;
    })
}

async fn overloaded(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|mut socket| async move {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: 1011,
                reason: Cow::from("overloaded"),
            })))
            .await;
        // Wait for the client's close reply
        while let Some(Ok(_)) = socket.recv().await {}
    })
}

async fn close_while_held(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|mut socket| async move {
        let _ = socket.send(Message::Text("hello".into())).await;
        tokio::time::sleep(Duration::from_millis(400)).await;
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: 1001,
                reason: Cow::from("going away"),
            })))
            .await;
        while let Some(Ok(_)) = socket.recv().await {}
    })
}

async fn drop_immediately(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|socket| async move {
        drop(socket);
    })
}

async fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        [("x-reject-reason", "token expired")],
        "forbidden",
    )
        .into_response()
}

/// Start the mock console server; returns its `ws://` base URL
async fn start_server(observed: Arc<Observed>) -> String {
    let app = Router::new()
        .route("/silent", get(silent))
        .route("/ready", get(ready_after_delay))
        .route("/rfb", get(rfb_banner))
        .route("/overloaded", get(overloaded))
        .route("/close-while-held", get(close_while_held))
        .route("/drop", get(drop_immediately))
        .route("/forbidden", get(forbidden))
        .with_state(observed);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock console server");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("ws://{}", addr)
}

#[tokio::test]
async fn test_silent_endpoint_is_stable() {
    let observed = Arc::new(Observed::default());
    let base = start_server(Arc::clone(&observed)).await;

    let probe = ConnectionProbe::new(fast_config());
    let report = probe.run(&format!("{}/silent?token=abc", base)).await;

    assert_eq!(
        report.outcome,
        ProbeOutcome::ConnectedAndStable {
            first_message: None,
            messages_while_held: 0,
        }
    );
    assert!(report.is_success());
    assert!(report.url.ends_with("/silent?token=REDACTED"));
    assert!(report.origin.is_none());
}

#[tokio::test]
async fn test_plain_transport_sends_no_origin_and_no_pings() {
    let observed = Arc::new(Observed::default());
    let base = start_server(Arc::clone(&observed)).await;

    let probe = ConnectionProbe::new(fast_config());
    let report = probe.run(&format!("{}/silent", base)).await;
    assert!(report.is_success());

    // Give the server a moment to record the close frame
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(*observed.origin.lock().unwrap(), Some(None));
    // The only frame the client sent was the final close
    assert_eq!(*observed.received.lock().unwrap(), vec!["close"]);
}

#[tokio::test]
async fn test_message_at_half_second_is_captured() {
    let observed = Arc::new(Observed::default());
    let base = start_server(Arc::clone(&observed)).await;

    // Default windows: 3s wait, 1s hold
    let probe = ConnectionProbe::new(ProbeConfig::default());
    let report = probe.run(&format!("{}/ready", base)).await;

    match report.outcome {
        ProbeOutcome::ConnectedAndStable {
            first_message: Some(msg),
            ..
        } => {
            assert_eq!(msg.kind, MessageKind::Text);
            assert_eq!(msg.size, 5);
            assert_eq!(msg.preview, "ready");
        }
        other => panic!("Expected stable with message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_binary_banner_preview() {
    let observed = Arc::new(Observed::default());
    let base = start_server(Arc::clone(&observed)).await;

    let probe = ConnectionProbe::new(fast_config());
    let report = probe.run(&format!("{}/rfb", base)).await;

    match report.outcome {
        ProbeOutcome::ConnectedAndStable {
            first_message: Some(msg),
            ..
        } => {
            assert_eq!(msg.kind, MessageKind::Binary);
            assert_eq!(msg.preview, "RFB 003.008\\n");
        }
        other => panic!("Expected stable with message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_close_is_connected_then_closed() {
    let observed = Arc::new(Observed::default());
    let base = start_server(Arc::clone(&observed)).await;

    let probe = ConnectionProbe::new(fast_config());
    let report = probe.run(&format!("{}/overloaded", base)).await;

    assert_eq!(
        report.outcome,
        ProbeOutcome::ConnectedThenClosed {
            code: 1011,
            reason: "overloaded".to_string(),
        }
    );
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_close_while_held_open_fails() {
    let observed = Arc::new(Observed::default());
    let base = start_server(Arc::clone(&observed)).await;

    let config = ProbeConfig {
        hold_open: Duration::from_secs(1),
        ..fast_config()
    };
    let probe = ConnectionProbe::new(config);
    let report = probe.run(&format!("{}/close-while-held", base)).await;

    assert_eq!(
        report.outcome,
        ProbeOutcome::ConnectedThenClosed {
            code: 1001,
            reason: "going away".to_string(),
        }
    );
}

#[tokio::test]
async fn test_transport_drop_is_abnormal_closure() {
    let observed = Arc::new(Observed::default());
    let base = start_server(Arc::clone(&observed)).await;

    let probe = ConnectionProbe::new(fast_config());
    let report = probe.run(&format!("{}/drop", base)).await;

    match report.outcome {
        ProbeOutcome::ConnectedThenClosed { code, .. } => assert_eq!(code, 1006),
        other => panic!("Expected ConnectedThenClosed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_handshake_carries_status_and_headers() {
    let observed = Arc::new(Observed::default());
    let base = start_server(Arc::clone(&observed)).await;

    let probe = ConnectionProbe::new(fast_config());
    let report = probe.run(&format!("{}/forbidden", base)).await;

    match report.outcome {
        ProbeOutcome::Rejected { status, headers } => {
            assert_eq!(status, 403);
            assert!(headers
                .iter()
                .any(|(k, v)| k == "x-reject-reason" && v == "token expired"));
        }
        other => panic!("Expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused_is_errored() {
    // Bind and drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let probe = ConnectionProbe::new(fast_config());
    let report = probe.run(&format!("ws://{}/console", addr)).await;

    match report.outcome {
        ProbeOutcome::Errored { category, .. } => assert_eq!(category, ErrorCategory::Io),
        other => panic!("Expected Errored, got {:?}", other),
    }
}

#[tokio::test]
async fn test_report_serializes_flat() {
    let observed = Arc::new(Observed::default());
    let base = start_server(Arc::clone(&observed)).await;

    let probe = ConnectionProbe::new(fast_config());
    let report = probe.run(&format!("{}/overloaded", base)).await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"], "connected_then_closed");
    assert_eq!(json["code"], 1011);
    assert!(json["elapsed_ms"].is_u64());
}

#[tokio::test]
async fn test_unanswered_handshake_times_out() {
    // Accepts TCP connections but never answers the upgrade request
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let config = ProbeConfig {
        handshake_timeout: Duration::from_millis(300),
        ..fast_config()
    };
    let probe = ConnectionProbe::new(config);
    let report = probe.run(&format!("ws://{}/console", addr)).await;

    match report.outcome {
        ProbeOutcome::Errored { category, .. } => assert_eq!(category, ErrorCategory::Timeout),
        other => panic!("Expected Errored, got {:?}", other),
    }
    assert!(report.elapsed_ms < 2000);
}
