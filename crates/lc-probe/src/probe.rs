//! Console endpoint probe
//!
//! Idle → Handshaking → {Rejected | Errored}
//!                    → Waiting → {ConnectedThenClosed}
//!                              → HeldOpen → {ConnectedThenClosed}
//!                                         → Closing → ConnectedAndStable
//!
//! The WebSocket stream is owned by [`ConnectionProbe::run`] and dropped on
//! every return path, so the socket is always released.

use std::time::{Duration, Instant as StdInstant};

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use lc_core::config::ProbeConfig;
use lc_core::redact::redact_url;

use crate::outcome::{
    ErrorCategory, MessageSummary, ProbeOutcome, ProbeReport, CLOSE_ABNORMAL, CLOSE_NO_STATUS,
};
use crate::target::ProbeTarget;

type ConsoleStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Roughly 30 years
const FAR_FUTURE_SECS: u64 = 86400 * 365 * 30;

/// What a bounded listen window ended with
enum Listen {
    /// Window elapsed
    Quiet,
    /// A data message arrived
    Message(MessageSummary),
    /// Server closed (or the transport dropped)
    Closed { code: u16, reason: String },
    /// Non-close transport failure
    Failed(WsError),
}

/// Single-shot console connection probe
#[derive(Debug, Clone)]
pub struct ConnectionProbe {
    config: ProbeConfig,
}

impl ConnectionProbe {
    /// Create a probe with the given timing bounds
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Open `endpoint`, listen briefly, close, and classify the result.
    pub async fn run(&self, endpoint: &str) -> ProbeReport {
        let started = StdInstant::now();
        let url = redact_url(endpoint);

        let target = match ProbeTarget::parse(endpoint) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Refusing to probe {}: {}", url, e);
                return ProbeReport {
                    url,
                    origin: None,
                    outcome: ProbeOutcome::Errored {
                        category: ErrorCategory::Url,
                        message: e.to_string(),
                    },
                    elapsed_ms: elapsed_ms(started),
                };
            }
        };

        let origin = target.handshake_origin();
        let outcome = self.probe(&target, origin.as_deref(), &url).await;

        ProbeReport {
            url,
            origin,
            outcome,
            elapsed_ms: elapsed_ms(started),
        }
    }

    async fn probe(&self, target: &ProbeTarget, origin: Option<&str>, url: &str) -> ProbeOutcome {
        tracing::info!("Connecting to {}", url);

        let mut request = match target.url().as_str().into_client_request() {
            Ok(request) => request,
            Err(e) => return classify_handshake_error(e),
        };
        if let Some(origin) = origin {
            match HeaderValue::from_str(origin) {
                Ok(value) => {
                    request.headers_mut().insert(ORIGIN, value);
                }
                Err(e) => {
                    return ProbeOutcome::Errored {
                        category: ErrorCategory::Url,
                        message: format!("invalid origin '{}': {}", origin, e),
                    }
                }
            }
        }

        // tungstenite never pings on its own and does not negotiate
        // compression, so the only traffic is what the server sends.
        let handshake = timeout(
            self.config.handshake_timeout,
            tokio_tungstenite::connect_async(request),
        )
        .await;

        let mut ws = match handshake {
            Err(_) => {
                return ProbeOutcome::Errored {
                    category: ErrorCategory::Timeout,
                    message: format!(
                        "handshake did not complete within {:?}",
                        self.config.handshake_timeout
                    ),
                }
            }
            Ok(Err(e)) => return classify_handshake_error(e),
            Ok(Ok((ws, response))) => {
                tracing::info!("Connection opened (HTTP {})", response.status().as_u16());
                ws
            }
        };

        // Waiting: first inbound message, closure, or a quiet window
        let wait_deadline = deadline_after(self.config.message_wait);
        let first_message = match self.listen(&mut ws, wait_deadline).await {
            Listen::Quiet => {
                tracing::info!(
                    "No message within {:?}; connection is idle",
                    self.config.message_wait
                );
                None
            }
            Listen::Message(summary) => {
                tracing::info!(
                    "Received {} message ({} bytes): {}",
                    summary.kind,
                    summary.size,
                    summary.preview
                );
                Some(summary)
            }
            Listen::Closed { code, reason } => {
                tracing::warn!("Server closed connection: code={}, reason={:?}", code, reason);
                return ProbeOutcome::ConnectedThenClosed { code, reason };
            }
            Listen::Failed(e) => return classify_stream_error(e),
        };

        // HeldOpen: the connection must not close on its own
        let hold_deadline = deadline_after(self.config.hold_open);
        let mut messages_while_held = 0;
        loop {
            match self.listen(&mut ws, hold_deadline).await {
                Listen::Quiet => break,
                Listen::Message(_) => messages_while_held += 1,
                Listen::Closed { code, reason } => {
                    tracing::warn!(
                        "Server closed connection while held open: code={}, reason={:?}",
                        code,
                        reason
                    );
                    return ProbeOutcome::ConnectedThenClosed { code, reason };
                }
                Listen::Failed(e) => return classify_stream_error(e),
            }
        }

        self.close(&mut ws).await;

        ProbeOutcome::ConnectedAndStable {
            first_message,
            messages_while_held,
        }
    }

    /// Read until a data message, a close, an error, or `deadline`.
    ///
    /// Control frames are not data and do not end the window.
    async fn listen(&self, ws: &mut ConsoleStream, deadline: Instant) -> Listen {
        loop {
            let next = match timeout_at(deadline, ws.next()).await {
                Err(_) => return Listen::Quiet,
                Ok(next) => next,
            };

            match next {
                None => {
                    return Listen::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: String::new(),
                    }
                }
                Some(Ok(Message::Text(text))) => {
                    return Listen::Message(MessageSummary::text(&text, self.config.preview_chars))
                }
                Some(Ok(Message::Binary(data))) => {
                    return Listen::Message(MessageSummary::binary(
                        &data,
                        self.config.preview_chars,
                    ))
                }
                Some(Ok(Message::Close(frame))) => return closed_by(frame),
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                    tracing::trace!("Ignoring control frame");
                }
                Some(Err(e)) if is_transport_drop(&e) => {
                    tracing::debug!("Transport dropped: {}", e);
                    return Listen::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: String::new(),
                    };
                }
                Some(Err(e)) => return Listen::Failed(e),
            }
        }
    }

    /// Closing handshake, bounded by `close_timeout`.
    ///
    /// A slow or failed close is logged and otherwise ignored: the
    /// connection already proved stable.
    async fn close(&self, ws: &mut ConsoleStream) {
        let closing = async {
            ws.close(None).await?;
            while let Some(message) = ws.next().await {
                if let Message::Close(_) = message? {
                    break;
                }
            }
            Ok::<(), WsError>(())
        };

        match timeout(self.config.close_timeout, closing).await {
            Ok(Ok(())) => tracing::info!("Connection closed cleanly"),
            Ok(Err(e)) if is_transport_drop(&e) => {
                tracing::debug!("Connection closed during close handshake: {}", e)
            }
            Ok(Err(e)) => tracing::warn!("Close handshake failed: {}", e),
            Err(_) => tracing::warn!(
                "Close handshake did not complete within {:?}",
                self.config.close_timeout
            ),
        }
    }
}

/// `now + window`, saturating far in the future instead of overflowing
fn deadline_after(window: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(window)
        .unwrap_or_else(|| now + Duration::from_secs(FAR_FUTURE_SECS))
}

fn elapsed_ms(started: StdInstant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn closed_by(frame: Option<CloseFrame<'static>>) -> Listen {
    match frame {
        Some(frame) => Listen::Closed {
            code: u16::from(frame.code),
            reason: frame.reason.into_owned(),
        },
        None => Listen::Closed {
            code: CLOSE_NO_STATUS,
            reason: String::new(),
        },
    }
}

/// Errors that mean the peer went away rather than misbehaved
fn is_transport_drop(err: &WsError) -> bool {
    use tokio_tungstenite::tungstenite::error::ProtocolError;

    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed | WsError::Io(_) => true,
        WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => true,
        _ => false,
    }
}

fn error_category(err: &WsError) -> ErrorCategory {
    match err {
        WsError::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => ErrorCategory::Timeout,
        WsError::Io(_) | WsError::ConnectionClosed | WsError::AlreadyClosed => ErrorCategory::Io,
        WsError::Tls(_) => ErrorCategory::Tls,
        WsError::Url(_) => ErrorCategory::Url,
        WsError::Protocol(_) | WsError::HttpFormat(_) | WsError::Utf8 | WsError::Capacity(_) => {
            ErrorCategory::Protocol
        }
        _ => ErrorCategory::Other,
    }
}

/// Map a failed opening handshake onto `Rejected` or `Errored`
fn classify_handshake_error(err: WsError) -> ProbeOutcome {
    match err {
        WsError::Http(response) => {
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or("<non-ascii>").to_string(),
                    )
                })
                .collect();
            tracing::warn!("Handshake rejected: HTTP {}", status);
            ProbeOutcome::Rejected { status, headers }
        }
        other => {
            let category = error_category(&other);
            tracing::warn!("Handshake failed ({}): {}", category, other);
            ProbeOutcome::Errored {
                category,
                message: other.to_string(),
            }
        }
    }
}

/// Map a read failure after the handshake onto `Errored`
fn classify_stream_error(err: WsError) -> ProbeOutcome {
    let category = error_category(&err);
    tracing::warn!("Connection error ({}): {}", category, err);
    ProbeOutcome::Errored {
        category,
        message: err.to_string(),
    }
}
