//! Probe outcome types

use serde::Serialize;
use std::fmt;

/// Close code used when the transport drops without a close frame
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Close code used when a close frame carries no status
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Kind of a data message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Binary,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Binary => write!(f, "binary"),
        }
    }
}

/// What was captured from the first inbound message.
///
/// The content is never parsed; only its size and a short preview are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSummary {
    /// Text or binary frame
    pub kind: MessageKind,
    /// Payload size in bytes
    pub size: usize,
    /// Leading characters, control characters escaped
    pub preview: String,
}

impl MessageSummary {
    /// Summarize a text payload
    pub fn text(payload: &str, preview_chars: usize) -> Self {
        Self {
            kind: MessageKind::Text,
            size: payload.len(),
            preview: preview(payload, preview_chars),
        }
    }

    /// Summarize a binary payload (lossy UTF-8 of the leading bytes)
    pub fn binary(payload: &[u8], preview_chars: usize) -> Self {
        let head = &payload[..payload.len().min(preview_chars)];
        Self {
            kind: MessageKind::Binary,
            size: payload.len(),
            preview: preview(&String::from_utf8_lossy(head), preview_chars),
        }
    }
}

fn preview(payload: &str, max_chars: usize) -> String {
    payload
        .chars()
        .take(max_chars)
        .map(|c| {
            if c.is_control() {
                c.escape_default().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}

/// Category of a transport-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Timeout,
    Io,
    Tls,
    Url,
    Protocol,
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Io => "io",
            ErrorCategory::Tls => "tls",
            ErrorCategory::Url => "url",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Classified result of one probe run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Handshake succeeded and the connection stayed up.
    ///
    /// `first_message` is `None` when the server stayed silent for the whole
    /// wait window, which still counts as healthy.
    ConnectedAndStable {
        first_message: Option<MessageSummary>,
        /// Data messages received while the connection was held open
        messages_while_held: usize,
    },

    /// Handshake succeeded but the server closed the connection
    ConnectedThenClosed { code: u16, reason: String },

    /// Server answered the upgrade request with a non-101 HTTP response
    Rejected {
        status: u16,
        headers: Vec<(String, String)>,
    },

    /// Any other transport-level failure
    Errored {
        category: ErrorCategory,
        message: String,
    },
}

impl ProbeOutcome {
    /// Whether the run counts as a pass
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::ConnectedAndStable { .. })
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::ConnectedAndStable {
                first_message: Some(msg),
                ..
            } => write!(
                f,
                "connection is stable (received {} message, {} bytes: {})",
                msg.kind, msg.size, msg.preview
            ),
            ProbeOutcome::ConnectedAndStable {
                first_message: None,
                ..
            } => write!(f, "connection is stable (no message received, idle)"),
            ProbeOutcome::ConnectedThenClosed { code, reason } => {
                let reason = if reason.is_empty() { "none" } else { reason };
                write!(f, "connection closed by server: code={}, reason={}", code, reason)
            }
            ProbeOutcome::Rejected { status, .. } => {
                write!(f, "handshake rejected: HTTP {}", status)
            }
            ProbeOutcome::Errored { category, message } => {
                write!(f, "connection error ({}): {}", category, message)
            }
        }
    }
}

/// Outcome plus the context needed to report it
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Endpoint with its token redacted
    pub url: String,
    /// Origin presented in the handshake, if any
    pub origin: Option<String>,
    /// Classified result
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
    /// Wall time from start of handshake to end of close
    pub elapsed_ms: u64,
}

impl ProbeReport {
    /// Whether the run counts as a pass
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
