//! lc-probe: Console WebSocket connection probe
//!
//! Opens a negotiated console endpoint, listens for a bounded time without
//! speaking the console protocol, and classifies what happened. The probe
//! never returns `Err` for a classified outcome: rejected handshakes,
//! server-side closes and transport errors are all [`ProbeOutcome`] values.

pub mod outcome;
pub mod probe;
pub mod target;

pub use outcome::{ErrorCategory, MessageKind, MessageSummary, ProbeOutcome, ProbeReport};
pub use probe::ConnectionProbe;
pub use target::{ProbeTarget, TargetError};
