//! limen-console: console session verification
//!
//! Provides the `limen-console` CLI: authenticate against the management
//! API, pick a VM, negotiate a console session and probe its WebSocket
//! endpoint. The pipeline itself lives in [`check`] so it can be driven
//! from tests without the binary.

pub mod check;
pub mod commands;
pub mod output;
