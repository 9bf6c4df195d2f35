//! lc-core: Core types and configuration for limen-console
//!
//! This crate provides the domain types handed from stage to stage
//! (credentials, tokens, resource handles, console descriptors), the
//! configuration structures, and the shared error types used by the API
//! client, the connection probe and the CLI.

pub mod config;
pub mod error;
pub mod redact;
pub mod types;

pub use error::ConfigError;
pub use types::{AccessToken, ConsoleSessionDescriptor, Credential, ResourceHandle, ResourceSummary};
