//! lc-api: Management API client for limen-console
//!
//! Covers the three HTTP stages that precede a console probe:
//! resolving credentials into an access token, discovering a virtual
//! machine to target, and negotiating a console session descriptor.
//! Each stage is written against the [`ConsoleApi`] trait so the
//! orchestration can be exercised without a live server.

pub mod auth;
pub mod client;
pub mod discovery;
pub mod error;
pub mod negotiate;

#[cfg(test)]
mod testing;

pub use auth::{resolve_token, SecretSource};
pub use client::{ApiClient, ConsoleApi};
pub use discovery::first_resource;
pub use error::ApiError;
pub use negotiate::negotiate_console;
