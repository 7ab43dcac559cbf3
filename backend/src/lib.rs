//! User profile service
//!
//! HTTP front of the users table: register, read and update user records.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

/// Request middleware
pub mod middleware;

/// HTTP routes
pub mod routes;

/// Server setup
pub mod server;

/// Shared types: configuration, errors, extractors
pub mod types;
