//! User storage for the user profile service
//!
//! This crate holds the persistence side of the service: a small adapter that
//! turns ordered attribute lists into `DynamoDB` reads, upserts and index
//! queries, and the user record model built on top of it.

pub mod expression;
pub mod store;
pub mod user;
