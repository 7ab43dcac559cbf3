//! Error types for user storage operations

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias for user storage operations
pub type UserStorageResult<T> = Result<T, UserStorageError>;

/// User storage error types
#[derive(Debug, Error)]
pub enum UserStorageError {
    /// A user with this username is already registered
    #[error("The user {0} already exists")]
    UserExists(String),

    /// The underlying store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failed to parse a user from a `DynamoDB` item
    #[error("Failed to parse user: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for UserStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
