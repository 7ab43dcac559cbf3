//! Error types for the key-value store adapter

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    get_item::GetItemError, query::QueryError, scan::ScanError, update_item::UpdateItemError,
};
use thiserror::Error;

use crate::expression::ExpressionError;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error types, carrying the native `DynamoDB` diagnostic unchanged
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read an item from `DynamoDB`
    #[error("Failed to get item from DynamoDB: {0:?}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to write an item to `DynamoDB`
    #[error("Failed to update item in DynamoDB: {0:?}")]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Failed to query a secondary index
    #[error("Failed to query DynamoDB index: {0:?}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to scan a table
    #[error("Failed to scan DynamoDB table: {0:?}")]
    DynamoDbScanError(#[from] SdkError<ScanError>),

    /// A conditional write found an existing item
    #[error("Conditional write rejected: item already exists")]
    ConditionFailed,

    /// The attribute list could not be compiled
    #[error("Invalid attributes: {0}")]
    Expression(#[from] ExpressionError),
}
