//! Key-value store adapter
//!
//! Maps a logical `(table, key, attributes)` operation onto the primitive
//! operations the store offers: point read, upsert and filtered query.

mod dynamodb;
mod error;
#[cfg(any(test, feature = "test-utils"))]
mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

pub use dynamodb::DynamoDbStore;
pub use error::{StoreError, StoreResult};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;

use crate::expression::{compile_assignments, Attributes, ExpressionError, ExpressionResult};

/// Store-native item as returned by `DynamoDB`
pub type Item = HashMap<String, AttributeValue>;

/// Attribute stamped with the date of the first write, never overwritten
pub const CREATED_AT: &str = "createdAt";

/// `chrono` format of the [`CREATED_AT`] date
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d";

/// Attribute stamped with the id of the request behind the latest write
pub const TRANSACTION_ID: &str = "transactionId";

/// Primary key of an item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemKey {
    /// Key attribute name
    pub name: String,
    /// Key attribute value
    pub value: AttributeValue,
}

impl ItemKey {
    /// Creates a key with a string value
    #[must_use]
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::S(value.into()),
        }
    }
}

/// Precondition applied to a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteCondition {
    /// Create the item or overwrite the given fields, last write wins
    #[default]
    Upsert,
    /// Only write if no item with the same key exists
    IfAbsent,
}

/// Primitive operations the persistence layer needs from a key-value store
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Point lookup by primary key; `Ok(None)` when no item matches
    async fn read(&self, table: &str, key: &ItemKey) -> StoreResult<Option<Item>>;

    /// Upserts `attributes` on the item identified by `key`.
    ///
    /// Always stamps [`TRANSACTION_ID`], and [`CREATED_AT`] when the item
    /// does not carry one yet.
    async fn write(
        &self,
        table: &str,
        key: &ItemKey,
        attributes: &Attributes,
        transaction_id: &str,
        condition: WriteCondition,
    ) -> StoreResult<()>;

    /// Exact-match lookup on a secondary index, narrowed by equality filters
    async fn scan(
        &self,
        table: &str,
        index_name: &str,
        index_key_name: &str,
        index_key_value: AttributeValue,
        filters: &Attributes,
    ) -> StoreResult<Vec<Item>>;

    /// Returns every item of the table (first page only)
    async fn scan_all(&self, table: &str) -> StoreResult<Vec<Item>>;
}

/// A fully built `UpdateItem` request, independent of the SDK client
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    /// `SET ...` expression
    pub update_expression: String,
    /// Optional condition guarding the write
    pub condition_expression: Option<String>,
    /// Placeholder names
    pub names: HashMap<String, String>,
    /// Placeholder values
    pub values: HashMap<String, AttributeValue>,
}

/// Rejects caller attributes that would clash with the key or with the
/// attributes the adapter manages itself.
///
/// # Errors
///
/// Returns [`ExpressionError::ReservedName`] on a clash
pub fn check_writable(key: &ItemKey, attributes: &Attributes) -> ExpressionResult<()> {
    for reserved in [key.name.as_str(), CREATED_AT, TRANSACTION_ID] {
        if attributes.contains(reserved) {
            return Err(ExpressionError::ReservedName(reserved.to_string()));
        }
    }
    Ok(())
}

/// Builds the update request for [`ItemStore::write`]
///
/// # Errors
///
/// Returns [`ExpressionError`] if the attributes are not writable
pub fn plan_update(
    key: &ItemKey,
    attributes: &Attributes,
    transaction_id: &str,
    created_on: &str,
    condition: WriteCondition,
) -> ExpressionResult<UpdatePlan> {
    check_writable(key, attributes)?;

    let mut update_expression = String::from(
        "SET #createdAt = if_not_exists(#createdAt, :createdAt), #transactionId = :transactionId",
    );
    let mut names = HashMap::from([
        ("#createdAt".to_string(), CREATED_AT.to_string()),
        ("#transactionId".to_string(), TRANSACTION_ID.to_string()),
    ]);
    let mut values = HashMap::from([
        (
            ":createdAt".to_string(),
            AttributeValue::S(created_on.to_string()),
        ),
        (
            ":transactionId".to_string(),
            AttributeValue::S(transaction_id.to_string()),
        ),
    ]);

    let assignments = compile_assignments("attr", attributes)?;
    if !assignments.is_empty() {
        update_expression.push_str(", ");
        update_expression.push_str(&assignments.expression);
    }
    names.extend(assignments.names);
    values.extend(assignments.values);

    let condition_expression = match condition {
        WriteCondition::Upsert => None,
        WriteCondition::IfAbsent => {
            names.insert("#key".to_string(), key.name.clone());
            Some("attribute_not_exists(#key)".to_string())
        }
    };

    Ok(UpdatePlan {
        update_expression,
        condition_expression,
        names,
        values,
    })
}
