//! User records and their storage

mod error;

use std::sync::Arc;

use aws_sdk_dynamodb::types::AttributeValue;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

pub use error::{UserStorageError, UserStorageResult};

use crate::expression::Attributes;
use crate::store::{ItemKey, ItemStore, StoreError, WriteCondition};

/// `chrono` format of `registeredIn` / `updatedIn`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Level every new user starts at
pub const STARTING_LEVEL: u64 = 1;

/// `DynamoDB` attribute names for the users table
#[derive(Debug, Clone, Copy, Display)]
#[strum(serialize_all = "camelCase")]
pub enum UserAttribute {
    /// Primary key
    Username,
    /// Originating address of the latest write
    Ip,
    /// Player level
    Level,
    /// Experience points
    Experience,
    /// Soft currency balance
    Coins,
    /// Hard currency balance
    Gems,
    /// Request id of the latest write
    TransactionId,
    /// Date of the first write
    CreatedAt,
    /// Registration timestamp
    RegisteredIn,
    /// Timestamp of the latest update
    UpdatedIn,
}

/// Ambient data about the request producing a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Opaque id of the request, stamped onto the record
    pub transaction_id: String,
    /// Client address, if the request carried one
    pub ip: Option<String>,
}

/// The four mutable counters of a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    /// Player level
    pub level: u64,
    /// Experience points
    pub experience: u64,
    /// Coins balance
    pub coins: u64,
    /// Gems balance
    pub gems: u64,
}

/// User record as stored in the users table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Unique username (primary key)
    pub username: String,
    /// Player level
    #[serde(default)]
    pub level: u64,
    /// Experience points
    #[serde(default)]
    pub experience: u64,
    /// Coins balance
    #[serde(default)]
    pub coins: u64,
    /// Gems balance
    #[serde(default)]
    pub gems: u64,
    /// Client address of the latest write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Request id of the latest write
    #[serde(default)]
    pub transaction_id: String,
    /// Date of the first write, assigned by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// When the user registered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_in: Option<String>,
    /// When the user was last updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_in: Option<String>,
}

impl UserRecord {
    /// Builds the record of a freshly registered user: level 1, everything else zero
    #[must_use]
    pub fn registration(
        username: impl Into<String>,
        context: &RequestContext,
        registered_in: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            level: STARTING_LEVEL,
            experience: 0,
            coins: 0,
            gems: 0,
            ip: context.ip.clone(),
            transaction_id: context.transaction_id.clone(),
            created_at: None,
            registered_in: Some(registered_in.into()),
            updated_in: None,
        }
    }

    /// Builds the record for an update.
    ///
    /// All four counters are written as given; there is no per-field merge.
    #[must_use]
    pub fn update(
        username: impl Into<String>,
        stats: UserStats,
        context: &RequestContext,
        updated_in: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            level: stats.level,
            experience: stats.experience,
            coins: stats.coins,
            gems: stats.gems,
            ip: context.ip.clone(),
            transaction_id: context.transaction_id.clone(),
            created_at: None,
            registered_in: None,
            updated_in: Some(updated_in.into()),
        }
    }

    /// Current counters
    #[must_use]
    pub const fn stats(&self) -> UserStats {
        UserStats {
            level: self.level,
            experience: self.experience,
            coins: self.coins,
            gems: self.gems,
        }
    }

    /// Primary key of this record
    #[must_use]
    pub fn key(&self) -> ItemKey {
        user_key(&self.username)
    }

    /// Attributes written on save.
    ///
    /// Excludes the key and the attributes the store adapter stamps itself
    /// (`transactionId`, `createdAt`). Unset optional fields are skipped so
    /// they keep their stored value: a write without a client address leaves
    /// the `ip` of an earlier write in place.
    #[must_use]
    pub fn attributes(&self) -> Attributes {
        let mut attributes = Attributes::new()
            .with(UserAttribute::Level.to_string(), number(self.level))
            .with(UserAttribute::Experience.to_string(), number(self.experience))
            .with(UserAttribute::Coins.to_string(), number(self.coins))
            .with(UserAttribute::Gems.to_string(), number(self.gems));

        let optional = [
            (UserAttribute::Ip, &self.ip),
            (UserAttribute::RegisteredIn, &self.registered_in),
            (UserAttribute::UpdatedIn, &self.updated_in),
        ];
        for (attribute, value) in optional {
            if let Some(value) = value {
                attributes.insert(attribute.to_string(), AttributeValue::S(value.clone()));
            }
        }

        attributes
    }
}

fn number(value: u64) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

fn user_key(username: &str) -> ItemKey {
    ItemKey::string(UserAttribute::Username.to_string(), username)
}

/// Storage client for user operations
pub struct UserStorage {
    store: Arc<dyn ItemStore>,
    table_name: String,
}

impl UserStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `store` - Store adapter holding the users table
    /// * `table_name` - Name of the users table
    #[must_use]
    pub fn new(store: Arc<dyn ItemStore>, table_name: String) -> Self {
        Self { store, table_name }
    }

    /// Get a single user by username
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError` if the read fails or the item cannot be parsed
    pub async fn get(&self, username: &str) -> UserStorageResult<Option<UserRecord>> {
        self.store
            .read(&self.table_name, &user_key(username))
            .await?
            .map(|item| serde_dynamo::from_item(item).map_err(UserStorageError::from))
            .transpose()
    }

    /// Registers a new user
    ///
    /// Checks for an existing user first, then writes with an
    /// insert-only-if-absent condition so a concurrent registration of the
    /// same username cannot slip in between the two round trips.
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError::UserExists` if the username is taken, or
    /// another `UserStorageError` if the store fails
    pub async fn create(&self, record: &UserRecord) -> UserStorageResult<()> {
        let key = record.key();

        if self.store.read(&self.table_name, &key).await?.is_some() {
            return Err(UserStorageError::UserExists(record.username.clone()));
        }

        self.store
            .write(
                &self.table_name,
                &key,
                &record.attributes(),
                &record.transaction_id,
                WriteCondition::IfAbsent,
            )
            .await
            .map_err(|err| match err {
                StoreError::ConditionFailed => {
                    UserStorageError::UserExists(record.username.clone())
                }
                err => err.into(),
            })
    }

    /// Overwrites the counters of a user, creating it if missing
    ///
    /// # Errors
    ///
    /// Returns `UserStorageError` if the store fails
    pub async fn update(&self, record: &UserRecord) -> UserStorageResult<()> {
        self.store
            .write(
                &self.table_name,
                &record.key(),
                &record.attributes(),
                &record.transaction_id,
                WriteCondition::Upsert,
            )
            .await?;

        Ok(())
    }
}
