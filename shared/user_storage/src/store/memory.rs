//! In-memory [`ItemStore`] used as a fake store in tests

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError,
};

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::SdkError, types::AttributeValue};

use super::{
    plan_update, Item, ItemKey, ItemStore, StoreError, StoreResult, WriteCondition, CREATED_AT,
    CREATED_AT_FORMAT, TRANSACTION_ID,
};
use crate::expression::Attributes;

/// Tables keyed by name, each a flat list of items.
///
/// Every write runs under a single lock, so conditional writes are atomic
/// the same way they are on `DynamoDB`.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Item>>>,
    unavailable: AtomicBool,
    created_on: Option<String>,
}

impl MemoryStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the date stamped into `createdAt`
    #[must_use]
    pub fn with_created_on(mut self, created_on: impl Into<String>) -> Self {
        self.created_on = Some(created_on.into());
        self
    }

    /// Makes every subsequent operation fail with a timeout, as an
    /// unreachable store would
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of items stored in `table`
    #[must_use]
    pub fn item_count(&self, table: &str) -> usize {
        self.lock().get(table).map_or(0, Vec::len)
    }

    fn is_unavailable(&self) -> bool {
        self.unavailable.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Item>>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn created_on(&self) -> String {
        self.created_on
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().format(CREATED_AT_FORMAT).to_string())
    }
}

fn has_attribute(item: &Item, name: &str, value: &AttributeValue) -> bool {
    item.get(name) == Some(value)
}

fn unavailable<E>() -> SdkError<E> {
    SdkError::timeout_error("store unavailable")
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn read(&self, table: &str, key: &ItemKey) -> StoreResult<Option<Item>> {
        if self.is_unavailable() {
            return Err(StoreError::DynamoDbGetError(unavailable()));
        }

        Ok(self.lock().get(table).and_then(|items| {
            items
                .iter()
                .find(|item| has_attribute(item, &key.name, &key.value))
                .cloned()
        }))
    }

    async fn write(
        &self,
        table: &str,
        key: &ItemKey,
        attributes: &Attributes,
        transaction_id: &str,
        condition: WriteCondition,
    ) -> StoreResult<()> {
        if self.is_unavailable() {
            return Err(StoreError::DynamoDbUpdateError(unavailable()));
        }
        let created_on = self.created_on();
        // Same input checks as the DynamoDB adapter
        plan_update(key, attributes, transaction_id, &created_on, condition)?;

        let mut tables = self.lock();
        let items = tables.entry(table.to_string()).or_default();

        let index = items
            .iter()
            .position(|item| has_attribute(item, &key.name, &key.value));
        let item = match (index, condition) {
            (Some(_), WriteCondition::IfAbsent) => return Err(StoreError::ConditionFailed),
            (Some(index), WriteCondition::Upsert) => &mut items[index],
            (None, _) => {
                items.push(Item::from([(key.name.clone(), key.value.clone())]));
                let last = items.len() - 1;
                &mut items[last]
            }
        };

        item.entry(CREATED_AT.to_string())
            .or_insert(AttributeValue::S(created_on));
        item.insert(
            TRANSACTION_ID.to_string(),
            AttributeValue::S(transaction_id.to_string()),
        );
        for (name, value) in attributes.iter() {
            item.insert(name.to_string(), value.clone());
        }

        Ok(())
    }

    async fn scan(
        &self,
        table: &str,
        _index_name: &str,
        index_key_name: &str,
        index_key_value: AttributeValue,
        filters: &Attributes,
    ) -> StoreResult<Vec<Item>> {
        if self.is_unavailable() {
            return Err(StoreError::DynamoDbQueryError(unavailable()));
        }

        Ok(self
            .lock()
            .get(table)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| has_attribute(item, index_key_name, &index_key_value))
                    .filter(|item| {
                        filters
                            .iter()
                            .all(|(name, value)| has_attribute(item, name, value))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn scan_all(&self, table: &str) -> StoreResult<Vec<Item>> {
        if self.is_unavailable() {
            return Err(StoreError::DynamoDbScanError(unavailable()));
        }

        Ok(self.lock().get(table).cloned().unwrap_or_default())
    }
}
