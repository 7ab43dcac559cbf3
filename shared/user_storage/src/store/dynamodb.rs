//! `DynamoDB` implementation of [`ItemStore`]

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::SdkError, types::AttributeValue, Client as DynamoDbClient};

use super::{
    plan_update, Item, ItemKey, ItemStore, StoreError, StoreResult, WriteCondition,
    CREATED_AT_FORMAT,
};
use crate::expression::{compile_conditions, Attributes};

/// Store adapter backed by a shared `DynamoDB` client
pub struct DynamoDbStore {
    dynamodb_client: Arc<DynamoDbClient>,
}

impl DynamoDbStore {
    /// Creates a new store adapter
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>) -> Self {
        Self { dynamodb_client }
    }
}

#[async_trait]
impl ItemStore for DynamoDbStore {
    async fn read(&self, table: &str, key: &ItemKey) -> StoreResult<Option<Item>> {
        tracing::debug!(table, key = %key.name, "Getting item");

        let response = self
            .dynamodb_client
            .get_item()
            .table_name(table)
            .key(key.name.clone(), key.value.clone())
            .send()
            .await?;

        Ok(response.item)
    }

    async fn write(
        &self,
        table: &str,
        key: &ItemKey,
        attributes: &Attributes,
        transaction_id: &str,
        condition: WriteCondition,
    ) -> StoreResult<()> {
        let created_on = chrono::Utc::now().format(CREATED_AT_FORMAT).to_string();
        let plan = plan_update(key, attributes, transaction_id, &created_on, condition)?;

        tracing::debug!(
            table,
            update_expression = %plan.update_expression,
            condition = ?plan.condition_expression,
            "Saving item"
        );

        self.dynamodb_client
            .update_item()
            .table_name(table)
            .key(key.name.clone(), key.value.clone())
            .update_expression(plan.update_expression)
            .set_condition_expression(plan.condition_expression)
            .set_expression_attribute_names(Some(plan.names))
            .set_expression_attribute_values(Some(plan.values))
            .send()
            .await
            .map_err(|err| {
                let condition_failed = matches!(
                    &err,
                    SdkError::ServiceError(svc) if svc.err().is_conditional_check_failed_exception()
                );
                if condition_failed {
                    StoreError::ConditionFailed
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }

    async fn scan(
        &self,
        table: &str,
        index_name: &str,
        index_key_name: &str,
        index_key_value: AttributeValue,
        filters: &Attributes,
    ) -> StoreResult<Vec<Item>> {
        let key_condition = compile_conditions(
            "key",
            &Attributes::new().with(index_key_name, index_key_value),
        )?;
        let filter = compile_conditions("flt", filters)?;
        let filter_expression = (!filter.is_empty()).then(|| filter.expression.clone());

        let mut placeholders = key_condition.clone();
        placeholders.absorb_placeholders(filter);

        tracing::debug!(
            table,
            index_name,
            key_condition = %key_condition.expression,
            filter = ?filter_expression,
            "Querying index"
        );

        let response = self
            .dynamodb_client
            .query()
            .table_name(table)
            .index_name(index_name)
            .key_condition_expression(key_condition.expression)
            .set_filter_expression(filter_expression)
            .set_expression_attribute_names(Some(placeholders.names))
            .set_expression_attribute_values(Some(placeholders.values))
            .send()
            .await?;

        Ok(response.items.unwrap_or_default())
    }

    async fn scan_all(&self, table: &str) -> StoreResult<Vec<Item>> {
        tracing::debug!(table, "Scanning table");

        let response = self.dynamodb_client.scan().table_name(table).send().await?;

        Ok(response.items.unwrap_or_default())
    }
}
