use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use tracing_subscriber::{fmt, EnvFilter};
use user_service::{server, types::Environment};
use user_storage::{
    store::{DynamoDbStore, ItemStore},
    user::UserStorage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.tracing_level().as_str()));

    // JSON logs for staging/production, human readable output for development
    if environment.json_logs() {
        fmt().json().with_env_filter(env_filter).init();
    } else {
        fmt().with_env_filter(env_filter).init();
    }

    let dynamodb_client = Arc::new(DynamoDbClient::from_conf(
        environment.dynamodb_client_config().await,
    ));
    let store: Arc<dyn ItemStore> = Arc::new(DynamoDbStore::new(dynamodb_client));
    let user_storage = Arc::new(UserStorage::new(store, environment.users_table()));

    server::start(environment, user_storage).await
}
