//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use tracing::Level;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the `DynamoDB` table holding user records
    ///
    /// # Panics
    ///
    /// Panics if the `USERS_TABLE` environment variable is not set outside development
    #[must_use]
    pub fn users_table(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("USERS_TABLE").expect("USERS_TABLE environment variable is not set")
            }
            Self::Development => env::var("USERS_TABLE").unwrap_or_else(|_| "users".to_string()),
        }
    }

    /// Region override from `REGION`, falling back to the SDK's own resolution
    #[must_use]
    pub fn region(&self) -> Option<String> {
        env::var("REGION").ok().filter(|region| !region.trim().is_empty())
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration.
    ///
    /// Retries are disabled: a failed store call surfaces to the handler as is.
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::disabled())
            .timeout_config(timeout_config);

        if let Some(region) = self.region() {
            loader = loader.region(Region::new(region));
        }

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            loader = loader.endpoint_url(endpoint_url);
        }

        loader.load().await
    }

    /// AWS `DynamoDB` service configuration
    pub async fn dynamodb_client_config(&self) -> aws_sdk_dynamodb::Config {
        let aws_config = self.aws_config().await;
        (&aws_config).into()
    }

    /// Default log level when `RUST_LOG` is not set
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_environment_from_env() {
        // Test development (default)
        env::remove_var("APP_ENV");
        assert_eq!(Environment::from_env(), Environment::Development);

        env::set_var("APP_ENV", " Staging ");
        assert_eq!(Environment::from_env(), Environment::Staging);

        env::set_var("APP_ENV", "production");
        assert_eq!(Environment::from_env(), Environment::Production);

        env::remove_var("APP_ENV");
    }

    #[test]
    #[serial]
    #[should_panic(expected = "Invalid environment: invalid")]
    fn test_invalid_environment() {
        env::set_var("APP_ENV", "invalid");
        let _ = Environment::from_env();
    }

    #[test]
    #[serial]
    fn test_users_table() {
        env::remove_var("USERS_TABLE");
        assert_eq!(Environment::Development.users_table(), "users");

        env::set_var("USERS_TABLE", "prod-users");
        assert_eq!(Environment::Development.users_table(), "prod-users");
        assert_eq!(Environment::Production.users_table(), "prod-users");

        env::remove_var("USERS_TABLE");
    }

    #[test]
    #[serial]
    #[should_panic(expected = "USERS_TABLE environment variable is not set")]
    fn test_users_table_required_in_production() {
        env::remove_var("USERS_TABLE");
        let _ = Environment::Production.users_table();
    }

    #[test]
    #[serial]
    fn test_region_override() {
        env::set_var("REGION", "eu-west-1");
        assert_eq!(
            Environment::Production.region().as_deref(),
            Some("eu-west-1")
        );

        env::set_var("REGION", "  ");
        assert_eq!(Environment::Production.region(), None);

        env::remove_var("REGION");
    }

    #[test]
    fn test_docs_and_log_format_per_stage() {
        assert!(Environment::Development.show_api_docs());
        assert!(Environment::Staging.show_api_docs());
        assert!(!Environment::Production.show_api_docs());

        assert!(Environment::Production.json_logs());
        assert!(!Environment::Development.json_logs());
    }
}
