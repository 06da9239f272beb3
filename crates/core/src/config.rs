use serde::Deserialize;

use crate::error::BeaconResult;

/// Root application configuration. Loaded from environment variables
/// with the prefix `BEACON__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub snowplow: SnowplowConfig,
}

/// Collector connection and schema identifiers for the Snowplow pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowplowConfig {
    #[serde(default = "default_collector_endpoint")]
    pub collector_endpoint: String,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub schemas: SchemaConfig,
}

/// Iglu schema identifiers for the records this service emits. Opaque
/// strings validated by the collector, not by us.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
    #[serde(default = "default_object_update_schema")]
    pub object_update: String,
    #[serde(default = "default_user_schema")]
    pub user: String,
    #[serde(default = "default_api_user_schema")]
    pub api_user: String,
    #[serde(default = "default_account_schema")]
    pub account: String,
}

// Default functions
fn default_collector_endpoint() -> String {
    "http://localhost:9090".to_string()
}
fn default_app_id() -> String {
    "beacon-dev".to_string()
}
fn default_namespace() -> String {
    "beacon".to_string()
}
fn default_object_update_schema() -> String {
    "iglu:com.beacon/object_update/jsonschema/1-0-1".to_string()
}
fn default_user_schema() -> String {
    "iglu:com.beacon/user/jsonschema/1-0-0".to_string()
}
fn default_api_user_schema() -> String {
    "iglu:com.beacon/api_user/jsonschema/1-0-0".to_string()
}
fn default_account_schema() -> String {
    "iglu:com.beacon/account/jsonschema/1-0-1".to_string()
}

impl Default for SnowplowConfig {
    fn default() -> Self {
        Self {
            collector_endpoint: default_collector_endpoint(),
            app_id: default_app_id(),
            namespace: default_namespace(),
            schemas: SchemaConfig::default(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            object_update: default_object_update_schema(),
            user: default_user_schema(),
            api_user: default_api_user_schema(),
            account: default_account_schema(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snowplow: SnowplowConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> BeaconResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("BEACON")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
