//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `DOCVAULT__*` environment variables. Each sub-module
//! represents a logical configuration section. Every field has a serde
//! default so a missing file still yields a usable configuration.

pub mod cache;
pub mod client;
pub mod logging;
pub mod operations;

use serde::{Deserialize, Serialize};

pub use self::cache::{CacheConfig, MemoryCacheConfig};
pub use self::client::ClientConfig;
pub use self::logging::LoggingConfig;
pub use self::operations::OperationsConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listing defaults and request timeout.
    #[serde(default)]
    pub client: ClientConfig,
    /// Mutation and bulk operation tuning.
    #[serde(default)]
    pub operations: OperationsConfig,
    /// Listing cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, the environment overlay `config/{env}`,
    /// and environment variables prefixed with `DOCVAULT__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(&["config/default".to_string(), format!("config/{env}")])
    }

    /// Load configuration from an explicit list of file stems, later
    /// files overriding earlier ones, then environment variables.
    pub fn load_from(files: &[String]) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        for file in files {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("DOCVAULT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
