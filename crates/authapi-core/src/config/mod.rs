//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Configuration is loaded once at process start and handed to
//! the components that need it; nothing reads the environment afterwards.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::{AdminRoleMatch, AuthConfig};
pub use self::database::{DatabaseConfig, RepositoryBackend};
pub use self::logging::LoggingConfig;
pub use self::storage::{LocalStorageConfig, S3StorageConfig, StorageBackend, StorageConfig};

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
///
/// `AUTHAPI__AUTH__JWT_SECRET=...` overrides `auth.jwt_secret`.
pub const ENV_PREFIX: &str = "AUTHAPI";

/// Longest accepted access token lifetime: one year.
pub const MAX_ACCESS_TTL_MINUTES: u64 = 525_600;

/// Longest accepted per-request deadline: one day.
pub const MAX_REQUEST_TIMEOUT_SECONDS: u64 = 86_400;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// File storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `AUTHAPI__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if !(1..=MAX_ACCESS_TTL_MINUTES).contains(&self.auth.jwt_access_ttl_minutes) {
            return Err(AppError::configuration(format!(
                "auth.jwt_access_ttl_minutes must be between 1 and {MAX_ACCESS_TTL_MINUTES}"
            )));
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECONDS).contains(&self.server.request_timeout_seconds) {
            return Err(AppError::configuration(format!(
                "server.request_timeout_seconds must be between 1 and {MAX_REQUEST_TIMEOUT_SECONDS}"
            )));
        }
        if self.database.backend == RepositoryBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres backend",
            ));
        }
        if self.storage.backend == StorageBackend::S3 && self.storage.s3.endpoint.is_empty() {
            return Err(AppError::configuration(
                "storage.s3.endpoint is required for the s3 backend",
            ));
        }
        Ok(())
    }
}
