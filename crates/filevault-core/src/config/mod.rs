//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default.toml`, an environment overlay, and `FILEVAULT__*`
//! environment variables. Each sub-module represents a logical section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, DatabaseProvider};
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Bearer token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upload pipeline settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml`, and environment
    /// variables prefixed with `FILEVAULT__` (e.g. `FILEVAULT__SERVER__PORT`).
    /// Missing files are skipped.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FILEVAULT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("storage.allowed_mime_prefixes")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.provider == DatabaseProvider::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required when database.provider = \"postgres\"",
            ));
        }
        if self.storage.max_file_size_bytes == 0 {
            return Err(AppError::configuration(
                "storage.max_file_size_bytes must be greater than zero",
            ));
        }
        if self.storage.thumbnail_size == 0 {
            return Err(AppError::configuration(
                "storage.thumbnail_size must be greater than zero",
            ));
        }
        if !self.storage.public_path.starts_with('/') {
            return Err(AppError::configuration(
                "storage.public_path must start with '/'",
            ));
        }
        let mount = self.storage.public_path.trim_end_matches('/');
        if mount.is_empty() || mount == "/api" || mount.starts_with("/api/") {
            return Err(AppError::configuration(
                "storage.public_path must name a directory outside /api",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_source() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.public_path, "/uploads");
        assert_eq!(config.storage.thumbnail_prefix, "thumb_");
        assert_eq!(config.storage.thumbnail_size, 200);
        assert_eq!(
            config.storage.allowed_mime_prefixes,
            vec!["image/".to_string(), "video/".to_string()]
        );
        assert_eq!(config.database.provider, DatabaseProvider::Postgres);
    }

    #[test]
    fn test_validate_requires_postgres_url() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());

        let mut memory = AppConfig::default();
        memory.database.provider = DatabaseProvider::Memory;
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn test_validate_public_path() {
        let mut config = AppConfig::default();
        config.database.provider = DatabaseProvider::Memory;
        config.storage.public_path = "uploads".to_string();
        assert!(config.validate().is_err());

        config.storage.public_path = "/".to_string();
        assert!(config.validate().is_err());

        config.storage.public_path = "/api/raw".to_string();
        assert!(config.validate().is_err());

        config.storage.public_path = "/media/".to_string();
        assert!(config.validate().is_ok());
    }
}
