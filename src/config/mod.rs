//! Configuration loading and management
//!
//! Configuration comes from an optional YAML file, then environment
//! variables, then validation. Every section and field is optional.
//!
//! ```yaml
//! server:
//!   port: 8080
//! pagination:
//!   limit: 20
//!   sort: title
//! auth:
//!   jwt_secret: change-me
//! storage:
//!   backend: mongodb
//!   uri: mongodb://localhost:27017
//! ```

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pagination: PaginationDefaults,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Prefix every API route is mounted under (e.g. `/api/v1`)
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_prefix: "/api/v1".to_string(),
        }
    }
}

/// Defaults applied to collection queries
///
/// Passed by reference into the query parser, the pagination calculator and
/// the collection linker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationDefaults {
    pub page: u64,
    pub limit: u64,
    pub sort: String,
    pub sort_type: String,
    pub total_items: u64,
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort: "createdAt".to_string(),
            sort_type: "asc".to_string(),
            total_items: 0,
        }
    }
}

/// Token signing settings
/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_minutes: 24 * 60,
        }
    }
}

/// Which persistence backend to build at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Mongodb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub uri: Option<String>,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            uri: None,
            database: "recipes".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Full startup sequence: file (or defaults), environment, validation
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override settings from process environment variables
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Same as [`apply_env_overrides`](Self::apply_env_overrides) with an
    /// explicit variable source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                value: port.clone(),
                message: "expected a port number".to_string(),
            })?;
        }
        if let Some(prefix) = lookup("API_PREFIX") {
            self.server.api_prefix = prefix;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(uri) = lookup("DATABASE_URL") {
            self.storage.uri = Some(uri);
        }
        if let Some(database) = lookup("DATABASE_NAME") {
            self.storage.database = database;
        }
        Ok(())
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "jwt_secret".to_string(),
                context: "auth".to_string(),
            });
        }

        let ttl = self.auth.token_ttl_minutes;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&ttl) {
            return Err(invalid(
                "auth.token_ttl_minutes",
                &ttl.to_string(),
                &format!("must be between 1 and {}", MAX_TOKEN_TTL_MINUTES),
            ));
        }

        if self.pagination.limit == 0 {
            return Err(invalid("pagination.limit", "0", "must be greater than 0"));
        }
        if self.pagination.page == 0 {
            return Err(invalid("pagination.page", "0", "must be greater than 0"));
        }
        if !matches!(self.pagination.sort_type.as_str(), "asc" | "dsc") {
            return Err(invalid(
                "pagination.sort_type",
                &self.pagination.sort_type,
                "expected 'asc' or 'dsc'",
            ));
        }

        let prefix = &self.server.api_prefix;
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(invalid("server.api_prefix", prefix, "must start with '/'"));
        }

        if self.storage.backend == StorageBackend::Mongodb && self.storage.uri.is_none() {
            return Err(ConfigError::MissingField {
                field: "uri".to_string(),
                context: "storage (mongodb backend)".to_string(),
            });
        }

        Ok(())
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn invalid(field: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}
