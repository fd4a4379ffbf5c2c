//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
}

impl ServerConfig {
    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string
    ///
    /// `sqlite://path/to/file.db?mode=rwc` for the SQLite store,
    /// or `memory` for the in-process store.
    pub url: String,
    /// Maximum pooled connections (SQLite only)
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Whether the in-process store was requested
    pub fn is_memory(&self) -> bool {
        self.url.trim().eq_ignore_ascii_case("memory")
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret (32+ bytes)
    ///
    /// When absent a random key is generated at startup and
    /// tokens do not survive a restart.
    pub secret_key: Option<String>,
    /// Token lifetime in seconds (default: 21600 = 6 hours)
    pub token_ttl_seconds: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Filter directives used when `RUST_LOG` is not set
    pub fn default_filter(&self) -> String {
        format!("chronoview={},tower_http=debug", self.level.trim())
    }

    pub fn is_json(&self) -> bool {
        self.format.trim().eq_ignore_ascii_case("json")
    }
}

/// Minimum accepted length of a configured signing secret
pub const MIN_SECRET_KEY_BYTES: usize = 32;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 6 * 60 * 60;

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (CHRONOVIEW__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://chronoview.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("auth.token_ttl_seconds", DEFAULT_TOKEN_TTL_SECONDS)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("CHRONOVIEW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        if let Some(secret) = &self.auth.secret_key {
            if secret.as_bytes().len() < MIN_SECRET_KEY_BYTES {
                return Err(crate::error::AppError::Config(format!(
                    "auth.secret_key must be at least {} bytes",
                    MIN_SECRET_KEY_BYTES
                )));
            }
        }

        if self.auth.token_ttl_seconds <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.token_ttl_seconds must be greater than 0".to_string(),
            ));
        }

        if self.auth.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(crate::error::AppError::Config(format!(
                "auth.token_ttl_seconds must be at most {}",
                MAX_TOKEN_TTL_SECONDS
            )));
        }

        if !matches!(
            self.logging.format.trim().to_ascii_lowercase().as_str(),
            "pretty" | "json"
        ) {
            return Err(crate::error::AppError::Config(
                "logging.format must be \"pretty\" or \"json\"".to_string(),
            ));
        }

        if self.database.url.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "database.url must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
