//! Broker API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! Resolver keys (`RESOLVER_MODE`, `TERMINAL_*`, `DEFAULT_*`) are read by
//! `tappay_resolver::ResolverSettings`.

use std::path::PathBuf;

/// Broker API configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Shared secret terminals send as `x-api-key`
    pub api_key: Option<String>,

    /// Operator key for `/api/admin/login`
    pub admin_key: Option<String>,

    /// Origin used to build checkout URLs; falls back to the request host
    pub public_base_url: Option<String>,

    /// Connection pool size
    pub db_max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = ServerConfig {
            http_port: non_empty("HTTP_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: non_empty("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/tappay.db")),

            api_key: non_empty("API_KEY"),

            admin_key: non_empty("ADMIN_KEY"),

            public_base_url: non_empty("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),

            db_max_connections: non_empty("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            http_port: 3000,
            database_path: PathBuf::from("./data/tappay.db"),
            api_key: None,
            admin_key: None,
            public_base_url: None,
            db_max_connections: 5,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
