/// Configuration management for the feed API
///
/// Settings come from environment variables (a `.env` file is loaded first
/// by the binary). Every value has a development default; production refuses
/// permissive CORS and the in-memory store.
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Which store backs the repositories
    pub store: StoreConfig,
    /// Uploaded image storage
    pub storage: StorageConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, or `*`
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> Vec<&str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn allows_any(&self) -> bool {
        self.allowed_origins.trim() == "*"
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

/// Uploaded image storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory that holds the `images/` folder
    pub root: String,
    /// Largest accepted image upload in bytes
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app = AppConfig {
            env: var("APP_ENV").unwrap_or_else(|| "development".to_string()),
            host: var("FEED_API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or_default(&var, "FEED_API_PORT", 8080)?,
        };
        let production = app.is_production();

        let allowed_origins = match var("CORS_ALLOWED_ORIGINS") {
            Some(value) => value,
            None if production => {
                return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
            }
            None => "*".to_string(),
        };
        if production && allowed_origins.trim() == "*" {
            return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
        }

        let backend = match var("STORE_BACKEND") {
            Some(value) => value.parse::<StoreBackend>()?,
            None => StoreBackend::Postgres,
        };
        if production && backend == StoreBackend::Memory {
            return Err("STORE_BACKEND=memory is not allowed in production".to_string());
        }

        let format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Config {
            app,
            cors: CorsConfig { allowed_origins },
            database: DatabaseConfig {
                url: var("DATABASE_URL")
                    .unwrap_or_else(|| "postgresql://localhost/feed".to_string()),
                max_connections: parse_or_default(&var, "DATABASE_MAX_CONNECTIONS", 10)?,
                run_migrations: parse_or_default(&var, "DATABASE_RUN_MIGRATIONS", true)?,
            },
            store: StoreConfig { backend },
            storage: StorageConfig {
                root: var("IMAGE_STORAGE_ROOT").unwrap_or_else(|| ".".to_string()),
                max_image_bytes: parse_or_default(&var, "MAX_IMAGE_BYTES", 5 * 1024 * 1024)?,
            },
            logging: LoggingConfig { format },
        })
    }
}

fn parse_or_default<F, T>(var: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        None => Ok(default),
    }
}
