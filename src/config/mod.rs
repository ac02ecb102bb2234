use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    /// Present only for the MySQL backend
    pub database: Option<DatabaseConfig>,
    pub server: ServerConfig,
    pub allocation: AllocationConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// `json` switches the log formatter to JSON lines
    pub log_format: String,
    pub cors_allowed_origin: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    MySql,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(StorageBackend::MySql),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(AppError::Configuration(format!(
                "Invalid STORAGE_BACKEND '{}', expected mysql or memory",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub run_migrations: bool,
    /// How long the in-memory store waits for a student lock
    pub lock_timeout_ms: u64,
}

/// Retry policy for payment allocation under lock contention
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationConfig {
    pub max_retries: u32,
    /// First backoff; doubles on every retry
    pub retry_backoff_ms: u64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Days between invoice creation and its due date
    pub invoice_due_days: i64,
    /// Students processed in parallel by course-wide generation
    pub concurrency: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            invoice_due_days: 30,
            concurrency: 8,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let storage = StorageConfig {
            backend: env_or("STORAGE_BACKEND", StorageBackend::MySql)?,
            run_migrations: env_or("RUN_MIGRATIONS", true)?,
            lock_timeout_ms: env_or("LOCK_TIMEOUT_MS", 5_000)?,
        };

        let database = match storage.backend {
            StorageBackend::MySql => Some(DatabaseConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
                cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok(),
            },
            storage,
            database,
            server: ServerConfig::from_env()?,
            allocation: AllocationConfig {
                max_retries: env_or("ALLOCATION_MAX_RETRIES", 3)?,
                retry_backoff_ms: env_or("ALLOCATION_RETRY_BACKOFF_MS", 50)?,
            },
            generation: GenerationConfig {
                invoice_due_days: env_or("INVOICE_DUE_DAYS", 30)?,
                concurrency: env_or("GENERATION_CONCURRENCY", 8)?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.generation.invoice_due_days < 0 {
            return Err(AppError::Configuration(
                "INVOICE_DUE_DAYS cannot be negative".to_string(),
            ));
        }

        if self.generation.concurrency == 0 {
            return Err(AppError::Configuration(
                "GENERATION_CONCURRENCY must be greater than 0".to_string(),
            ));
        }

        if self.storage.lock_timeout_ms == 0 {
            return Err(AppError::Configuration(
                "LOCK_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }

        if let Some(database) = &self.database {
            if database.pool_size > database.max_connections {
                return Err(AppError::Configuration(
                    "DATABASE_POOL_SIZE cannot exceed DATABASE_MAX_CONNECTIONS".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn json_logs(&self) -> bool {
        self.app.log_format.eq_ignore_ascii_case("json")
    }
}

/// Parse an optional environment variable, falling back to `default` when unset
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid {}", key))),
        Err(_) => Ok(default),
    }
}
