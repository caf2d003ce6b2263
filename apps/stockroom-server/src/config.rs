//! Server configuration module.
//!
//! Supports configuration via environment variables:
//!
//! ```bash
//! STOCKROOM_ADDR=0.0.0.0:7070            # HTTP bind address
//! STOCKROOM_DATABASE_URL=sqlite://stockroom.db?mode=rwc
//! STOCKROOM_UPLOADS_DIR=./uploads        # image storage directory
//! STOCKROOM_SESSION_TTL_HOURS=24         # session lifetime
//! ```
//!
//! CLI flags (see `main.rs`) override these where both are given.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:7070";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://stockroom.db?mode=rwc";
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind address
    pub addr: String,
    /// Database URL (sqlite://... or memory://)
    pub database_url: String,
    /// Directory product images are written to
    pub uploads_dir: PathBuf,
    /// Session lifetime in hours
    pub session_ttl_hours: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid session TTL: {0}. Expected a positive number of hours")]
    InvalidSessionTtl(String),
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("STOCKROOM_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let database_url = env::var("STOCKROOM_DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let uploads_dir = env::var("STOCKROOM_UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOADS_DIR));

        let session_ttl_hours = match env::var("STOCKROOM_SESSION_TTL_HOURS") {
            Err(_) => DEFAULT_SESSION_TTL_HOURS,
            Ok(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => return Err(ConfigError::InvalidSessionTtl(raw)),
            },
        };

        Ok(Self {
            addr,
            database_url,
            uploads_dir,
            session_ttl_hours,
        })
    }
}
