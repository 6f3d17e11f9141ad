//! Configuration types for plant-mirror
//!
//! All settings come from the environment (a `.env` file is loaded by the
//! binary before resolution). There are no CLI flags.

use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Default bucket receiving mirrored images.
const DEFAULT_BUCKET: &str = "plants";

/// Default MinIO API port.
const DEFAULT_PORT: u16 = 9000;

/// Default path of the SQLite record store.
const DEFAULT_DATABASE_PATH: &str = "plants.db";

/// Default local staging directory for downloaded images.
const DEFAULT_STAGING_DIR: &str = "downloads";

/// Object storage connection settings
///
/// Read from the `MINIO_*` environment variables. `endpoint`, `access_key`,
/// `secret_key`, and `public_url` are required; the rest have defaults.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// Storage endpoint host (e.g., "minio.internal")
    pub endpoint: String,
    /// Storage API port (default: 9000)
    pub port: u16,
    /// Whether to connect over TLS (default: false)
    pub secure: bool,
    /// Access key credential
    pub access_key: String,
    /// Secret key credential
    pub secret_key: String,
    /// Bucket receiving mirrored images (default: "plants")
    pub bucket: String,
    /// Externally reachable base URL used to build published-object URLs
    pub public_url: String,
}

impl StorageConfig {
    /// Full endpoint URL for the storage API, derived from host, port, and
    /// the TLS flag.
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.endpoint, self.port)
    }
}

/// Main configuration for a migration run
#[derive(Clone, Debug)]
pub struct Config {
    /// Object storage connection settings
    pub storage: StorageConfig,
    /// Path of the SQLite record store (default: "plants.db")
    pub database_path: PathBuf,
    /// Local staging directory for downloaded images, created if absent
    /// (default: "downloads")
    pub staging_dir: PathBuf,
}

impl Config {
    /// Resolve the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is unset or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self> {
        let port = match env::var("MINIO_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| Error::Config {
                message: format!("invalid MINIO_PORT '{}': {}", raw, e),
                key: Some("MINIO_PORT".to_string()),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let storage = StorageConfig {
            endpoint: require_env("MINIO_ENDPOINT")?,
            port,
            secure: env_flag("MINIO_SECURE"),
            access_key: require_env("MINIO_ACCESS_KEY")?,
            secret_key: require_env("MINIO_SECRET_KEY")?,
            bucket: env::var("MINIO_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            public_url: require_env("MINIO_PUBLIC_URL")?,
        };

        Ok(Self {
            storage,
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATABASE_PATH)),
            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STAGING_DIR)),
        })
    }
}

/// Reads a required environment variable.
fn require_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config {
        message: format!("missing environment variable: {}", name),
        key: Some(name.to_string()),
    })
}

/// Reads a boolean flag: "1", "true", "yes" (case-insensitive) are truthy;
/// anything else, including an unset variable, is false.
fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
