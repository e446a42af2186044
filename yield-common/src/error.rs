//! Common error types for the yield gateway
//!
//! Request-path failures never surface through this type: the orchestrator
//! folds them into the error envelope. `Error` covers bootstrap (config,
//! database open) and the persistence gateway.

use thiserror::Error;

/// Common result type for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite pool or query failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure while preparing the database or reading config
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file exists but is not valid TOML for [`crate::config::TomlConfig`]
    #[error("Config file {path} is malformed: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration value out of range or inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}
