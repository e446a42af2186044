//! Configuration loading and resolution
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`YIELD_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The resolved [`ServiceConfig`] is built once at startup and handed to the
//! components that need it. Nothing mutates it afterwards.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_PREDICTOR_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PORT: u16 = 8080;
/// Upper bound on one predictor round trip, connect included
pub const DEFAULT_PREDICTOR_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

const APP_DIR_NAME: &str = "yield-gateway";

pub const ENV_PREDICTOR_URL: &str = "YIELD_PREDICTOR_URL";
pub const ENV_API_KEY: &str = "YIELD_API_KEY";
pub const ENV_DATABASE_PATH: &str = "YIELD_DATABASE_PATH";
pub const ENV_PORT: &str = "YIELD_PORT";
pub const ENV_PREDICTOR_TIMEOUT_MS: &str = "YIELD_PREDICTOR_TIMEOUT_MS";

/// What happens when the predictor succeeded but the write to storage failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistencePolicy {
    /// Log the storage failure and still return the predictor's answer
    #[default]
    BestEffort,
    /// Treat the storage failure as a failed call
    Required,
}

/// Configuration file contents
///
/// All keys are optional; anything missing falls through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the external predictor (without `/predict`)
    #[serde(default)]
    pub predictor_url: Option<String>,

    /// Shared secret expected in the `X-API-KEY` header
    #[serde(default)]
    pub api_key: Option<String>,

    /// SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP listen port
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub predictor_timeout_ms: Option<u64>,

    #[serde(default)]
    pub persistence: Option<PersistencePolicy>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl TomlConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub predictor_url: Option<String>,
    pub api_key: Option<String>,
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub predictor_timeout_ms: Option<u64>,
}

/// Fully resolved process configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub predictor_url: String,
    /// `None` disables the API key check
    pub api_key: Option<String>,
    pub database_path: PathBuf,
    pub port: u16,
    pub predictor_timeout: Duration,
    pub persistence_policy: PersistencePolicy,
    pub log_level: String,
}

impl ServiceConfig {
    /// Resolve configuration from CLI overrides, environment, config file and defaults
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let file = load_config_file(overrides.config_file.as_deref())?;

        let predictor_url = overrides
            .predictor_url
            .clone()
            .or_else(|| env_var(ENV_PREDICTOR_URL))
            .or(file.predictor_url)
            .unwrap_or_else(|| DEFAULT_PREDICTOR_URL.to_string());

        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| env_var(ENV_API_KEY))
            .or(file.api_key)
            .filter(|key| !key.trim().is_empty());

        let database_path = overrides
            .database_path
            .clone()
            .or_else(|| env_var(ENV_DATABASE_PATH).map(PathBuf::from))
            .or(file.database_path)
            .unwrap_or_else(default_database_path);

        let port = match overrides.port {
            Some(port) => port,
            None => match env_parsed::<u16>(ENV_PORT)? {
                Some(port) => port,
                None => file.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let timeout_ms = match overrides.predictor_timeout_ms {
            Some(ms) => ms,
            None => match env_parsed::<u64>(ENV_PREDICTOR_TIMEOUT_MS)? {
                Some(ms) => ms,
                None => file
                    .predictor_timeout_ms
                    .unwrap_or(DEFAULT_PREDICTOR_TIMEOUT_MS),
            },
        };

        let config = Self {
            predictor_url: normalize_base_url(&predictor_url),
            api_key,
            database_path,
            port,
            predictor_timeout: Duration::from_millis(timeout_ms),
            persistence_policy: file.persistence.unwrap_or_default(),
            log_level: file.logging.level,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.predictor_url.starts_with("http://") || self.predictor_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "predictor_url must be an http(s) URL, got '{}'",
                self.predictor_url
            )));
        }
        if self.predictor_timeout.is_zero() {
            return Err(Error::Config(
                "predictor_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load the config file, or defaults when none exists
///
/// An explicitly requested file must exist. The well-known locations are
/// optional.
fn load_config_file(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        info!("Loading config file: {}", path.display());
        return TomlConfig::from_file(path);
    }

    match find_config_file() {
        Some(path) => {
            info!("Loading config file: {}", path.display());
            TomlConfig::from_file(&path)
        }
        None => {
            warn!("No config file found, using environment and compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Look for `config.toml` in the user config dir, then system-wide
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc").join(APP_DIR_NAME).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./yield_data"))
        .join("predictions.db")
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env_var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has invalid value '{}'", name, raw))),
        None => Ok(None),
    }
}
