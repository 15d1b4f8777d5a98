//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment (`AZDO_ORG_SERVICE_URL`)
//! 4. CLI flags (not handled here)
//!
//! The personal access token is only ever read from
//! `AZDO_PERSONAL_ACCESS_TOKEN`; it is never written to a config file.
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. An explicit path (`--config`)
//! 2. `$ADOGIT_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/adogit/config.toml`
//! 4. `~/.adogit/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use adogit::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Create timeout: {:?}", config.create_timeout());
//! ```

pub mod schema;

pub use schema::{ProviderConfig, RetryConfig, TimeoutsConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Environment variable overriding `organization_url`.
pub const ORG_URL_ENV: &str = "AZDO_ORG_SERVICE_URL";

/// Environment variable holding the personal access token.
pub const TOKEN_ENV: &str = "AZDO_PERSONAL_ACCESS_TOKEN";

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "ADOGIT_CONFIG";

pub const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("organization URL not configured; set `organization_url` or $AZDO_ORG_SERVICE_URL")]
    MissingOrganizationUrl,

    #[error("personal access token not configured; set $AZDO_PERSONAL_ACCESS_TOKEN")]
    MissingToken,
}

/// Merged configuration from file and environment.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values from the config file (or defaults)
    pub provider: ProviderConfig,
    /// Path to the config file (if loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, optionally from an explicit file.
    ///
    /// An explicit path must exist. The default locations are optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read, parsed, or fails
    /// validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (mut provider, path) = match explicit {
            Some(path) => (Self::read_config(path)?, Some(path.to_path_buf())),
            None => match Self::find_config() {
                Some(path) => (Self::read_config(&path)?, Some(path)),
                None => (ProviderConfig::default(), None),
            },
        };

        if let Ok(url) = std::env::var(ORG_URL_ENV) {
            if !url.is_empty() {
                provider.organization_url = Some(url);
            }
        }

        provider.validate()?;

        Ok(Self { provider, path })
    }

    /// Build a config from already-parsed values.
    pub fn from_provider(provider: ProviderConfig) -> Self {
        Self {
            provider,
            path: None,
        }
    }

    fn find_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("adogit/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".adogit/config.toml"))
            .filter(|path| path.exists())
    }

    fn read_config(path: &Path) -> Result<ProviderConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Override the organization URL (from a CLI flag).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the URL is not http(s).
    pub fn set_organization_url(&mut self, url: impl Into<String>) -> Result<(), ConfigError> {
        let url = url.into();
        schema::validate_organization_url(&url)?;
        self.provider.organization_url = Some(url);
        Ok(())
    }

    /// Get the organization URL, without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingOrganizationUrl` if none is configured.
    pub fn organization_url(&self) -> Result<&str, ConfigError> {
        self.provider
            .organization_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or(ConfigError::MissingOrganizationUrl)
    }

    /// Read the personal access token from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingToken` if the variable is unset or empty.
    pub fn personal_access_token(&self) -> Result<String, ConfigError> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)
    }

    /// Deadline for the push retry loop.
    ///
    /// Defaults to 60 seconds.
    pub fn create_timeout(&self) -> Duration {
        self.provider
            .timeouts
            .as_ref()
            .and_then(|t| t.create_secs)
            .map_or(DEFAULT_CREATE_TIMEOUT, Duration::from_secs)
    }

    /// Deadline for reads.
    ///
    /// Defaults to 5 seconds.
    pub fn read_timeout(&self) -> Duration {
        self.provider
            .timeouts
            .as_ref()
            .and_then(|t| t.read_secs)
            .map_or(DEFAULT_READ_TIMEOUT, Duration::from_secs)
    }

    /// First sleep between push attempts.
    pub fn initial_backoff(&self) -> Duration {
        self.provider
            .retry
            .as_ref()
            .and_then(|r| r.initial_backoff_ms)
            .map_or(DEFAULT_INITIAL_BACKOFF, Duration::from_millis)
    }

    /// Upper bound on the sleep between push attempts.
    pub fn max_backoff(&self) -> Duration {
        self.provider
            .retry
            .as_ref()
            .and_then(|r| r.max_backoff_ms)
            .map_or(DEFAULT_MAX_BACKOFF, Duration::from_millis)
    }

    /// Get the path of the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
