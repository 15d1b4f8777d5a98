//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing: the organization URL must be
//! an http(s) URL and every timeout and backoff must be non-zero.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Provider configuration file.
///
/// # Example
///
/// ```toml
/// organization_url = "https://dev.azure.com/contoso"
///
/// [timeouts]
/// create_secs = 60
/// read_secs = 5
///
/// [retry]
/// initial_backoff_ms = 500
/// max_backoff_ms = 10000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Azure DevOps organization URL
    pub organization_url: Option<String>,

    /// Operation deadlines
    pub timeouts: Option<TimeoutsConfig>,

    /// Push retry pacing
    pub retry: Option<RetryConfig>,
}

impl ProviderConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.organization_url {
            validate_organization_url(url)?;
        }
        if let Some(timeouts) = &self.timeouts {
            timeouts.validate()?;
        }
        if let Some(retry) = &self.retry {
            retry.validate()?;
        }
        Ok(())
    }
}

/// Deadlines, in seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutsConfig {
    /// Deadline for the push retry loop (create, update, delete)
    pub create_secs: Option<u64>,

    /// Deadline for a single read
    pub read_secs: Option<u64>,
}

impl TimeoutsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero("timeouts.create_secs", self.create_secs)?;
        non_zero("timeouts.read_secs", self.read_secs)
    }
}

/// Backoff between push attempts, in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
}

impl RetryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero("retry.initial_backoff_ms", self.initial_backoff_ms)?;
        non_zero("retry.max_backoff_ms", self.max_backoff_ms)?;
        if let (Some(initial), Some(max)) = (self.initial_backoff_ms, self.max_backoff_ms) {
            if initial > max {
                return Err(ConfigError::InvalidValue(format!(
                    "retry.initial_backoff_ms ({initial}) exceeds retry.max_backoff_ms ({max})"
                )));
            }
        }
        Ok(())
    }
}

/// Check an organization URL looks like something reqwest can talk to.
pub(crate) fn validate_organization_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "organization_url '{url}' must start with http:// or https://"
        )))
    }
}

fn non_zero(key: &str, value: Option<u64>) -> Result<(), ConfigError> {
    match value {
        Some(0) => Err(ConfigError::InvalidValue(format!("{key} must be non-zero"))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ProviderConfig::default();
        assert!(config.organization_url.is_none());
        assert!(config.timeouts.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn valid_url() {
        let config = ProviderConfig {
            organization_url: Some("https://dev.azure.com/contoso".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_url() {
        let config = ProviderConfig {
            organization_url: Some("dev.azure.com/contoso".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = ProviderConfig {
            timeouts: Some(TimeoutsConfig {
                create_secs: Some(0),
                read_secs: None,
            }),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeouts.create_secs"));
    }

    #[test]
    fn inverted_backoff_rejected() {
        let retry = RetryConfig {
            initial_backoff_ms: Some(2000),
            max_backoff_ms: Some(100),
        };
        assert!(retry.validate().is_err());
    }

    #[test]
    fn roundtrip() {
        let config = ProviderConfig {
            organization_url: Some("https://dev.azure.com/contoso".to_string()),
            timeouts: Some(TimeoutsConfig {
                create_secs: Some(120),
                read_secs: Some(10),
            }),
            retry: Some(RetryConfig {
                initial_backoff_ms: Some(250),
                max_backoff_ms: Some(4000),
            }),
        };

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: ProviderConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            organization_url = "https://dev.azure.com/contoso"
            project = "nope"
        "#;

        let result: Result<ProviderConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
