//! azdo::factory
//!
//! Client construction from configuration.

use std::sync::Arc;

use tracing::debug;

use super::rest::AzdoClient;
use super::traits::GitClient;
use crate::core::config::{Config, ConfigError};

/// Build the REST client described by `config`.
///
/// # Errors
///
/// Returns `ConfigError::MissingOrganizationUrl` or
/// `ConfigError::MissingToken` when either is absent.
pub fn create_client(config: &Config) -> Result<Arc<dyn GitClient>, ConfigError> {
    let organization_url = config.organization_url()?;
    let token = config.personal_access_token()?;
    let client = AzdoClient::new(organization_url, token);
    debug!(client = client.name(), organization_url, "created git client");
    Ok(Arc::new(client))
}
