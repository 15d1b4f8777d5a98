//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Builds the declared config or parses the resource id
//! 2. Calls the resource to run the lifecycle step
//! 3. Prints the resulting state as JSON on stdout
//!
//! Handlers do NOT call the remote API directly.

mod branch;
mod file;

pub use branch::branch;
pub use file::file;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::azdo::{create_client, GitClient};
use crate::cli::args::Command;
use crate::core::config::Config;
use crate::resource::{BranchResource, FileResource, RetryPolicy};

/// Execution context shared by all handlers.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build the remote client from configuration.
    pub fn client(&self) -> Result<Arc<dyn GitClient>> {
        create_client(&self.config).context("Failed to create Azure DevOps client")
    }

    pub fn branches(&self) -> Result<BranchResource> {
        Ok(BranchResource::new(self.client()?))
    }

    /// File resource with the configured push retry and read timeout.
    pub fn files(&self) -> Result<FileResource> {
        Ok(FileResource::new(self.client()?)
            .with_retry_policy(RetryPolicy::from_config(&self.config))
            .with_read_timeout(self.config.read_timeout()))
    }
}

/// Dispatch a command to its handler.
pub async fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Branch { action } => branch::branch(ctx, action).await,
        Command::File { action } => file::file(ctx, action).await,
    }
}

/// Print state as pretty JSON. `None` prints `null`.
pub(crate) fn print_state<T: Serialize>(state: Option<&T>) -> Result<()> {
    let json = serde_json::to_string_pretty(&state).context("Failed to serialize state")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ProviderConfig, TimeoutsConfig};

    #[test]
    fn client_requires_organization_url() {
        let ctx = Context::new(Config::default());
        let err = ctx.client().err().unwrap();
        assert!(format!("{err:#}").contains("organization URL"));
    }

    #[test]
    fn retry_policy_follows_config() {
        let config = Config::from_provider(ProviderConfig {
            organization_url: Some("https://dev.azure.com/contoso".into()),
            timeouts: Some(TimeoutsConfig {
                create_secs: Some(1),
                read_secs: Some(1),
            }),
            retry: None,
        });
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.timeout, std::time::Duration::from_secs(1));
    }
}
