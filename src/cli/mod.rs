//! cli
//!
//! Command-line interface layer for adogit.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialise logging to stderr
//! - Load configuration and build the remote client
//! - Delegate to command handlers, which print state as JSON on stdout
//!
//! # Architecture
//!
//! The CLI layer is thin. All remote state changes go through
//! [`crate::resource`].

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::{Context as _, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::Config;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = &cli.organization_url {
        config
            .set_organization_url(url)
            .context("Invalid --organization-url")?;
    }
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "loaded configuration");
    }

    let ctx = commands::Context::new(config);
    commands::dispatch(cli.command, &ctx).await
}

/// Log to stderr so stdout carries only JSON state.
///
/// `--debug` forces the `debug` level; otherwise `RUST_LOG` applies, falling
/// back to `warn`.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed when run from tests.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
