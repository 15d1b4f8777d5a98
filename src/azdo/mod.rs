//! azdo
//!
//! Access to the Azure DevOps Git REST API.
//!
//! # Architecture
//!
//! The [`GitClient`] trait defines the remote operations the resources use.
//! Resources receive a client through [`create_client`] (or a
//! [`mock::MockGitClient`] in tests) rather than constructing one
//! themselves.
//!
//! # Modules
//!
//! - `traits`: `GitClient` trait, error type, and query types
//! - [`models`]: JSON wire types
//! - [`rest`]: reqwest-based implementation
//! - [`mock`]: in-memory implementation for deterministic testing
//! - `factory`: client construction from configuration

mod factory;
pub mod mock;
pub mod models;
pub mod rest;
mod traits;

pub use factory::create_client;
pub use traits::*;
