//! core
//!
//! Core domain types, identifiers, and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, RepositoryId, ref name helpers
//! - [`ids`] - Composite resource identifiers
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing rejects malformed ids before any network call
//! - Schemas are strict and self-describing

pub mod config;
pub mod ids;
pub mod types;
