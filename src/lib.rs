//! adogit - Azure DevOps Git branches and files as declarative resources
//!
//! adogit reconciles declared branches and files against an Azure DevOps
//! Git repository, following the create/read/update/delete/import
//! lifecycle of an infrastructure-as-code provider.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to resources)
//! - [`resource`] - Branch and file lifecycles, ref resolution, push retry
//! - [`azdo`] - The remote Git API seam, its REST client, and a mock
//! - [`core`] - Domain types, identifiers, and configuration
//!
//! # Correctness Invariants
//!
//! 1. Every ref write is compare-and-swap against the head just observed
//! 2. The all-zero object id means "ref absent"
//! 3. A branch that moved is never deleted
//! 4. An existing file is never overwritten on create unless allowed

pub mod azdo;
pub mod cli;
pub mod core;
pub mod resource;
