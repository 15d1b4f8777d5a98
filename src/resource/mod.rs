//! resource
//!
//! Declarative resources reconciled against the remote repository.
//!
//! # Modules
//!
//! - [`branch`] - Branch create/read/delete/import
//! - [`file`] - File create/read/update/delete/import
//! - [`refs`] - Source ref resolution and compare-and-swap ref updates
//! - [`retry`] - Bounded retry for conditional pushes
//! - [`error`] - Errors surfaced by resource operations
//!
//! # Lifecycle
//!
//! Each operation validates declared inputs, resolves refs, calls the
//! remote API and returns observed state. Reads report a resource that no
//! longer exists as `Ok(None)`; every other failure is an error.

pub mod branch;
pub mod error;
pub mod file;
pub mod refs;
pub mod retry;

pub use branch::{BranchConfig, BranchResource, BranchState};
pub use error::{ResourceContext, ResourceError};
pub use file::{FileConfig, FileResource, FileState};
pub use retry::RetryPolicy;
