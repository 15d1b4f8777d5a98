//! resource::error
//!
//! Errors surfaced by resource lifecycle operations.

use std::time::Duration;

use thiserror::Error;

use crate::azdo::models::RefUpdateStatus;
use crate::azdo::AzdoError;
use crate::core::ids::IdError;

/// Errors from resource operations.
///
/// Not-found during a read is not an error: reads return `Ok(None)`.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A composite resource id could not be parsed.
    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// Declared configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no refs found that match '{0}'")]
    NoMatchingRefs(String),

    #[error("ref '{requested}' not found, closest match is '{closest}'")]
    RefNotFound { requested: String, closest: String },

    #[error("ref '{0}' does not have a valid commit id")]
    MissingCommitId(String),

    /// The service accepted the request but refused a ref update.
    #[error("invalid ref update status for '{name}': {status}")]
    RefUpdateRejected {
        name: String,
        status: RefUpdateStatus,
    },

    #[error("branch '{branch}' not found in repository {repository_id}")]
    BranchNotFound {
        repository_id: String,
        branch: String,
    },

    #[error(
        "refusing to overwrite existing file '{path}'; set `overwrite_on_create` to true to override"
    )]
    RefusingToOverwrite { path: String },

    #[error("branch '{branch}' has no commits")]
    EmptyBranch { branch: String },

    #[error("{operation} did not finish within {after:?}")]
    Timeout { operation: String, after: Duration },

    /// Retryable failures persisted until the deadline.
    #[error("gave up after {elapsed:?}: {last}")]
    RetryTimeout {
        elapsed: Duration,
        last: Box<ResourceError>,
    },

    /// A write succeeded but the resource could not be read back.
    #[error("{0} was not found after being written")]
    Vanished(String),

    #[error(transparent)]
    Api(#[from] AzdoError),

    /// Another error with the resource it concerned.
    #[error("{context}: {inner}")]
    Context {
        context: String,
        inner: Box<ResourceError>,
    },
}

impl ResourceError {
    /// The API error at the bottom of any context wrapping, if there is one.
    pub fn api_error(&self) -> Option<&AzdoError> {
        match self {
            ResourceError::Api(e) => Some(e),
            ResourceError::Context { inner, .. } => inner.api_error(),
            ResourceError::RetryTimeout { last, .. } => last.api_error(),
            _ => None,
        }
    }
}

/// Attach context to a fallible result, in the manner of `anyhow::Context`.
pub trait ResourceContext<T> {
    fn context(self, context: impl Into<String>) -> Result<T, ResourceError>;

    fn with_context<C, F>(self, f: F) -> Result<T, ResourceError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E: Into<ResourceError>> ResourceContext<T> for Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T, ResourceError> {
        self.map_err(|e| ResourceError::Context {
            context: context.into(),
            inner: Box::new(e.into()),
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T, ResourceError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| ResourceError::Context {
            context: f().into(),
            inner: Box::new(e.into()),
        })
    }
}
