//! azdo::traits
//!
//! The `GitClient` trait: the slice of the Azure DevOps Git API the
//! resources depend on.
//!
//! # Design
//!
//! The trait is async because every call is network I/O. Resources receive
//! an `Arc<dyn GitClient>` rather than reaching for a global client, so tests
//! can substitute [`MockGitClient`](super::mock::MockGitClient).
//!
//! # Example
//!
//! ```ignore
//! use adogit::azdo::{GitClient, GetRefsQuery};
//!
//! async fn first_tag(client: &dyn GitClient, repo: &str) -> Result<(), AzdoError> {
//!     let refs = client
//!         .get_refs(repo, GetRefsQuery::prefix("tags/", 1))
//!         .await?;
//!     println!("{:?}", refs.first());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use super::models::{
    GitBranchStats, GitCommitRef, GitItem, GitPush, GitPushRef, GitRef, GitRefUpdate,
    GitRefUpdateResult,
};
use crate::core::types::Oid;

/// `typeKey` the service reports when a push lost a compare-and-swap race.
pub const STALE_REF_TYPE_KEY: &str = "GitReferenceStaleException";

/// Message fragment the service uses for the same condition.
pub const STALE_REF_MESSAGE: &str = "has already been updated by another client";

/// Errors from Azure DevOps API calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AzdoError {
    /// No credentials are configured.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
        /// Exception type key from the API, when present
        type_key: Option<String>,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl AzdoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AzdoError::NotFound(_))
    }

    /// Whether this is a lost compare-and-swap race on a ref.
    ///
    /// The structured `typeKey` is checked first; the message text is the
    /// fallback for responses that omit it.
    pub fn is_stale_ref(&self) -> bool {
        match self {
            AzdoError::ApiError {
                message, type_key, ..
            } => {
                type_key.as_deref() == Some(STALE_REF_TYPE_KEY)
                    || message.contains(STALE_REF_MESSAGE)
            }
            _ => false,
        }
    }
}

/// Query for the get-refs endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRefsQuery {
    /// Prefix filter, without the leading `refs/` (e.g. `heads/main`).
    pub filter: String,
    /// Maximum number of refs to return.
    pub top: Option<u32>,
    /// Include peeled object ids for annotated tags.
    pub peel_tags: bool,
}

impl GetRefsQuery {
    /// Refs whose name starts with `refs/<filter>`, tags peeled.
    pub fn prefix(filter: impl Into<String>, top: u32) -> Self {
        Self {
            filter: filter.into(),
            top: Some(top),
            peel_tags: true,
        }
    }
}

/// Query for the get-item endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetItemQuery {
    pub path: String,
    /// Short branch name to read the item at; `None` means the default branch.
    pub branch: Option<String>,
    pub include_content: bool,
}

/// Query for the get-commits endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCommitsQuery {
    /// Short branch name to list commits from.
    pub branch: String,
    pub top: u32,
}

/// Remote Git operations used by the branch and file resources.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, AzdoError>`. Callers should handle:
/// - `NotFound`: the branch, item, or repository does not exist
/// - `ApiError` with [`AzdoError::is_stale_ref`]: a concurrent writer won
/// - `AuthRequired` / `AuthFailed`: credentials are missing or rejected
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Get the client name (e.g., "azure-devops", "mock").
    fn name(&self) -> &'static str;

    /// Get statistics for a branch, including its head commit.
    ///
    /// `name` is the short branch name (no `refs/heads/`).
    async fn get_branch(&self, repository_id: &str, name: &str)
        -> Result<GitBranchStats, AzdoError>;

    /// List refs matching a prefix filter, shortest names first.
    async fn get_refs(
        &self,
        repository_id: &str,
        query: GetRefsQuery,
    ) -> Result<Vec<GitRef>, AzdoError>;

    /// Apply compare-and-swap ref updates.
    ///
    /// A successful call may still contain unsuccessful per-ref results.
    async fn update_refs(
        &self,
        repository_id: &str,
        updates: Vec<GitRefUpdate>,
    ) -> Result<Vec<GitRefUpdateResult>, AzdoError>;

    /// Get an item, optionally with its content.
    async fn get_item(&self, repository_id: &str, query: GetItemQuery)
        -> Result<GitItem, AzdoError>;

    /// List the most recent commits on a branch, newest first.
    async fn get_commits(
        &self,
        repository_id: &str,
        query: GetCommitsQuery,
    ) -> Result<Vec<GitCommitRef>, AzdoError>;

    /// Get a single commit.
    async fn get_commit(&self, repository_id: &str, commit_id: &Oid)
        -> Result<GitCommitRef, AzdoError>;

    /// Create commits and move refs in one atomic push.
    async fn create_push(&self, repository_id: &str, push: GitPush)
        -> Result<GitPushRef, AzdoError>;
}
