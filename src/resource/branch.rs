//! resource::branch
//!
//! Lifecycle of a Git branch: create (orphan or from a ref), read, delete,
//! import.
//!
//! # Design
//!
//! A branch is immutable once created. Any change to `name`,
//! `repository_id`, `ref` or `source_sha` means replacing the branch, so
//! there is no update operation. Every ref write is a compare-and-swap:
//!
//! - create writes `ZERO -> commit`, failing if the branch already exists
//! - delete writes `head -> ZERO` with the head observed just before, so a
//!   branch that moved in between is left alone and the delete fails
//!
//! # Example
//!
//! ```ignore
//! let branches = BranchResource::new(client);
//! let state = branches
//!     .create(&BranchConfig::new(repo_id, "feature").from_ref("refs/heads/main"))
//!     .await?;
//! assert_eq!(state.id, format!("{repo_id}:feature"));
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{ResourceContext, ResourceError};
use super::refs::{resolve_source_commit, update_refs};
use crate::azdo::models::{ChangeType, GitChange, GitPush, GitPushCommit, GitRefUpdate};
use crate::azdo::GitClient;
use crate::core::ids::BranchId;
use crate::core::types::{with_refs_heads_prefix, Oid, RepositoryId};

const INITIAL_COMMIT_MESSAGE: &str = "Initial commit.";
const INITIAL_FILE_PATH: &str = "/readme.md";
const INITIAL_FILE_CONTENT: &str = "Branch initialized with adogit";

/// Declared branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchConfig {
    pub name: String,
    pub repository_id: String,
    /// Ref to branch from. `None` initialises an orphan branch.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Commit to branch from, instead of a ref.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sha: Option<String>,
}

impl BranchConfig {
    pub fn new(repository_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repository_id: repository_id.into(),
            reference: None,
            source_sha: None,
        }
    }

    /// Branch from `reference` instead of starting an orphan branch.
    pub fn from_ref(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Branch from commit `sha` instead of starting an orphan branch.
    pub fn from_commit(mut self, sha: impl Into<String>) -> Self {
        self.source_sha = Some(sha.into());
        self
    }

    /// Check the declared values before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an empty name, a repository id that is
    /// not a UUID, an empty ref, a source commit that is not a full SHA-1,
    /// or both a ref and a source commit.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.name.is_empty() {
            return Err(ResourceError::InvalidConfig(
                "branch name must not be empty".into(),
            ));
        }
        RepositoryId::parse(&self.repository_id)
            .map_err(|e| ResourceError::InvalidConfig(e.to_string()))?;
        if self.reference.as_deref() == Some("") {
            return Err(ResourceError::InvalidConfig("ref must not be empty".into()));
        }
        if let Some(sha) = &self.source_sha {
            if self.reference.is_some() {
                return Err(ResourceError::InvalidConfig(
                    "ref and source_sha are mutually exclusive".into(),
                ));
            }
            let oid = Oid::new(sha.as_str())
                .map_err(|e| ResourceError::InvalidConfig(format!("source_sha: {e}")))?;
            if oid.is_zero() {
                return Err(ResourceError::InvalidConfig(
                    "source_sha must not be the zero object id".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Observed branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchState {
    /// `repositoryId:branchName`
    pub id: String,
    pub name: String,
    pub repository_id: String,
    /// The ref the branch was created from, when known.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The commit the branch was created from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sha: Option<String>,
    /// Whether this is the repository's default branch.
    pub default: bool,
}

/// Branch lifecycle operations against a remote repository.
#[derive(Clone)]
pub struct BranchResource {
    client: Arc<dyn GitClient>,
}

impl BranchResource {
    pub fn new(client: Arc<dyn GitClient>) -> Self {
        Self { client }
    }

    /// Create the branch, then read it back.
    ///
    /// Without a source, a single push creates the branch with an initial
    /// commit adding `/readme.md`. With a ref, the branch is pointed at the
    /// commit the ref resolves to. With `source_sha`, it is pointed at that
    /// commit directly.
    ///
    /// # Errors
    ///
    /// Fails if the config is invalid, the ref cannot be resolved, the
    /// branch already exists, or the service rejects the update (including
    /// a `source_sha` the repository does not contain).
    pub async fn create(&self, config: &BranchConfig) -> Result<BranchState, ResourceError> {
        config.validate()?;
        let ref_name = with_refs_heads_prefix(&config.name);

        let source = match (&config.reference, &config.source_sha) {
            (None, None) => None,
            (Some(reference), _) => {
                let commit = resolve_source_commit(
                    self.client.as_ref(),
                    &config.repository_id,
                    reference,
                )
                .await
                .with_context(|| {
                    format!(
                        "creating branch \"{}\": resolving ref \"{reference}\"",
                        config.name
                    )
                })?;
                Some((commit, format!("ref \"{reference}\"")))
            }
            (None, Some(sha)) => {
                let commit = Oid::new(sha.as_str())
                    .map_err(|e| ResourceError::InvalidConfig(format!("source_sha: {e}")))?;
                Some((commit, format!("commit {sha}")))
            }
        };

        match source {
            None => {
                debug!(branch = %config.name, "initialising orphan branch");
                self.client
                    .create_push(&config.repository_id, initial_push(&ref_name))
                    .await
                    .with_context(|| format!("initialising new branch \"{}\"", config.name))?;
            }
            Some((commit, from)) => {
                debug!(branch = %config.name, commit = %commit.short(7), "creating branch");
                update_refs(
                    self.client.as_ref(),
                    &config.repository_id,
                    vec![GitRefUpdate {
                        name: ref_name,
                        old_object_id: Oid::ZERO,
                        new_object_id: Some(commit),
                    }],
                )
                .await
                .with_context(|| format!("creating branch \"{}\" from {from}", config.name))?;
            }
        }
        info!(branch = %config.name, repository = %config.repository_id, "created branch");

        let id = BranchId::new(&config.repository_id, &config.name).to_string();
        let mut state = self
            .read(&id)
            .await?
            .ok_or_else(|| ResourceError::Vanished(format!("branch \"{}\"", config.name)))?;
        state.reference = config.reference.clone();
        state.source_sha = config.source_sha.clone();
        Ok(state)
    }

    /// Read the branch identified by `repositoryId:branchName`.
    ///
    /// Returns `Ok(None)` if the branch no longer exists.
    pub async fn read(&self, id: &str) -> Result<Option<BranchState>, ResourceError> {
        let id: BranchId = id.parse()?;

        match self.client.get_branch(&id.repository_id, &id.name).await {
            Ok(stats) => Ok(Some(state_from(&id, stats.is_base_version))),
            Err(e) if e.is_not_found() => {
                debug!(branch = %id.name, "branch is gone");
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("reading branch \"{}\"", id.name)),
        }
    }

    /// Delete the branch at its current head.
    ///
    /// # Errors
    ///
    /// Fails if the branch cannot be read, or if it moved between reading
    /// its head and the delete (`staleOldObjectId`).
    pub async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        let id: BranchId = id.parse()?;

        let stats = self
            .client
            .get_branch(&id.repository_id, &id.name)
            .await
            .with_context(|| format!("getting latest commit of \"{}\"", id.name))?;

        update_refs(
            self.client.as_ref(),
            &id.repository_id,
            vec![GitRefUpdate {
                name: with_refs_heads_prefix(&id.name),
                old_object_id: stats.commit.commit_id,
                new_object_id: Some(Oid::ZERO),
            }],
        )
        .await
        .with_context(|| format!("deleting branch \"{}\"", id.name))?;

        info!(branch = %id.name, repository = %id.repository_id, "deleted branch");
        Ok(())
    }

    /// Adopt an existing branch given `repositoryId:branchName`.
    ///
    /// # Errors
    ///
    /// Unlike `read`, a missing branch is an error.
    pub async fn import(&self, id: &str) -> Result<BranchState, ResourceError> {
        let id: BranchId = id.parse()?;

        let stats = self
            .client
            .get_branch(&id.repository_id, &id.name)
            .await
            .with_context(|| format!("checking if branch \"{}\" exists", id.name))?;

        Ok(state_from(&id, stats.is_base_version))
    }
}

fn state_from(id: &BranchId, default: bool) -> BranchState {
    BranchState {
        id: id.to_string(),
        name: id.name.clone(),
        repository_id: id.repository_id.clone(),
        reference: None,
        source_sha: None,
        default,
    }
}

fn initial_push(ref_name: &str) -> GitPush {
    GitPush {
        ref_updates: vec![GitRefUpdate {
            name: ref_name.to_string(),
            old_object_id: Oid::ZERO,
            new_object_id: None,
        }],
        commits: vec![GitPushCommit {
            comment: INITIAL_COMMIT_MESSAGE.to_string(),
            changes: vec![GitChange::write(
                ChangeType::Add,
                INITIAL_FILE_PATH,
                INITIAL_FILE_CONTENT,
            )],
        }],
    }
}
