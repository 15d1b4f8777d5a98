//! resource::file
//!
//! Lifecycle of a single text file on a branch: create, read, update,
//! delete, import.
//!
//! # Design
//!
//! Every write is one push of one commit whose ref update names the branch
//! head as its expected old value. Heads move under concurrent writers, so
//! each push goes through [`retry`]: the head is re-resolved on every
//! attempt and a stale-ref rejection is retried until the deadline. Any
//! other failure aborts at once.
//!
//! The stored identity is `repositoryId/filePath`. The branch is kept
//! beside it in state and passed back in for reads and deletes.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{ResourceContext, ResourceError};
use super::refs::branch_head;
use super::retry::{retry, with_deadline, RetryError, RetryPolicy};
use crate::azdo::models::{ChangeType, GitChange, GitPush, GitPushCommit, GitRefUpdate};
use crate::azdo::{GetItemQuery, GitClient};
use crate::core::config::DEFAULT_READ_TIMEOUT;
use crate::core::ids::FileId;
use crate::core::types::{
    short_branch_name, with_refs_heads_prefix, RepositoryId, DEFAULT_FILE_BRANCH,
};

fn default_branch() -> String {
    DEFAULT_FILE_BRANCH.to_string()
}

/// Declared file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub repository_id: String,
    /// Path of the file within the repository.
    pub file: String,
    pub content: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Message for the commit that writes the file. Defaults to
    /// `Add <file>` on create and `Update <file>` on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    /// Allow create to replace a file that already exists.
    #[serde(default)]
    pub overwrite_on_create: bool,
}

impl FileConfig {
    pub fn new(
        repository_id: impl Into<String>,
        file: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            repository_id: repository_id.into(),
            file: file.into(),
            content: content.into(),
            branch: default_branch(),
            commit_message: None,
            overwrite_on_create: false,
        }
    }

    pub fn on_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }

    pub fn overwrite_on_create(mut self, overwrite: bool) -> Self {
        self.overwrite_on_create = overwrite;
        self
    }

    /// `repositoryId/filePath`
    pub fn id(&self) -> String {
        FileId::new(&self.repository_id, &self.file, &self.branch).to_string()
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` for a repository id that is not a UUID or an
    /// empty file path or branch.
    pub fn validate(&self) -> Result<(), ResourceError> {
        RepositoryId::parse(&self.repository_id)
            .map_err(|e| ResourceError::InvalidConfig(e.to_string()))?;
        if self.file.is_empty() {
            return Err(ResourceError::InvalidConfig(
                "file path must not be empty".into(),
            ));
        }
        if self.branch.is_empty() {
            return Err(ResourceError::InvalidConfig(
                "branch must not be empty".into(),
            ));
        }
        Ok(())
    }

    fn create_message(&self) -> String {
        self.commit_message
            .clone()
            .unwrap_or_else(|| format!("Add {}", self.file))
    }

    /// An explicit message is kept unless it is the create default.
    fn update_message(&self) -> String {
        let added = format!("Add {}", self.file);
        match &self.commit_message {
            Some(message) if *message != added => message.clone(),
            _ => format!("Update {}", self.file),
        }
    }
}

/// Observed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    /// `repositoryId/filePath`
    pub id: String,
    pub repository_id: String,
    pub file: String,
    pub content: String,
    pub branch: String,
    /// Message of the last commit that changed the file.
    pub commit_message: Option<String>,
    pub overwrite_on_create: bool,
}

/// File lifecycle operations against a remote repository.
#[derive(Clone)]
pub struct FileResource {
    client: Arc<dyn GitClient>,
    retry: RetryPolicy,
    read_timeout: Duration,
}

impl FileResource {
    pub fn new(client: Arc<dyn GitClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Deadline and backoff for create, update and delete pushes.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Write the file to its branch, then read it back.
    ///
    /// # Errors
    ///
    /// Fails if the branch does not exist, if the file exists and
    /// `overwrite_on_create` is false (nothing is pushed), or if the push
    /// cannot land before the deadline.
    pub async fn create(&self, config: &FileConfig) -> Result<FileState, ResourceError> {
        config.validate()?;
        self.ensure_branch(&config.repository_id, &config.branch).await?;

        let exists = self
            .item_exists(&config.repository_id, &config.file, &config.branch)
            .await
            .with_context(|| {
                format!(
                    "checking for \"{}\" on branch \"{}\"",
                    config.file, config.branch
                )
            })?;
        let change_type = match (exists, config.overwrite_on_create) {
            (true, false) => {
                return Err(ResourceError::RefusingToOverwrite {
                    path: config.file.clone(),
                })
            }
            (true, true) => ChangeType::Edit,
            (false, _) => ChangeType::Add,
        };

        self.push(
            &config.repository_id,
            &config.branch,
            GitChange::write(change_type, &config.file, &config.content),
            config.create_message(),
        )
        .await
        .with_context(|| {
            format!(
                "creating file \"{}\" on branch \"{}\"",
                config.file, config.branch
            )
        })?;
        info!(file = %config.file, branch = %config.branch, %change_type, "wrote file");

        self.read_back(config).await
    }

    /// Read the file identified by `repositoryId/filePath` on `branch`.
    ///
    /// Returns `Ok(None)` if the file is gone from the branch.
    ///
    /// # Errors
    ///
    /// Fails if the branch does not exist or the read does not finish
    /// within the read timeout.
    pub async fn read(&self, id: &str, branch: &str) -> Result<Option<FileState>, ResourceError> {
        let id = FileId::parse_stored(id, branch)?;
        with_deadline(self.read_timeout, "reading file", self.read_file(&id)).await
    }

    /// Replace the file's content on its branch, then read it back.
    pub async fn update(&self, config: &FileConfig) -> Result<FileState, ResourceError> {
        config.validate()?;
        self.ensure_branch(&config.repository_id, &config.branch).await?;

        self.push(
            &config.repository_id,
            &config.branch,
            GitChange::write(ChangeType::Edit, &config.file, &config.content),
            config.update_message(),
        )
        .await
        .with_context(|| {
            format!(
                "updating file \"{}\" on branch \"{}\"",
                config.file, config.branch
            )
        })?;
        info!(file = %config.file, branch = %config.branch, "updated file");

        self.read_back(config).await
    }

    /// Remove the file from its branch.
    pub async fn delete(&self, id: &str, branch: &str) -> Result<(), ResourceError> {
        let id = FileId::parse_stored(id, branch)?;

        self.push(
            &id.repository_id,
            &id.branch,
            GitChange::delete(&id.path),
            format!("Delete {}", id.path),
        )
        .await
        .with_context(|| {
            format!(
                "deleting file \"{}\" from branch \"{}\"",
                id.path, id.branch
            )
        })?;
        info!(file = %id.path, branch = %id.branch, "deleted file");
        Ok(())
    }

    /// Adopt an existing file given `repositoryId/filePath` or
    /// `repositoryId/filePath:branch`.
    ///
    /// # Errors
    ///
    /// Unlike `read`, a missing file is an error.
    pub async fn import(&self, id: &str) -> Result<FileState, ResourceError> {
        let id = FileId::parse_import(id)?;

        self.client
            .get_item(
                &id.repository_id,
                GetItemQuery {
                    path: id.path.clone(),
                    branch: Some(short_branch_name(&id.branch).to_string()),
                    include_content: false,
                },
            )
            .await
            .with_context(|| {
                format!(
                    "file \"{}\" not found in repository {} on branch \"{}\"",
                    id.path, id.repository_id, id.branch
                )
            })?;

        let mut state = with_deadline(self.read_timeout, "reading file", self.read_file(&id))
            .await?
            .ok_or_else(|| ResourceError::Vanished(format!("file \"{}\"", id.path)))?;
        state.overwrite_on_create = false;
        Ok(state)
    }

    async fn read_back(&self, config: &FileConfig) -> Result<FileState, ResourceError> {
        let id = FileId::new(&config.repository_id, &config.file, &config.branch);
        let mut state = with_deadline(self.read_timeout, "reading file", self.read_file(&id))
            .await?
            .ok_or_else(|| ResourceError::Vanished(format!("file \"{}\"", config.file)))?;
        state.overwrite_on_create = config.overwrite_on_create;
        Ok(state)
    }

    async fn read_file(&self, id: &FileId) -> Result<Option<FileState>, ResourceError> {
        self.ensure_branch(&id.repository_id, &id.branch).await?;

        let item = match self
            .client
            .get_item(
                &id.repository_id,
                GetItemQuery {
                    path: id.path.clone(),
                    branch: Some(short_branch_name(&id.branch).to_string()),
                    include_content: true,
                },
            )
            .await
        {
            Ok(item) => item,
            Err(e) if e.is_not_found() => {
                debug!(file = %id.path, branch = %id.branch, "file is gone");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading file \"{}\"", id.path));
            }
        };

        let commit = self
            .client
            .get_commit(&id.repository_id, &item.commit_id)
            .await
            .with_context(|| format!("getting last commit of \"{}\"", id.path))?;

        Ok(Some(FileState {
            id: id.to_string(),
            repository_id: id.repository_id.clone(),
            file: id.path.clone(),
            content: item.content.unwrap_or_default(),
            branch: id.branch.clone(),
            commit_message: commit.comment,
            overwrite_on_create: false,
        }))
    }

    /// # Errors
    ///
    /// `BranchNotFound` if the branch does not exist.
    async fn ensure_branch(&self, repository_id: &str, branch: &str) -> Result<(), ResourceError> {
        match self
            .client
            .get_branch(repository_id, short_branch_name(branch))
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(ResourceError::BranchNotFound {
                repository_id: repository_id.to_string(),
                branch: branch.to_string(),
            }),
            Err(e) => Err(e).with_context(|| format!("checking branch \"{branch}\"")),
        }
    }

    async fn item_exists(
        &self,
        repository_id: &str,
        path: &str,
        branch: &str,
    ) -> Result<bool, ResourceError> {
        let query = GetItemQuery {
            path: path.to_string(),
            branch: Some(short_branch_name(branch).to_string()),
            include_content: false,
        };
        match self.client.get_item(repository_id, query).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Push one commit with one change onto the current head of `branch`,
    /// retrying while other clients win the race.
    async fn push(
        &self,
        repository_id: &str,
        branch: &str,
        change: GitChange,
        message: String,
    ) -> Result<(), ResourceError> {
        let client = self.client.as_ref();
        let ref_name = with_refs_heads_prefix(branch);
        let ref_name = ref_name.as_str();

        retry(&self.retry, "push", move || {
            let change = change.clone();
            let message = message.clone();
            async move {
                let head = match branch_head(client, repository_id, branch).await {
                    Ok(head) => head,
                    Err(e) => return Err(RetryError::NonRetryable(e)),
                };
                debug!(branch, head = %head.short(7), "pushing");

                let push = GitPush {
                    ref_updates: vec![GitRefUpdate {
                        name: ref_name.to_string(),
                        old_object_id: head,
                        new_object_id: None,
                    }],
                    commits: vec![GitPushCommit {
                        comment: message,
                        changes: vec![change],
                    }],
                };
                match client.create_push(repository_id, push).await {
                    Ok(_) => Ok(()),
                    Err(e) if e.is_stale_ref() => {
                        warn!(branch, error = %e, "branch moved during push, retrying");
                        Err(RetryError::Retryable(e.into()))
                    }
                    Err(e) => Err(RetryError::NonRetryable(e.into())),
                }
            }
        })
        .await
    }
}
