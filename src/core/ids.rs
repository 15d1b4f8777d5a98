//! core::ids
//!
//! Composite resource identifiers.
//!
//! A branch is identified by `repositoryId:branchName`. A file is identified
//! by `repositoryId/filePath`; import additionally accepts
//! `repositoryId/filePath:branch` because the branch is not part of the
//! stored identity.
//!
//! ```
//! use adogit::core::ids::{BranchId, FileId};
//!
//! let branch: BranchId = "a-repo:a-branch".parse().unwrap();
//! assert_eq!(branch.repository_id, "a-repo");
//! assert_eq!(branch.name, "a-branch");
//!
//! let file = FileId::parse_import("a-repo/dir/file.txt:refs/heads/dev").unwrap();
//! assert_eq!(file.path, "dir/file.txt");
//! assert_eq!(file.branch, "refs/heads/dev");
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::types::DEFAULT_FILE_BRANCH;

/// A resource identifier that could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid resource id '{id}': {reason}")]
pub struct IdError {
    /// The rejected identifier.
    pub id: String,
    /// Why it was rejected, including the expected format.
    pub reason: String,
}

impl IdError {
    fn new(id: &str, reason: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Identity of a branch resource: `repositoryId:branchName`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchId {
    pub repository_id: String,
    pub name: String,
}

impl BranchId {
    pub fn new(repository_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            repository_id: repository_id.into(),
            name: name.into(),
        }
    }
}

impl FromStr for BranchId {
    type Err = IdError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        const FORMAT: &str = "expected <repositoryId>:<branchName>";

        let (repository_id, name) = id
            .split_once(':')
            .ok_or_else(|| IdError::new(id, FORMAT))?;
        if repository_id.is_empty() || name.is_empty() || name.contains(':') {
            return Err(IdError::new(id, FORMAT));
        }
        Ok(Self::new(repository_id, name))
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository_id, self.name)
    }
}

/// Identity of a file resource plus the branch it lives on.
///
/// `Display` renders only `repositoryId/filePath`, the stored identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId {
    pub repository_id: String,
    pub path: String,
    pub branch: String,
}

impl FileId {
    pub fn new(
        repository_id: impl Into<String>,
        path: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            repository_id: repository_id.into(),
            path: path.into(),
            branch: branch.into(),
        }
    }

    /// Parse a stored identity (`repositoryId/filePath`) and attach the branch
    /// recorded alongside it in state.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if there is no `/` separating repository and path.
    pub fn parse_stored(id: &str, branch: impl Into<String>) -> Result<Self, IdError> {
        let (repository_id, path) = split_repo_file_path(id)?;
        Ok(Self::new(repository_id, path, branch))
    }

    /// Parse an import identifier: `repositoryId/filePath` (branch defaults
    /// to `refs/heads/master`) or `repositoryId/filePath:branch`.
    ///
    /// # Errors
    ///
    /// Returns `IdError` when more than one `:`-delimited suffix is present
    /// or the repository/path split fails.
    pub fn parse_import(id: &str) -> Result<Self, IdError> {
        let parts: Vec<&str> = id.split(':').collect();
        let (repo_and_path, branch) = match parts.as_slice() {
            [repo_and_path] => (*repo_and_path, DEFAULT_FILE_BRANCH),
            [repo_and_path, branch] if !branch.is_empty() => (*repo_and_path, *branch),
            _ => {
                return Err(IdError::new(
                    id,
                    "expected <repositoryId>/<filePath> (branch \"master\") or \
                     <repositoryId>/<filePath>:<branch>",
                ))
            }
        };
        let (repository_id, path) = split_repo_file_path(repo_and_path)?;
        Ok(Self::new(repository_id, path, branch))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.repository_id, self.path)
    }
}

/// Split `repositoryId/some/file/path` at the first `/`.
fn split_repo_file_path(id: &str) -> Result<(&str, &str), IdError> {
    match id.split_once('/') {
        Some((repo, path)) if !repo.is_empty() && !path.is_empty() => Ok((repo, path)),
        _ => Err(IdError::new(id, "expected <repositoryId>/<filePath>")),
    }
}
