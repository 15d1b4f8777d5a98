//! azdo::mock
//!
//! In-memory `GitClient` for deterministic testing.
//!
//! # Design
//!
//! The mock keeps a tiny model of each repository: refs pointing at
//! commits, and commits holding a full file tree. Ref updates and pushes
//! enforce the same compare-and-swap rule as the service, so races can be
//! reproduced by moving a branch between two calls. Failures can be
//! injected per operation, and every call is recorded for verification.
//!
//! # Example
//!
//! ```
//! use adogit::azdo::mock::MockGitClient;
//! use adogit::azdo::GitClient;
//!
//! # tokio_test::block_on(async {
//! let client = MockGitClient::new();
//! let head = client.seed_branch("repo", "main", &[("readme.md", "hi")]);
//!
//! let stats = client.get_branch("repo", "main").await.unwrap();
//! assert_eq!(stats.commit.commit_id, head);
//! # });
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::models::{
    ChangeType, GitBranchStats, GitCommitRef, GitItem, GitPush, GitPushRef, GitRef,
    GitRefUpdate, GitRefUpdateResult, RefUpdateStatus,
};
use super::traits::{
    AzdoError, GetCommitsQuery, GetItemQuery, GetRefsQuery, GitClient, STALE_REF_TYPE_KEY,
};
use crate::core::types::{with_refs_heads_prefix, Oid};

/// Mock Git client for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockGitClient {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Debug, Default)]
struct MockInner {
    repos: HashMap<String, MockRepo>,
    /// Counter used to mint object ids.
    next_object: u64,
    fail_on: Option<FailOn>,
    /// Pushes still to be rejected as stale before pushes succeed again.
    pending_conflicts: usize,
    /// Push a commit to this branch right after the next get-branch call.
    race_after_get_branch: Option<(String, String)>,
    operations: Vec<MockOperation>,
}

#[derive(Debug, Default)]
struct MockRepo {
    /// Full ref name -> object id (a commit, or a tag object for annotated tags).
    refs: BTreeMap<String, Oid>,
    /// Annotated tag object -> commit it points at.
    tags: HashMap<Oid, Oid>,
    commits: HashMap<Oid, MockCommit>,
    default_branch: Option<String>,
}

#[derive(Debug, Clone)]
struct MockCommit {
    comment: String,
    parent: Option<Oid>,
    /// Path (no leading `/`) -> (content, commit that last changed it).
    tree: BTreeMap<String, (String, Oid)>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    GetBranch(AzdoError),
    GetRefs(AzdoError),
    UpdateRefs(AzdoError),
    GetItem(AzdoError),
    GetCommits(AzdoError),
    GetCommit(AzdoError),
    CreatePush(AzdoError),
    /// Report this status for every update-refs result.
    RefUpdateStatus(RefUpdateStatus),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetBranch {
        repository_id: String,
        name: String,
    },
    GetRefs {
        repository_id: String,
        query: GetRefsQuery,
    },
    UpdateRefs {
        repository_id: String,
        updates: Vec<GitRefUpdate>,
    },
    GetItem {
        repository_id: String,
        query: GetItemQuery,
    },
    GetCommits {
        repository_id: String,
        query: GetCommitsQuery,
    },
    GetCommit {
        repository_id: String,
        commit_id: Oid,
    },
    CreatePush {
        repository_id: String,
        push: GitPush,
    },
}

impl MockGitClient {
    /// Create a new empty mock.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner {
                next_object: 1,
                ..MockInner::default()
            })),
        }
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.set_fail_on(fail_on);
        self
    }

    /// Configure a failure on an existing (possibly shared) mock.
    pub fn set_fail_on(&self, fail_on: FailOn) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = Some(fail_on);
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Reject the next `count` pushes as if another client moved the branch
    /// first. Use `usize::MAX` for a conflict that never clears.
    pub fn conflict_next_pushes(&self, count: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.pending_conflicts = count;
    }

    /// Simulate a concurrent writer: right after the next get-branch call
    /// returns, push a new commit onto `branch`.
    pub fn race_after_next_get_branch(&self, repository_id: &str, branch: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.race_after_get_branch = Some((repository_id.to_string(), branch.to_string()));
    }

    /// Create (or advance) a branch with a commit containing `files`.
    ///
    /// Returns the new head commit id.
    pub fn seed_branch(&self, repository_id: &str, branch: &str, files: &[(&str, &str)]) -> Oid {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.mint();
        let repo = inner.repos.entry(repository_id.to_string()).or_default();
        let ref_name = with_refs_heads_prefix(branch);

        let parent = repo.refs.get(&ref_name).cloned();
        let mut tree = parent
            .as_ref()
            .and_then(|p| repo.commits.get(p))
            .map(|c| c.tree.clone())
            .unwrap_or_default();
        for (path, content) in files {
            tree.insert(normalize_path(path), (content.to_string(), id.clone()));
        }

        repo.commits.insert(
            id.clone(),
            MockCommit {
                comment: format!("Seed {}", branch),
                parent,
                tree,
            },
        );
        repo.refs.insert(ref_name, id.clone());
        id
    }

    /// Create an annotated tag pointing at `commit`.
    ///
    /// Returns the tag object id (distinct from the commit id).
    pub fn seed_annotated_tag(&self, repository_id: &str, tag: &str, commit: &Oid) -> Oid {
        let mut inner = self.inner.lock().unwrap();
        let tag_object = inner.mint();
        let repo = inner.repos.entry(repository_id.to_string()).or_default();
        repo.tags.insert(tag_object.clone(), commit.clone());
        repo.refs
            .insert(format!("refs/tags/{}", tag), tag_object.clone());
        tag_object
    }

    /// Mark a branch as the repository default.
    pub fn set_default_branch(&self, repository_id: &str, branch: &str) {
        let mut inner = self.inner.lock().unwrap();
        let repo = inner.repos.entry(repository_id.to_string()).or_default();
        repo.default_branch = Some(with_refs_heads_prefix(branch));
    }

    /// Current head of a branch.
    pub fn head(&self, repository_id: &str, branch: &str) -> Option<Oid> {
        let inner = self.inner.lock().unwrap();
        inner
            .repos
            .get(repository_id)
            .and_then(|r| r.refs.get(&with_refs_heads_prefix(branch)))
            .cloned()
    }

    /// Content of a file at the head of a branch.
    pub fn file_content(&self, repository_id: &str, branch: &str, path: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        let repo = inner.repos.get(repository_id)?;
        let head = repo.refs.get(&with_refs_heads_prefix(branch))?;
        repo.commits
            .get(head)?
            .tree
            .get(&normalize_path(path))
            .map(|(content, _)| content.clone())
    }

    /// Message of a commit.
    pub fn commit_message(&self, repository_id: &str, commit: &Oid) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .repos
            .get(repository_id)?
            .commits
            .get(commit)
            .map(|c| c.comment.clone())
    }

    /// Number of commits stored for a repository.
    pub fn commit_count(&self, repository_id: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .repos
            .get(repository_id)
            .map_or(0, |r| r.commits.len())
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Number of recorded push attempts (including rejected ones).
    pub fn push_count(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, MockOperation::CreatePush { .. }))
            .count()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Option<AzdoError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::GetBranch(e)) if expected == "get_branch" => Some(e.clone()),
            Some(FailOn::GetRefs(e)) if expected == "get_refs" => Some(e.clone()),
            Some(FailOn::UpdateRefs(e)) if expected == "update_refs" => Some(e.clone()),
            Some(FailOn::GetItem(e)) if expected == "get_item" => Some(e.clone()),
            Some(FailOn::GetCommits(e)) if expected == "get_commits" => Some(e.clone()),
            Some(FailOn::GetCommit(e)) if expected == "get_commit" => Some(e.clone()),
            Some(FailOn::CreatePush(e)) if expected == "create_push" => Some(e.clone()),
            _ => None,
        }
    }
}

impl Default for MockGitClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInner {
    fn mint(&mut self) -> Oid {
        let n = self.next_object;
        self.next_object += 1;
        Oid::new(format!("{:040x}", 0xc0ffee_0000_0000_u64 + n)).unwrap()
    }

    fn repo(&self, repository_id: &str) -> Result<&MockRepo, AzdoError> {
        self.repos.get(repository_id).ok_or_else(|| {
            AzdoError::NotFound(format!("repository {} does not exist", repository_id))
        })
    }

    fn repo_mut(&mut self, repository_id: &str) -> Result<&mut MockRepo, AzdoError> {
        self.repos.get_mut(repository_id).ok_or_else(|| {
            AzdoError::NotFound(format!("repository {} does not exist", repository_id))
        })
    }

    /// Apply a concurrent push of one new commit on top of `branch`.
    fn race(&mut self, repository_id: &str, branch: &str) {
        let id = self.mint();
        let Some(repo) = self.repos.get_mut(repository_id) else {
            return;
        };
        let ref_name = with_refs_heads_prefix(branch);
        let Some(parent) = repo.refs.get(&ref_name).cloned() else {
            return;
        };
        let tree = repo
            .commits
            .get(&parent)
            .map(|c| c.tree.clone())
            .unwrap_or_default();
        repo.commits.insert(
            id.clone(),
            MockCommit {
                comment: "Concurrent change".to_string(),
                parent: Some(parent),
                tree,
            },
        );
        repo.refs.insert(ref_name, id);
    }
}

impl MockRepo {
    fn branch_head(&self, short_name: &str) -> Result<&Oid, AzdoError> {
        self.refs
            .get(&with_refs_heads_prefix(short_name))
            .ok_or_else(|| AzdoError::NotFound(format!("branch {} does not exist", short_name)))
    }

    fn head_for(&self, branch: Option<&str>) -> Result<&Oid, AzdoError> {
        match branch {
            Some(b) => self.branch_head(b),
            None => self
                .default_branch
                .as_ref()
                .and_then(|b| self.refs.get(b))
                .ok_or_else(|| AzdoError::NotFound("repository has no default branch".into())),
        }
    }
}

fn normalize_path(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

fn stale_push_error(ref_name: &str) -> AzdoError {
    AzdoError::ApiError {
        status: 409,
        message: format!(
            "TF401028: The reference '{}' has already been updated by another client, so you cannot update it. Please try again.",
            ref_name
        ),
        type_key: Some(STALE_REF_TYPE_KEY.to_string()),
    }
}

fn bad_request(message: String) -> AzdoError {
    AzdoError::ApiError {
        status: 400,
        message,
        type_key: None,
    }
}

#[async_trait]
impl GitClient for MockGitClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_branch(
        &self,
        repository_id: &str,
        name: &str,
    ) -> Result<GitBranchStats, AzdoError> {
        self.record(MockOperation::GetBranch {
            repository_id: repository_id.to_string(),
            name: name.to_string(),
        });
        if let Some(e) = self.check_fail("get_branch") {
            return Err(e);
        }

        let mut inner = self.inner.lock().unwrap();
        let stats = {
            let repo = inner.repo(repository_id)?;
            let head = repo.branch_head(name)?;
            let comment = repo.commits.get(head).map(|c| c.comment.clone());
            GitBranchStats {
                name: name.to_string(),
                commit: GitCommitRef {
                    commit_id: head.clone(),
                    comment,
                },
                is_base_version: repo.default_branch.as_deref()
                    == Some(with_refs_heads_prefix(name).as_str()),
                ahead_count: 0,
                behind_count: 0,
            }
        };

        if let Some((repo, branch)) = inner.race_after_get_branch.take() {
            inner.race(&repo, &branch);
        }
        Ok(stats)
    }

    async fn get_refs(
        &self,
        repository_id: &str,
        query: GetRefsQuery,
    ) -> Result<Vec<GitRef>, AzdoError> {
        self.record(MockOperation::GetRefs {
            repository_id: repository_id.to_string(),
            query: query.clone(),
        });
        if let Some(e) = self.check_fail("get_refs") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        let repo = inner.repo(repository_id)?;
        let prefix = format!("refs/{}", query.filter);

        let mut refs: Vec<GitRef> = repo
            .refs
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(name, id)| GitRef {
                name: name.clone(),
                object_id: Some(id.clone()),
                peeled_object_id: if query.peel_tags {
                    repo.tags.get(id).cloned()
                } else {
                    None
                },
            })
            .collect();
        // The service orders matches shortest name first.
        refs.sort_by(|a, b| a.name.len().cmp(&b.name.len()).then(a.name.cmp(&b.name)));
        if let Some(top) = query.top {
            refs.truncate(top as usize);
        }
        Ok(refs)
    }

    async fn update_refs(
        &self,
        repository_id: &str,
        updates: Vec<GitRefUpdate>,
    ) -> Result<Vec<GitRefUpdateResult>, AzdoError> {
        self.record(MockOperation::UpdateRefs {
            repository_id: repository_id.to_string(),
            updates: updates.clone(),
        });
        if let Some(e) = self.check_fail("update_refs") {
            return Err(e);
        }

        let mut inner = self.inner.lock().unwrap();
        let forced_status = match &inner.fail_on {
            Some(FailOn::RefUpdateStatus(status)) => Some(status.clone()),
            _ => None,
        };
        let repo = inner.repo_mut(repository_id)?;

        let mut results = Vec::with_capacity(updates.len());
        for update in updates {
            let new_id = update.new_object_id.clone().unwrap_or(Oid::ZERO);
            let current = repo.refs.get(&update.name).cloned().unwrap_or(Oid::ZERO);

            let status = if let Some(status) = forced_status.clone() {
                status
            } else if !update.name.starts_with("refs/") || update.name.ends_with('/') {
                RefUpdateStatus::InvalidRefName
            } else if current != update.old_object_id {
                RefUpdateStatus::StaleOldObjectId
            } else if !new_id.is_zero()
                && !repo.commits.contains_key(&new_id)
                && !repo.tags.contains_key(&new_id)
            {
                RefUpdateStatus::UnresolvableToCommit
            } else {
                if new_id.is_zero() {
                    repo.refs.remove(&update.name);
                } else {
                    repo.refs.insert(update.name.clone(), new_id.clone());
                }
                RefUpdateStatus::Succeeded
            };

            results.push(GitRefUpdateResult {
                name: update.name,
                old_object_id: Some(update.old_object_id),
                new_object_id: Some(new_id),
                success: status == RefUpdateStatus::Succeeded,
                update_status: status,
            });
        }
        Ok(results)
    }

    async fn get_item(
        &self,
        repository_id: &str,
        query: GetItemQuery,
    ) -> Result<GitItem, AzdoError> {
        self.record(MockOperation::GetItem {
            repository_id: repository_id.to_string(),
            query: query.clone(),
        });
        if let Some(e) = self.check_fail("get_item") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        let repo = inner.repo(repository_id)?;
        let head = repo.head_for(query.branch.as_deref())?;
        let commit = repo
            .commits
            .get(head)
            .ok_or_else(|| AzdoError::NotFound(format!("commit {} does not exist", head)))?;
        let path = normalize_path(&query.path);
        let (content, last_commit) = commit.tree.get(&path).ok_or_else(|| {
            AzdoError::NotFound(format!(
                "TF401174: The item '{}' could not be found in the repository",
                query.path
            ))
        })?;

        Ok(GitItem {
            path: format!("/{}", path),
            object_id: None,
            commit_id: last_commit.clone(),
            content: query.include_content.then(|| content.clone()),
        })
    }

    async fn get_commits(
        &self,
        repository_id: &str,
        query: GetCommitsQuery,
    ) -> Result<Vec<GitCommitRef>, AzdoError> {
        self.record(MockOperation::GetCommits {
            repository_id: repository_id.to_string(),
            query: query.clone(),
        });
        if let Some(e) = self.check_fail("get_commits") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        let repo = inner.repo(repository_id)?;
        let mut next = Some(repo.branch_head(&query.branch)?.clone());
        let mut commits = Vec::new();
        while let Some(id) = next {
            if commits.len() >= query.top as usize {
                break;
            }
            let commit = repo.commits.get(&id);
            next = commit.and_then(|c| c.parent.clone());
            commits.push(GitCommitRef {
                commit_id: id,
                comment: commit.map(|c| c.comment.clone()),
            });
        }
        Ok(commits)
    }

    async fn get_commit(
        &self,
        repository_id: &str,
        commit_id: &Oid,
    ) -> Result<GitCommitRef, AzdoError> {
        self.record(MockOperation::GetCommit {
            repository_id: repository_id.to_string(),
            commit_id: commit_id.clone(),
        });
        if let Some(e) = self.check_fail("get_commit") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        let repo = inner.repo(repository_id)?;
        let commit = repo
            .commits
            .get(commit_id)
            .ok_or_else(|| AzdoError::NotFound(format!("commit {} does not exist", commit_id)))?;
        Ok(GitCommitRef {
            commit_id: commit_id.clone(),
            comment: Some(commit.comment.clone()),
        })
    }

    async fn create_push(
        &self,
        repository_id: &str,
        push: GitPush,
    ) -> Result<GitPushRef, AzdoError> {
        self.record(MockOperation::CreatePush {
            repository_id: repository_id.to_string(),
            push: push.clone(),
        });
        if let Some(e) = self.check_fail("create_push") {
            return Err(e);
        }

        let mut inner = self.inner.lock().unwrap();
        let ref_update = push
            .ref_updates
            .first()
            .cloned()
            .ok_or_else(|| bad_request("a push must update exactly one ref".into()))?;

        if inner.pending_conflicts > 0 {
            inner.pending_conflicts -= 1;
            return Err(stale_push_error(&ref_update.name));
        }

        let ids: Vec<Oid> = push.commits.iter().map(|_| inner.mint()).collect();
        let repo = inner.repo_mut(repository_id)?;

        let current = repo.refs.get(&ref_update.name).cloned().unwrap_or(Oid::ZERO);
        if current != ref_update.old_object_id {
            return Err(stale_push_error(&ref_update.name));
        }

        let mut parent = (!current.is_zero()).then_some(current);
        let mut created = Vec::new();
        for (commit, id) in push.commits.iter().zip(ids) {
            let mut tree = parent
                .as_ref()
                .and_then(|p| repo.commits.get(p))
                .map(|c| c.tree.clone())
                .unwrap_or_default();

            for change in &commit.changes {
                let path = normalize_path(&change.item.path);
                let exists = tree.contains_key(&path);
                match change.change_type {
                    ChangeType::Add if exists => {
                        return Err(bad_request(format!(
                            "TF401275: The item '{}' already exists",
                            change.item.path
                        )))
                    }
                    ChangeType::Edit | ChangeType::Delete if !exists => {
                        return Err(bad_request(format!(
                            "TF401174: The item '{}' could not be found",
                            change.item.path
                        )))
                    }
                    ChangeType::Delete => {
                        tree.remove(&path);
                    }
                    ChangeType::Add | ChangeType::Edit => {
                        let content = change
                            .new_content
                            .as_ref()
                            .map(|c| c.content.clone())
                            .unwrap_or_default();
                        tree.insert(path, (content, id.clone()));
                    }
                }
            }

            repo.commits.insert(
                id.clone(),
                MockCommit {
                    comment: commit.comment.clone(),
                    parent: parent.clone(),
                    tree,
                },
            );
            created.push(GitCommitRef {
                commit_id: id.clone(),
                comment: Some(commit.comment.clone()),
            });
            parent = Some(id);
        }

        if let Some(head) = parent {
            repo.refs.insert(ref_update.name, head);
        }

        Ok(GitPushRef {
            push_id: Some(created.len() as u64),
            commits: created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azdo::models::{GitChange, GitPushCommit};

    fn push_to(name: &str, old: Oid, change: GitChange) -> GitPush {
        GitPush {
            ref_updates: vec![GitRefUpdate {
                name: name.to_string(),
                old_object_id: old,
                new_object_id: None,
            }],
            commits: vec![GitPushCommit {
                comment: "change".into(),
                changes: vec![change],
            }],
        }
    }

    #[tokio::test]
    async fn get_branch_unknown_is_not_found() {
        let client = MockGitClient::new();
        client.seed_branch("repo", "main", &[]);

        let err = client.get_branch("repo", "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn refs_are_shortest_first() {
        let client = MockGitClient::new();
        client.seed_branch("repo", "foobar", &[]);
        client.seed_branch("repo", "foo", &[]);

        let refs = client
            .get_refs("repo", GetRefsQuery::prefix("heads/foo", 10))
            .await
            .unwrap();
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["refs/heads/foo", "refs/heads/foobar"]);
    }

    #[tokio::test]
    async fn annotated_tags_are_peeled() {
        let client = MockGitClient::new();
        let commit = client.seed_branch("repo", "main", &[]);
        let tag = client.seed_annotated_tag("repo", "v1", &commit);

        let refs = client
            .get_refs("repo", GetRefsQuery::prefix("tags/v1", 1))
            .await
            .unwrap();
        assert_eq!(refs[0].object_id, Some(tag));
        assert_eq!(refs[0].peeled_object_id, Some(commit));
    }

    #[tokio::test]
    async fn update_refs_enforces_old_object_id() {
        let client = MockGitClient::new();
        let head = client.seed_branch("repo", "main", &[]);

        let results = client
            .update_refs(
                "repo",
                vec![GitRefUpdate {
                    name: "refs/heads/copy".into(),
                    old_object_id: head.clone(),
                    new_object_id: Some(head.clone()),
                }],
            )
            .await
            .unwrap();
        assert!(!results[0].success);
        assert_eq!(results[0].update_status, RefUpdateStatus::StaleOldObjectId);
        assert_eq!(client.head("repo", "copy"), None);
    }

    #[tokio::test]
    async fn push_with_stale_head_is_rejected() {
        let client = MockGitClient::new();
        let head = client.seed_branch("repo", "main", &[("a.txt", "1")]);
        client.seed_branch("repo", "main", &[("a.txt", "2")]);

        let err = client
            .create_push(
                "repo",
                push_to(
                    "refs/heads/main",
                    head,
                    GitChange::write(ChangeType::Edit, "a.txt", "3"),
                ),
            )
            .await
            .unwrap_err();
        assert!(err.is_stale_ref());
        assert_eq!(client.file_content("repo", "main", "a.txt").as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn push_tracks_last_commit_per_item() {
        let client = MockGitClient::new();
        let head = client.seed_branch("repo", "main", &[("a.txt", "1")]);

        let pushed = client
            .create_push(
                "repo",
                push_to(
                    "refs/heads/main",
                    head,
                    GitChange::write(ChangeType::Add, "b.txt", "new"),
                ),
            )
            .await
            .unwrap();
        let new_head = pushed.commits[0].commit_id.clone();

        let a = client
            .get_item(
                "repo",
                GetItemQuery {
                    path: "a.txt".into(),
                    branch: Some("main".into()),
                    include_content: false,
                },
            )
            .await
            .unwrap();
        let b = client
            .get_item(
                "repo",
                GetItemQuery {
                    path: "b.txt".into(),
                    branch: Some("main".into()),
                    include_content: true,
                },
            )
            .await
            .unwrap();

        assert_ne!(a.commit_id, new_head);
        assert!(a.content.is_none());
        assert_eq!(b.commit_id, new_head);
        assert_eq!(b.content.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn injected_failure_is_returned_and_recorded() {
        let client = MockGitClient::new().fail_on(FailOn::GetCommit(AzdoError::RateLimited));

        let err = client.get_commit("repo", &Oid::ZERO).await.unwrap_err();
        assert_eq!(err, AzdoError::RateLimited);
        assert_eq!(client.operations().len(), 1);
    }
}
