//! azdo::models
//!
//! Wire types for the Azure DevOps Git REST API (version 6.0).
//!
//! Field names follow the service's camelCase JSON. Only the fields the
//! resources read or write are modelled; everything else in a response is
//! ignored on deserialization.

use serde::{Deserialize, Serialize};

use crate::core::types::Oid;

/// Envelope used by list endpoints: `{ "count": n, "value": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// A ref as returned by the get-refs endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Oid>,
    /// For annotated tags, the commit the tag ultimately points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peeled_object_id: Option<Oid>,
}

/// A compare-and-swap update of a single ref.
///
/// The update only applies when the ref currently points at
/// `old_object_id`. Inside a push, `new_object_id` is omitted and the
/// service uses the pushed commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRefUpdate {
    pub name: String,
    pub old_object_id: Oid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_object_id: Option<Oid>,
}

/// Per-ref outcome of an update-refs call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRefUpdateResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_object_id: Option<Oid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_object_id: Option<Oid>,
    pub success: bool,
    pub update_status: RefUpdateStatus,
}

/// `GitRefUpdateStatus` as reported by the service.
///
/// Displays in the service's camelCase spelling so it can be quoted
/// verbatim in error messages. Values this crate does not know are kept in
/// [`RefUpdateStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RefUpdateStatus {
    Succeeded,
    ForcePushRequired,
    StaleOldObjectId,
    InvalidRefName,
    Unprocessed,
    UnresolvableToCommit,
    WritePermissionRequired,
    ManageNotePermissionRequired,
    CreateBranchPermissionRequired,
    CreateTagPermissionRequired,
    RejectedByPlugin,
    Locked,
    RefNameConflict,
    RejectedByPolicy,
    SucceededNonExistentRef,
    SucceededCorruptRef,
    Other(String),
}

impl RefUpdateStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "succeeded",
            Self::ForcePushRequired => "forcePushRequired",
            Self::StaleOldObjectId => "staleOldObjectId",
            Self::InvalidRefName => "invalidRefName",
            Self::Unprocessed => "unprocessed",
            Self::UnresolvableToCommit => "unresolvableToCommit",
            Self::WritePermissionRequired => "writePermissionRequired",
            Self::ManageNotePermissionRequired => "manageNotePermissionRequired",
            Self::CreateBranchPermissionRequired => "createBranchPermissionRequired",
            Self::CreateTagPermissionRequired => "createTagPermissionRequired",
            Self::RejectedByPlugin => "rejectedByPlugin",
            Self::Locked => "locked",
            Self::RefNameConflict => "refNameConflict",
            Self::RejectedByPolicy => "rejectedByPolicy",
            Self::SucceededNonExistentRef => "succeededNonExistentRef",
            Self::SucceededCorruptRef => "succeededCorruptRef",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for RefUpdateStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "succeeded" => Self::Succeeded,
            "forcePushRequired" => Self::ForcePushRequired,
            "staleOldObjectId" => Self::StaleOldObjectId,
            "invalidRefName" => Self::InvalidRefName,
            "unprocessed" => Self::Unprocessed,
            "unresolvableToCommit" => Self::UnresolvableToCommit,
            "writePermissionRequired" => Self::WritePermissionRequired,
            "manageNotePermissionRequired" => Self::ManageNotePermissionRequired,
            "createBranchPermissionRequired" => Self::CreateBranchPermissionRequired,
            "createTagPermissionRequired" => Self::CreateTagPermissionRequired,
            "rejectedByPlugin" => Self::RejectedByPlugin,
            "locked" => Self::Locked,
            "refNameConflict" => Self::RefNameConflict,
            "rejectedByPolicy" => Self::RejectedByPolicy,
            "succeededNonExistentRef" => Self::SucceededNonExistentRef,
            "succeededCorruptRef" => Self::SucceededCorruptRef,
            _ => Self::Other(s),
        }
    }
}

impl From<RefUpdateStatus> for String {
    fn from(status: RefUpdateStatus) -> Self {
        match status {
            RefUpdateStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RefUpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Branch statistics from the stats/branches endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitBranchStats {
    pub name: String,
    pub commit: GitCommitRef,
    /// True for the repository's default branch.
    #[serde(default)]
    pub is_base_version: bool,
    #[serde(default)]
    pub ahead_count: u32,
    #[serde(default)]
    pub behind_count: u32,
}

/// A commit reference. `comment` is the commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitRef {
    pub commit_id: Oid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// An item (file or folder) in a repository at some version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitItem {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Oid>,
    /// The last commit that changed this item.
    pub commit_id: Oid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Kind of change inside a pushed commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeType {
    Add,
    Edit,
    Delete,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Add => write!(f, "add"),
            ChangeType::Edit => write!(f, "edit"),
            ChangeType::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemContentType {
    RawText,
    Base64Encoded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContent {
    pub content: String,
    pub content_type: ItemContentType,
}

impl ItemContent {
    pub fn raw_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: ItemContentType::RawText,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPath {
    pub path: String,
}

/// A single file change inside a pushed commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitChange {
    pub change_type: ChangeType,
    pub item: ItemPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_content: Option<ItemContent>,
}

impl GitChange {
    /// An add or edit of `path` with raw text content.
    pub fn write(
        change_type: ChangeType,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            change_type,
            item: ItemPath { path: path.into() },
            new_content: Some(ItemContent::raw_text(content)),
        }
    }

    /// A deletion of `path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            change_type: ChangeType::Delete,
            item: ItemPath { path: path.into() },
            new_content: None,
        }
    }
}

/// A commit to be created by a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPushCommit {
    pub comment: String,
    pub changes: Vec<GitChange>,
}

/// An atomic push: commits plus the ref updates that publish them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPush {
    pub ref_updates: Vec<GitRefUpdate>,
    pub commits: Vec<GitPushCommit>,
}

/// What the service returns for an accepted push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPushRef {
    #[serde(default)]
    pub push_id: Option<u64>,
    #[serde(default)]
    pub commits: Vec<GitCommitRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_update_status_display_is_camel_case() {
        assert_eq!(RefUpdateStatus::InvalidRefName.to_string(), "invalidRefName");
        assert_eq!(
            RefUpdateStatus::StaleOldObjectId.to_string(),
            "staleOldObjectId"
        );
    }

    #[test]
    fn ref_update_status_keeps_unknown_values() {
        let status: RefUpdateStatus = serde_json::from_str("\"somethingNew\"").unwrap();
        assert_eq!(status, RefUpdateStatus::Other("somethingNew".into()));
        assert_eq!(status.to_string(), "somethingNew");
    }

    #[test]
    fn ref_update_result_parses_service_json() {
        let json = r#"{
            "repositoryId": "6f1c2a34-1b2c-4d5e-8f90-123456789abc",
            "name": "refs/heads/feature",
            "oldObjectId": "0000000000000000000000000000000000000000",
            "newObjectId": "abc123def4567890abc123def4567890abc12345",
            "isLocked": false,
            "success": false,
            "updateStatus": "invalidRefName"
        }"#;
        let result: GitRefUpdateResult = serde_json::from_str(json).unwrap();
        assert!(!result.success);
        assert_eq!(result.update_status, RefUpdateStatus::InvalidRefName);
        assert_eq!(result.old_object_id, Some(Oid::ZERO));
    }

    #[test]
    fn push_serializes_without_new_object_id() {
        let push = GitPush {
            ref_updates: vec![GitRefUpdate {
                name: "refs/heads/main".into(),
                old_object_id: Oid::ZERO,
                new_object_id: None,
            }],
            commits: vec![GitPushCommit {
                comment: "Add a.txt".into(),
                changes: vec![GitChange::write(ChangeType::Add, "a.txt", "hello")],
            }],
        };

        let value = serde_json::to_value(&push).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "refUpdates": [{
                    "name": "refs/heads/main",
                    "oldObjectId": "0000000000000000000000000000000000000000"
                }],
                "commits": [{
                    "comment": "Add a.txt",
                    "changes": [{
                        "changeType": "add",
                        "item": { "path": "a.txt" },
                        "newContent": { "content": "hello", "contentType": "rawText" }
                    }]
                }]
            })
        );
    }

    #[test]
    fn delete_change_has_no_content() {
        let value = serde_json::to_value(GitChange::delete("a.txt")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "changeType": "delete", "item": { "path": "a.txt" } })
        );
    }

    #[test]
    fn branch_stats_parse() {
        let json = r#"{
            "commit": { "commitId": "abc123def4567890abc123def4567890abc12345", "comment": "x" },
            "name": "main",
            "aheadCount": 0,
            "behindCount": 0,
            "isBaseVersion": true
        }"#;
        let stats: GitBranchStats = serde_json::from_str(json).unwrap();
        assert!(stats.is_base_version);
        assert_eq!(stats.commit.comment.as_deref(), Some("x"));
    }
}
