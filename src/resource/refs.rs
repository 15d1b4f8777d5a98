//! resource::refs
//!
//! Ref resolution and compare-and-swap ref updates shared by both
//! resources.

use tracing::debug;

use super::error::ResourceError;
use crate::azdo::models::{GitRefUpdate, GitRefUpdateResult};
use crate::azdo::{GetCommitsQuery, GetRefsQuery, GitClient};
use crate::core::types::{short_branch_name, Oid};

/// Resolve a symbolic ref (`refs/heads/foo`, `refs/tags/v1`) to a commit.
///
/// Annotated tags resolve to the commit they peel to. The service matches
/// refs by prefix, so the first result must match `reference` exactly.
///
/// # Errors
///
/// - `NoMatchingRefs` if nothing starts with `reference`
/// - `RefNotFound` if the closest match is a different ref
/// - `MissingCommitId` if the ref carries no object id
pub async fn resolve_source_commit(
    client: &dyn GitClient,
    repository_id: &str,
    reference: &str,
) -> Result<Oid, ResourceError> {
    let filter = reference.strip_prefix("refs/").unwrap_or(reference);
    let refs = client
        .get_refs(repository_id, GetRefsQuery::prefix(filter, 1))
        .await?;

    let found = refs
        .into_iter()
        .next()
        .ok_or_else(|| ResourceError::NoMatchingRefs(reference.to_string()))?;
    if found.name != reference {
        return Err(ResourceError::RefNotFound {
            requested: reference.to_string(),
            closest: found.name,
        });
    }

    let commit = found
        .peeled_object_id
        .or(found.object_id)
        .ok_or_else(|| ResourceError::MissingCommitId(found.name.clone()))?;
    debug!(reference, commit = %commit.short(7), "resolved source ref");
    Ok(commit)
}

/// Apply compare-and-swap ref updates and require every one to succeed.
///
/// # Errors
///
/// Transport failures surface as `Api`. A result with `success = false`
/// becomes `RefUpdateRejected` carrying the service's status.
pub async fn update_refs(
    client: &dyn GitClient,
    repository_id: &str,
    updates: Vec<GitRefUpdate>,
) -> Result<Vec<GitRefUpdateResult>, ResourceError> {
    let results = client.update_refs(repository_id, updates).await?;
    check_update_results(&results)?;
    Ok(results)
}

fn check_update_results(results: &[GitRefUpdateResult]) -> Result<(), ResourceError> {
    match results.iter().find(|r| !r.success) {
        Some(rejected) => Err(ResourceError::RefUpdateRejected {
            name: rejected.name.clone(),
            status: rejected.update_status.clone(),
        }),
        None => Ok(()),
    }
}

/// Latest commit on `branch`, which may be given with or without
/// `refs/heads/`.
///
/// # Errors
///
/// Returns `EmptyBranch` if the branch has no commits.
pub async fn branch_head(
    client: &dyn GitClient,
    repository_id: &str,
    branch: &str,
) -> Result<Oid, ResourceError> {
    let short = short_branch_name(branch);
    let commits = client
        .get_commits(
            repository_id,
            GetCommitsQuery {
                branch: short.to_string(),
                top: 1,
            },
        )
        .await?;

    commits
        .into_iter()
        .next()
        .map(|c| c.commit_id)
        .ok_or_else(|| ResourceError::EmptyBranch {
            branch: short.to_string(),
        })
}
