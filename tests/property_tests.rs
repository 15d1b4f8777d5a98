//! Property-based tests for core domain types.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use adogit::core::ids::{BranchId, FileId};
use adogit::core::types::{short_branch_name, with_refs_heads_prefix, Oid, DEFAULT_FILE_BRANCH};

/// Strategy for repository ids (UUID-like, never containing `/` or `:`).
fn repository_id() -> impl Strategy<Value = String> {
    "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}"
}

/// Strategy for branch names without `:`.
fn branch_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9._-]{1,20}(/[a-zA-Z0-9._-]{1,20}){0,2}"
}

/// Strategy for repository file paths without `:`.
fn file_path() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9._-]{1,12}(/[a-zA-Z0-9._-]{1,12}){0,3}"
}

proptest! {
    #[test]
    fn branch_id_display_parses_back(repo in repository_id(), name in branch_name()) {
        let id = BranchId::new(&repo, &name);
        let parsed: BranchId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }

    #[test]
    fn branch_id_with_extra_colon_is_rejected(
        repo in repository_id(),
        name in branch_name(),
        extra in branch_name(),
    ) {
        let id = format!("{repo}:{name}:{extra}");
        prop_assert!(id.parse::<BranchId>().is_err());
    }

    #[test]
    fn file_import_splits_repo_path_and_branch(
        repo in repository_id(),
        path in file_path(),
        branch in branch_name(),
    ) {
        let id = FileId::parse_import(&format!("{repo}/{path}:{branch}")).unwrap();
        prop_assert_eq!(&id.repository_id, &repo);
        prop_assert_eq!(&id.path, &path);
        prop_assert_eq!(&id.branch, &branch);
        prop_assert_eq!(id.to_string(), format!("{repo}/{path}"));
    }

    #[test]
    fn file_import_without_branch_uses_default(repo in repository_id(), path in file_path()) {
        let id = FileId::parse_import(&format!("{repo}/{path}")).unwrap();
        prop_assert_eq!(id.branch, DEFAULT_FILE_BRANCH);
    }

    #[test]
    fn file_import_with_two_colons_is_rejected(
        repo in repository_id(),
        path in file_path(),
        a in branch_name(),
        b in branch_name(),
    ) {
        let import_id = format!("{repo}/{path}:{a}:{b}");
        prop_assert!(FileId::parse_import(&import_id).is_err());
    }

    #[test]
    fn refs_heads_prefix_is_idempotent(name in branch_name()) {
        prop_assume!(!name.starts_with("refs/heads/"));
        let once = with_refs_heads_prefix(&name);
        prop_assert_eq!(with_refs_heads_prefix(&once), once.clone());
        prop_assert_eq!(short_branch_name(&once), name.as_str());
    }

    #[test]
    fn oid_accepts_any_sha1_and_lowercases(hex in "[0-9a-fA-F]{40}") {
        let oid = Oid::new(hex.clone()).unwrap();
        prop_assert_eq!(oid.as_str(), hex.to_lowercase());
        prop_assert_eq!(oid.is_zero(), hex.chars().all(|c| c == '0'));
    }

    #[test]
    fn oid_rejects_wrong_lengths(hex in "[0-9a-f]{1,39}") {
        prop_assert!(Oid::new(hex).is_err());
    }
}
