//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA), including the zero sentinel
//! - [`RepositoryId`] - Azure DevOps repository UUID
//!
//! Ref names travel as plain strings because the service accepts both the
//! short (`main`) and full (`refs/heads/main`) spellings depending on the
//! endpoint. [`with_refs_heads_prefix`] and [`short_branch_name`] convert
//! between the two.
//!
//! # Examples
//!
//! ```
//! use adogit::core::types::{Oid, with_refs_heads_prefix, short_branch_name};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert!(!oid.is_zero());
//! assert!(Oid::ZERO.is_zero());
//!
//! assert_eq!(with_refs_heads_prefix("main"), "refs/heads/main");
//! assert_eq!(short_branch_name("refs/heads/main"), "main");
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of every branch ref.
pub const REFS_HEADS_PREFIX: &str = "refs/heads/";

/// Branch used by file resources when none is configured.
pub const DEFAULT_FILE_BRANCH: &str = "refs/heads/master";

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid repository id '{0}': expected a UUID")]
    InvalidRepositoryId(String),
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase. The all-zero id, [`Oid::ZERO`], is the
/// service's way of saying "this ref does not exist": it is the expected old
/// value when creating a ref and the new value when deleting one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(Cow<'static, str>);

impl Oid {
    /// The zero OID (40 zeros), meaning "ref absent".
    pub const ZERO: Oid = Oid(Cow::Borrowed("0000000000000000000000000000000000000000"));

    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(Cow::Owned(oid)))
    }

    /// Check if this is the zero/null OID.
    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| c == '0')
    }

    /// Get an abbreviated form of the OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0.into_owned()
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An Azure DevOps repository id.
///
/// Resource configuration requires a UUID. Identifiers parsed back from
/// state are not re-validated, so the lifecycle code works with plain
/// strings and only configuration goes through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepositoryId(uuid::Uuid);

impl RepositoryId {
    /// Parse a repository id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepositoryId` if the value is not a UUID.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        uuid::Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| TypeError::InvalidRepositoryId(value.to_string()))
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Return `branch` as a full ref name, adding `refs/heads/` if missing.
pub fn with_refs_heads_prefix(branch: &str) -> String {
    if branch.starts_with(REFS_HEADS_PREFIX) {
        branch.to_string()
    } else {
        format!("{REFS_HEADS_PREFIX}{branch}")
    }
}

/// Strip the `refs/heads/` prefix, which some endpoints reject.
pub fn short_branch_name(branch: &str) -> &str {
    branch.strip_prefix(REFS_HEADS_PREFIX).unwrap_or(branch)
}
