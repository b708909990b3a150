//! Account domain model.
//!
//! # Responsibility
//! - Define the canonical flat account record used by snapshot and
//!   hierarchy layers.
//! - Validate locally-enforceable field rules before records enter a
//!   snapshot cache.
//!
//! # Invariants
//! - `name` is the unique account key and never blank.
//! - `parent_name` empty means the account is a hierarchy root.
//! - Flag strings are opaque except for `DELETED`, which marks tombstones.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Flag value marking an account as deleted on the remote side.
pub const DELETED_FLAG: &str = "DELETED";

static ACCOUNT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("valid account name regex"));

/// Validation errors for locally-enforceable account field rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    /// Account name is empty after trim.
    EmptyName,
    /// Account name contains characters outside the accepted charset.
    InvalidName(String),
    /// Account lists itself as its own parent.
    SelfParent(String),
}

impl Display for AccountValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "account name must not be blank"),
            Self::InvalidName(name) => write!(
                f,
                "account name `{name}` must match lowercase alphanumerics plus `._-`"
            ),
            Self::SelfParent(name) => {
                write!(f, "account `{name}` cannot be its own parent")
            }
        }
    }
}

impl Error for AccountValidationError {}

/// Canonical flat account record fetched from the accounting service.
///
/// One snapshot holds many of these; hierarchy structure is derived from
/// `parent_name` pointers, never stored as live references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Unique account key.
    pub name: String,
    /// Parent account name. Empty string means root.
    #[serde(rename = "parent")]
    pub parent_name: String,
    /// Free-form description maintained on the remote side.
    pub description: String,
    /// Owning organization label.
    pub organization: String,
    /// Remote-side flags. May include [`DELETED_FLAG`].
    pub flags: Vec<String>,
    /// Coordinator user names in remote-reported order.
    pub coordinators: Vec<String>,
}

impl AccountRecord {
    /// Creates a record with the given name and parent and empty metadata.
    pub fn new(name: impl Into<String>, parent_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_name: parent_name.into(),
            description: String::new(),
            organization: String::new(),
            flags: Vec::new(),
            coordinators: Vec::new(),
        }
    }

    /// Validates locally-enforceable field rules.
    ///
    /// # Invariants
    /// - `name` is non-blank and matches the accepted charset.
    /// - `parent_name` never equals `name`.
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }
        if !ACCOUNT_NAME_RE.is_match(self.name.as_str()) {
            return Err(AccountValidationError::InvalidName(self.name.clone()));
        }
        if self.parent_name == self.name {
            return Err(AccountValidationError::SelfParent(self.name.clone()));
        }
        Ok(())
    }

    /// Returns whether this account is a hierarchy root.
    pub fn is_root(&self) -> bool {
        self.parent_name.is_empty()
    }

    /// Returns whether the remote side flagged this account as deleted.
    pub fn is_deleted(&self) -> bool {
        self.has_flag(DELETED_FLAG)
    }

    /// Returns whether the record carries the given flag.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|value| value == flag)
    }
}
