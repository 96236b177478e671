//! Known token prefixes.
//!
//! | prefix | kind                     | lifetime                   |
//! |--------|--------------------------|----------------------------|
//! | `ghp`  | personal access token    | user-configured            |
//! | `gho`  | OAuth access token       | none (unless unused a year)|
//! | `ghu`  | user-to-server token     | 8 hours, or indefinite     |
//! | `ghs`  | server-to-server token   | 1 hour                     |
//!
//! Refresh tokens (`ghr`) are longer than the 36-character payload format
//! and are deliberately absent.

use std::{collections::HashSet, sync::LazyLock};

use crate::error::ForgeError;

/// Valid prefixes, in a stable order for random selection.
pub const VALID_PREFIXES: [&str; 4] = ["ghp", "gho", "ghu", "ghs"];

/// Read-only membership table, built on first use.
static PREFIX_TABLE: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| VALID_PREFIXES.into_iter().collect());

/// Returns true if `prefix` is a known token prefix.
pub fn is_valid_prefix(prefix: &str) -> bool {
    PREFIX_TABLE.contains(prefix)
}

/// Accepts an empty prefix (meaning "random per token") or a known one.
pub fn require_valid_prefix(prefix: &str) -> Result<(), ForgeError> {
    if prefix.is_empty() || is_valid_prefix(prefix) {
        Ok(())
    } else {
        Err(ForgeError::InvalidPrefix { prefix: prefix.to_string() })
    }
}
