//! Registry transition versions
//!
//! One registry-wide counter hands out every version, so versions are
//! totally ordered and keep rising for a name across drop and re-create.
//! A reader holding an older snapshot can tell it is stale by comparing
//! versions.

use serde::{Deserialize, Serialize};

/// Position of a transition in the registry's history
///
/// Published entries never carry version 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// Wrap a raw counter value
    pub const fn new(v: u64) -> Self {
        Version(v)
    }

    /// Raw counter value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Whether `self` was handed out after `other`
    pub fn is_newer_than(&self, other: Version) -> bool {
        self.0 > other.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}
