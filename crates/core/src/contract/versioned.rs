//! Snapshots returned by registry reads

use super::{Timestamp, Version};
use serde::{Deserialize, Serialize};

/// A published value with the version and time of the transition that
/// published it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// The snapshot
    pub value: T,
    /// Version of the publishing transition
    pub version: Version,
    /// Time of the publishing transition
    pub timestamp: Timestamp,
}

impl<T> Versioned<T> {
    /// Wrap `value` published at `version` and `timestamp`
    pub fn with_timestamp(value: T, version: Version, timestamp: Timestamp) -> Self {
        Versioned {
            value,
            version,
            timestamp,
        }
    }

    /// The snapshot without its version
    pub fn into_value(self) -> T {
        self.value
    }
}
