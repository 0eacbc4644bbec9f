//! Collection types and validation
//!
//! This module provides:
//! - `CollectionState`: lifecycle state of a registered collection
//! - `CollectionConfig`: creation parameters (vectors, sharding, payload storage)
//! - `CollectionEntry`: the published registry record for one name
//! - Collection name validation
//!
//! ## Lifecycle
//!
//! ```text
//! (absent) --create--> Creating --allocated--> Ready --drop--> Dropping --released--> (absent)
//!                         |
//!                         +--allocation failed--> (absent)
//! ```
//!
//! "Absent" is never stored: a name without an entry does not exist.

use crate::contract::{Timestamp, Version};
use crate::error::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};

/// Maximum collection name length in bytes
///
/// Names double as directory names for on-disk collections.
pub const MAX_COLLECTION_NAME_LENGTH: usize = 255;

/// Maximum vector dimension accepted at creation
pub const MAX_VECTOR_SIZE: usize = 65536;

// =============================================================================
// Name validation
// =============================================================================

/// Validate a collection name
///
/// # Validation Rules
/// - Cannot be empty
/// - Cannot exceed 255 bytes
/// - Cannot contain '/', '\\' or null bytes
/// - Cannot be "." or ".."
/// - Cannot start or end with whitespace
pub fn validate_collection_name(name: &str) -> RegistryResult<()> {
    let invalid = |reason: &str| {
        Err(RegistryError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return invalid("Collection name cannot be empty");
    }

    if name.len() > MAX_COLLECTION_NAME_LENGTH {
        return invalid("Collection name cannot exceed 255 bytes");
    }

    if name.contains('/') || name.contains('\\') {
        return invalid("Collection name cannot contain path separators");
    }

    if name.contains('\0') {
        return invalid("Collection name cannot contain null bytes");
    }

    if name == "." || name == ".." {
        return invalid("Collection name cannot be a relative path component");
    }

    if name.trim() != name {
        return invalid("Collection name cannot start or end with whitespace");
    }

    Ok(())
}

// =============================================================================
// State
// =============================================================================

/// Lifecycle state of a registered collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionState {
    /// Accepted, backing storage is being allocated
    Creating,
    /// Allocated and usable
    Ready,
    /// Drop accepted, backing storage is being released
    Dropping,
}

impl CollectionState {
    /// Whether `self -> next` is an allowed in-place transition
    ///
    /// Insertion (absent -> Creating) and removal (Dropping -> absent,
    /// Creating -> absent on rollback) are not in-place transitions.
    pub const fn can_transition_to(self, next: CollectionState) -> bool {
        matches!(
            (self, next),
            (CollectionState::Creating, CollectionState::Ready)
                | (CollectionState::Ready, CollectionState::Dropping)
        )
    }

    /// Name used in logs and API payloads
    pub const fn as_str(self) -> &'static str {
        match self {
            CollectionState::Creating => "creating",
            CollectionState::Ready => "ready",
            CollectionState::Dropping => "dropping",
        }
    }
}

impl std::fmt::Display for CollectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Config
// =============================================================================

/// Similarity metric for the collection's vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distance {
    /// Cosine similarity
    Cosine,
    /// Euclidean distance
    Euclid,
    /// Dot product
    Dot,
    /// Manhattan distance
    Manhattan,
}

/// Vector parameters of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorParams {
    /// Dimension of every vector in the collection
    pub size: usize,
    /// Similarity metric
    pub distance: Distance,
    /// Keep vectors on disk instead of in RAM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_disk: Option<bool>,
}

fn default_shard_number() -> u32 {
    1
}

fn default_replication_factor() -> u32 {
    1
}

/// Creation configuration of a collection
///
/// Immutable after creation. JSON layout matches the body of
/// `PUT /collections/{name}`:
///
/// ```json
/// { "vectors": { "size": 4, "distance": "Dot" }, "shard_number": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Vector parameters
    pub vectors: VectorParams,
    /// Number of shards the collection is split into
    #[serde(default = "default_shard_number")]
    pub shard_number: u32,
    /// Number of copies of each shard
    #[serde(default = "default_replication_factor")]
    pub replication_factor: u32,
    /// Keep payloads on disk
    #[serde(default)]
    pub on_disk_payload: bool,
}

impl CollectionConfig {
    /// Config with the given dimension and metric, defaults elsewhere
    pub fn new(size: usize, distance: Distance) -> Self {
        CollectionConfig {
            vectors: VectorParams {
                size,
                distance,
                on_disk: None,
            },
            shard_number: default_shard_number(),
            replication_factor: default_replication_factor(),
            on_disk_payload: false,
        }
    }

    /// Set the shard count
    pub fn with_shard_number(mut self, shard_number: u32) -> Self {
        self.shard_number = shard_number;
        self
    }

    /// Set the replication factor
    pub fn with_replication_factor(mut self, replication_factor: u32) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// - `InvalidConfig` if the vector size is 0 or above `MAX_VECTOR_SIZE`
    /// - `InvalidConfig` if shard number or replication factor is 0
    pub fn validate(&self) -> RegistryResult<()> {
        if self.vectors.size == 0 || self.vectors.size > MAX_VECTOR_SIZE {
            return Err(RegistryError::InvalidConfig {
                reason: format!(
                    "vector size {} out of range 1..={}",
                    self.vectors.size, MAX_VECTOR_SIZE
                ),
            });
        }
        if self.shard_number == 0 {
            return Err(RegistryError::InvalidConfig {
                reason: "shard_number must be at least 1".to_string(),
            });
        }
        if self.replication_factor == 0 {
            return Err(RegistryError::InvalidConfig {
                reason: "replication_factor must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Entry
// =============================================================================

/// Published registry record for one collection name
///
/// Entries are immutable snapshots: a transition publishes a new entry with
/// a newer version instead of editing the old one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    /// Collection name, key of the registry mapping
    pub name: String,
    /// Lifecycle state
    pub state: CollectionState,
    /// Version of the transition that published this entry
    pub version: Version,
    /// Creation configuration
    pub config: CollectionConfig,
    /// When the create request was accepted
    pub created_at: Timestamp,
    /// When the last transition happened
    pub last_modified_at: Timestamp,
}

impl CollectionEntry {
    /// Entry for a freshly accepted create request
    pub fn creating(
        name: impl Into<String>,
        config: CollectionConfig,
        version: Version,
        now: Timestamp,
    ) -> Self {
        CollectionEntry {
            name: name.into(),
            state: CollectionState::Creating,
            version,
            config,
            created_at: now,
            last_modified_at: now,
        }
    }

    /// Entry for a collection found in the backing store at start-up
    pub fn recovered(
        name: impl Into<String>,
        config: CollectionConfig,
        version: Version,
        now: Timestamp,
    ) -> Self {
        CollectionEntry {
            state: CollectionState::Ready,
            ..CollectionEntry::creating(name, config, version, now)
        }
    }

    /// Publish the next state of this entry
    ///
    /// Returns `None` if the transition is not allowed or `version` is not
    /// newer than the current one.
    pub fn transition(
        &self,
        next: CollectionState,
        version: Version,
        now: Timestamp,
    ) -> Option<CollectionEntry> {
        if !self.state.can_transition_to(next) || !version.is_newer_than(self.version) {
            return None;
        }
        Some(CollectionEntry {
            state: next,
            version,
            last_modified_at: now,
            ..self.clone()
        })
    }

    /// Whether the collection is usable
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == CollectionState::Ready
    }
}
