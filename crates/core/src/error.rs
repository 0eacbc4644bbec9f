//! Error types for the collection registry
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! - [`BackingError`]: failures reported by a backing store
//! - [`RegistryError`]: failures returned by registry operations; backing
//!   failures are wrapped as the source of `AllocationFailed` /
//!   `DeallocationFailed`

use crate::collection::CollectionState;
use std::io;
use thiserror::Error;

/// Result type alias for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Errors reported by a backing store
#[derive(Debug, Error)]
pub enum BackingError {
    /// I/O error (directory or file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored configuration could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage for the collection is already allocated
    #[error("Storage already allocated for '{name}'")]
    AlreadyAllocated {
        /// Collection name
        name: String,
    },

    /// No storage is allocated for the collection
    #[error("No storage allocated for '{name}'")]
    NotAllocated {
        /// Collection name
        name: String,
    },

    /// Any other collaborator failure
    #[error("{0}")]
    Other(String),
}

/// Errors returned by registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An entry for the name exists (creating, ready or dropping)
    #[error("Collection already exists: {name}")]
    AlreadyExists {
        /// Collection name
        name: String,
    },

    /// No ready entry for the name
    #[error("Collection not found: {name}")]
    NotFound {
        /// Collection name
        name: String,
    },

    /// Collection name is invalid
    #[error("Invalid collection name: {name} ({reason})")]
    InvalidName {
        /// The invalid name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// Creation configuration is invalid
    #[error("Invalid collection config: {reason}")]
    InvalidConfig {
        /// Reason why it's invalid
        reason: String,
    },

    /// Backing allocation failed; the entry was rolled back
    #[error("Failed to allocate storage for collection '{name}': {source}")]
    AllocationFailed {
        /// Collection name
        name: String,
        /// Backing store failure
        #[source]
        source: BackingError,
    },

    /// Backing deallocation failed; the entry was removed regardless
    #[error("Failed to release storage for collection '{name}': {source}")]
    DeallocationFailed {
        /// Collection name
        name: String,
        /// Backing store failure
        #[source]
        source: BackingError,
    },

    /// Another mutation on the same name held the lock past the timeout
    #[error("Collection '{name}' is busy: lock not acquired within {waited_ms}ms")]
    Busy {
        /// Collection name
        name: String,
        /// How long the caller waited
        waited_ms: u64,
    },

    /// A state transition was attempted out of order
    #[error("Collection '{name}' cannot move from {from} to {to}")]
    InvalidTransition {
        /// Collection name
        name: String,
        /// Current state
        from: CollectionState,
        /// Requested state
        to: CollectionState,
    },

    /// Backing store could not list its collections at start-up
    #[error("Failed to load collections from backing store: {0}")]
    Recovery(#[source] BackingError),

    /// The registry was shut down
    #[error("Registry is shut down")]
    Closed,

    /// Configuration file could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error outside of a backing store call
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RegistryError {
    /// Check if this error indicates the collection was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }

    /// Check if this error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            RegistryError::InvalidName { .. } | RegistryError::InvalidConfig { .. }
        )
    }

    /// Check if retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegistryError::Busy { .. })
    }
}
