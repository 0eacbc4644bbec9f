//! Core types for the VexDB collection registry
//!
//! This crate defines the foundational types used throughout the system:
//! - Contract types: Version, Timestamp, Versioned<T>
//! - Collection types: CollectionState, CollectionConfig, CollectionEntry
//! - Name validation for collections
//! - Error: Error type hierarchy (RegistryError, BackingError)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod contract;
pub mod error;

pub use collection::{
    validate_collection_name, CollectionConfig, CollectionEntry, CollectionState, Distance,
    VectorParams, MAX_COLLECTION_NAME_LENGTH, MAX_VECTOR_SIZE,
};
pub use contract::{Timestamp, Version, Versioned};
pub use error::{BackingError, RegistryError, RegistryResult};
