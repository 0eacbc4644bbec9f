//! Collection registry engine for VexDB
//!
//! This crate owns the authoritative record of which collections exist:
//! - CollectionRegistry: lifecycle state per name, existence queries
//! - BackingStore: provisioning collaborator (memory, disk)
//! - RegistryConfig: `vexdb.toml` configuration
//!
//! The registry is an explicit value with an open/shutdown lifecycle. Hand
//! an `Arc<CollectionRegistry>` to whatever serves requests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backing;
pub mod config;
mod lock_table;
pub mod metrics;
pub mod registry;

pub use backing::{
    backing_for, BackingStore, DiskBackingStore, MemoryBackingStore, StoredCollection,
};
pub use config::{LogConfig, RegistryConfig, StorageMode, CONFIG_FILE_NAME};
pub use metrics::RegistryMetrics;
pub use registry::CollectionRegistry;
