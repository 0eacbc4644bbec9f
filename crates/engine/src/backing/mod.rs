//! Backing store trait
//!
//! Defines the interface the registry uses to provision and release the
//! physical resources of a collection.
//! MemoryBackingStore (process memory)
//! DiskBackingStore (one directory per collection)

mod disk;
mod memory;

pub use disk::{DiskBackingStore, COLLECTIONS_DIR, COLLECTION_CONFIG_FILE};
pub use memory::MemoryBackingStore;

use crate::config::{RegistryConfig, StorageMode};
use std::path::Path;
use std::sync::Arc;
use vexdb_core::{BackingError, CollectionConfig, RegistryResult, Timestamp};

/// A collection found in a backing store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCollection {
    /// Collection name
    pub name: String,
    /// Configuration it was allocated with
    pub config: CollectionConfig,
    /// When its storage was allocated, if the store records it
    pub created_at: Option<Timestamp>,
}

impl StoredCollection {
    /// Stored collection without an allocation time
    pub fn new(name: impl Into<String>, config: CollectionConfig) -> Self {
        Self {
            name: name.into(),
            config,
            created_at: None,
        }
    }
}

/// Provisioning collaborator of the registry
///
/// The registry calls `allocate` and `deallocate` while holding only the
/// per-name mutation lock of the collection involved, so implementations
/// may be slow (disk I/O) without stalling unrelated names. Calls for the
/// same name never overlap.
pub trait BackingStore: Send + Sync {
    /// Reserve storage and index structures for a new collection
    fn allocate(&self, name: &str, config: &CollectionConfig) -> Result<(), BackingError>;

    /// Release everything `allocate` reserved for the collection
    fn deallocate(&self, name: &str) -> Result<(), BackingError>;

    /// List the collections this store already holds
    ///
    /// Called once when the registry opens. Stores that keep nothing
    /// across restarts return an empty list.
    fn load(&self) -> Result<Vec<StoredCollection>, BackingError> {
        Ok(Vec::new())
    }

    /// Whether storage is currently allocated for `name`
    fn contains(&self, name: &str) -> Result<bool, BackingError> {
        Ok(self.load()?.iter().any(|stored| stored.name == name))
    }

    /// Short name used in logs
    fn kind(&self) -> &'static str;
}

/// Build the backing store selected by `config`
///
/// Disk stores are rooted at `data_dir`.
pub fn backing_for(config: &RegistryConfig, data_dir: &Path) -> RegistryResult<Arc<dyn BackingStore>> {
    let store: Arc<dyn BackingStore> = match config.storage_mode()? {
        StorageMode::Memory => Arc::new(MemoryBackingStore::new()),
        StorageMode::Disk => Arc::new(DiskBackingStore::open(data_dir)?),
    };
    Ok(store)
}
