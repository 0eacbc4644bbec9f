//! In-memory backing store

use super::BackingStore;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use vexdb_core::{BackingError, CollectionConfig};

/// Backing store that keeps allocations in process memory
///
/// Nothing survives a restart; `load` always returns an empty list.
#[derive(Debug, Default)]
pub struct MemoryBackingStore {
    allocated: DashMap<String, CollectionConfig>,
}

impl MemoryBackingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether storage is currently allocated for `name`
    pub fn is_allocated(&self, name: &str) -> bool {
        self.allocated.contains_key(name)
    }

    /// Number of allocated collections
    pub fn allocated_count(&self) -> usize {
        self.allocated.len()
    }
}

impl BackingStore for MemoryBackingStore {
    fn allocate(&self, name: &str, config: &CollectionConfig) -> Result<(), BackingError> {
        match self.allocated.entry(name.to_string()) {
            Entry::Occupied(_) => Err(BackingError::AlreadyAllocated {
                name: name.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(config.clone());
                Ok(())
            }
        }
    }

    fn deallocate(&self, name: &str) -> Result<(), BackingError> {
        self.allocated
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| BackingError::NotAllocated {
                name: name.to_string(),
            })
    }

    fn contains(&self, name: &str) -> Result<bool, BackingError> {
        Ok(self.is_allocated(name))
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
