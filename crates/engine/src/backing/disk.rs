//! On-disk backing store
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/
//!   collections/
//!     <name>/
//!       config.json
//! ```
//!
//! `config.json` holds the collection config plus the time its storage was
//! allocated, which is reported as `created_at` after a restart.
//!
//! A collection is allocated once its `config.json` is in place. The file is
//! written to a temporary name and renamed, so a crash mid-allocation leaves
//! a directory without a config, which `load` skips and the next `allocate`
//! for that name clears.

use super::{BackingStore, StoredCollection};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vexdb_core::{BackingError, CollectionConfig, RegistryResult, Timestamp};

/// Directory under the data directory holding one subdirectory per collection
pub const COLLECTIONS_DIR: &str = "collections";

/// Per-collection config file name
pub const COLLECTION_CONFIG_FILE: &str = "config.json";

const TMP_SUFFIX: &str = ".tmp";

/// Contents of `config.json`
#[derive(Debug, Serialize, Deserialize)]
struct CollectionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<Timestamp>,
    #[serde(flatten)]
    config: CollectionConfig,
}

/// Backing store with one directory per collection
#[derive(Debug, Clone)]
pub struct DiskBackingStore {
    collections_dir: PathBuf,
}

impl DiskBackingStore {
    /// Open (and create if needed) the collections directory under `data_dir`
    pub fn open(data_dir: &Path) -> RegistryResult<Self> {
        let collections_dir = data_dir.join(COLLECTIONS_DIR);
        fs::create_dir_all(&collections_dir)?;
        Ok(Self { collections_dir })
    }

    /// Directory of a collection
    pub fn collection_path(&self, name: &str) -> PathBuf {
        self.collections_dir.join(name)
    }

    fn config_path(&self, name: &str) -> PathBuf {
        self.collection_path(name).join(COLLECTION_CONFIG_FILE)
    }

    fn write_config(dir: &Path, file: &CollectionFile) -> Result<(), BackingError> {
        let bytes = serde_json::to_vec_pretty(file)
            .map_err(|e| BackingError::Serialization(e.to_string()))?;
        let tmp = dir.join(format!("{}{}", COLLECTION_CONFIG_FILE, TMP_SUFFIX));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, dir.join(COLLECTION_CONFIG_FILE))?;
        Ok(())
    }

    fn read_config(path: &Path) -> Result<CollectionFile, BackingError> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| BackingError::Serialization(e.to_string()))
    }
}

impl BackingStore for DiskBackingStore {
    fn allocate(&self, name: &str, config: &CollectionConfig) -> Result<(), BackingError> {
        let dir = self.collection_path(name);

        if self.config_path(name).exists() {
            return Err(BackingError::AlreadyAllocated {
                name: name.to_string(),
            });
        }
        if dir.exists() {
            debug!(target: "vexdb::backing", collection = name, path = %dir.display(), "Clearing interrupted allocation");
            fs::remove_dir_all(&dir)?;
        }

        fs::create_dir_all(&dir)?;
        let file = CollectionFile {
            created_at: Some(Timestamp::now()),
            config: config.clone(),
        };
        if let Err(e) = Self::write_config(&dir, &file) {
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                warn!(target: "vexdb::backing", collection = name, error = %cleanup, "Failed to clean up after allocation error");
            }
            return Err(e);
        }

        debug!(target: "vexdb::backing", collection = name, path = %dir.display(), "Collection directory allocated");
        Ok(())
    }

    fn deallocate(&self, name: &str) -> Result<(), BackingError> {
        let dir = self.collection_path(name);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                debug!(target: "vexdb::backing", collection = name, path = %dir.display(), "Collection directory removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(BackingError::NotAllocated {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self) -> Result<Vec<StoredCollection>, BackingError> {
        let mut collections = Vec::new();

        for dir_entry in fs::read_dir(&self.collections_dir)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_dir() {
                continue;
            }

            let file_name = dir_entry.file_name();
            let Some(name) = file_name.to_str() else {
                warn!(target: "vexdb::backing", path = %dir_entry.path().display(), "Skipping collection directory with non UTF-8 name");
                continue;
            };

            let config_path = dir_entry.path().join(COLLECTION_CONFIG_FILE);
            if !config_path.exists() {
                warn!(target: "vexdb::backing", collection = name, "Skipping collection directory without config");
                continue;
            }

            match Self::read_config(&config_path) {
                Ok(file) => collections.push(StoredCollection {
                    name: name.to_string(),
                    config: file.config,
                    created_at: file.created_at,
                }),
                Err(e) => {
                    warn!(target: "vexdb::backing", collection = name, error = %e, "Skipping collection with unreadable config");
                }
            }
        }

        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    fn contains(&self, name: &str) -> Result<bool, BackingError> {
        Ok(self.config_path(name).exists())
    }

    fn kind(&self) -> &'static str {
        "disk"
    }
}
