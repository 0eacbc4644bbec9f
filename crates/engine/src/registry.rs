//! CollectionRegistry: authoritative collection lifecycle tracker
//!
//! ## Design
//!
//! The registry maps each collection name to a published `CollectionEntry`
//! snapshot. Two structures cooperate:
//!
//! - `entries`: sharded map of published snapshots. Readers take a shard
//!   read lock only for the length of one lookup, and writers replace whole
//!   entries, so a reader observes either the pre- or the post-transition
//!   snapshot of a name, never a mix.
//! - `locks`: per-name mutation locks. A create or drop holds the lock of
//!   its name for the whole operation, including the backing store call.
//!   No lock covering other names is held during that call.
//!
//! ## Lifecycle
//!
//! ```text
//! create: insert Creating -> allocate -> publish Ready
//!                                  \-> failure: remove entry
//! drop:   publish Dropping -> deallocate -> remove entry
//! ```
//!
//! Transitional entries are owned by a guard that removes them if the
//! operation unwinds, so no Creating or Dropping entry outlives the call
//! that published it.
//!
//! ## Thread Safety
//!
//! `CollectionRegistry` is `Send + Sync`; share it as `Arc<CollectionRegistry>`.

use crate::backing::{backing_for, BackingStore, StoredCollection};
use crate::config::{RegistryConfig, CONFIG_FILE_NAME};
use crate::lock_table::{LockTable, NameGuard};
use crate::metrics::{Counters, RegistryMetrics};
use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};
use vexdb_core::{
    validate_collection_name, CollectionConfig, CollectionEntry, CollectionState, RegistryError,
    RegistryResult, Timestamp, Version, Versioned,
};

/// Removes a transitional entry unless disarmed
struct PendingEntry<'a> {
    entries: &'a DashMap<String, CollectionEntry>,
    name: &'a str,
    version: Version,
    armed: bool,
}

impl<'a> PendingEntry<'a> {
    fn new(entries: &'a DashMap<String, CollectionEntry>, name: &'a str, version: Version) -> Self {
        Self {
            entries,
            name,
            version,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        if self.armed {
            let version = self.version;
            self.entries
                .remove_if(self.name, |_, entry| entry.version == version);
        }
    }
}

/// An in-flight create or drop: the name lock plus the in-flight count
struct Mutation<'a> {
    _name: NameGuard<'a>,
    counters: &'a Counters,
}

impl Drop for Mutation<'_> {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Collection lifecycle registry
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use vexdb_core::{CollectionConfig, Distance};
/// use vexdb_engine::{CollectionRegistry, MemoryBackingStore};
///
/// let registry = CollectionRegistry::new(Arc::new(MemoryBackingStore::new()));
/// registry
///     .create_collection("collection_name", CollectionConfig::new(4, Distance::Dot))
///     .unwrap();
///
/// assert!(registry.collection_exists("collection_name"));
/// assert!(!registry.collection_exists("wrong"));
///
/// registry.drop_collection("collection_name").unwrap();
/// assert!(!registry.collection_exists("collection_name"));
/// ```
pub struct CollectionRegistry {
    entries: DashMap<String, CollectionEntry>,
    locks: LockTable,
    backing: Arc<dyn BackingStore>,
    /// Last version handed out
    version: AtomicU64,
    closed: AtomicBool,
    lock_timeout: Option<Duration>,
    counters: Counters,
}

impl CollectionRegistry {
    /// Create an empty registry over `backing`
    ///
    /// Does not load existing collections; call [`recover`](Self::recover)
    /// or use [`open`](Self::open) for that.
    pub fn new(backing: Arc<dyn BackingStore>) -> Self {
        Self::with_config(backing, &RegistryConfig::default())
    }

    /// Create an empty registry over `backing` with settings from `config`
    ///
    /// The storage mode of `config` is ignored; `backing` is used as given.
    pub fn with_config(backing: Arc<dyn BackingStore>, config: &RegistryConfig) -> Self {
        Self {
            entries: DashMap::new(),
            locks: LockTable::new(),
            backing,
            version: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            lock_timeout: config.lock_timeout(),
            counters: Counters::default(),
        }
    }

    /// Open the registry stored in `data_dir`
    ///
    /// Writes a default `vexdb.toml` on first open, builds the configured
    /// backing store and registers every collection it already holds.
    pub fn open(data_dir: impl AsRef<Path>) -> RegistryResult<Arc<Self>> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        RegistryConfig::write_default_if_missing(&config_path)?;
        let config = RegistryConfig::from_file(&config_path)?;

        Self::open_with_config(data_dir, &config)
    }

    /// Open the registry in `data_dir` with an explicit config
    pub fn open_with_config(data_dir: &Path, config: &RegistryConfig) -> RegistryResult<Arc<Self>> {
        let backing = backing_for(config, data_dir)?;
        let registry = Self::with_config(backing, config);
        registry.recover()?;

        info!(target: "vexdb::registry", path = %data_dir.display(), storage = %config.storage, collections = registry.len(), "Registry opened");

        Ok(Arc::new(registry))
    }

    /// Register every collection the backing store already holds as Ready
    ///
    /// Each name is registered under its mutation lock and only if the
    /// backing store still holds it, so a drop that completes after the
    /// store was listed stays dropped. Names already present in the
    /// registry are left untouched. Returns the number of collections
    /// registered.
    pub fn recover(&self) -> RegistryResult<usize> {
        self.ensure_open()?;
        let loaded = self.backing.load().map_err(RegistryError::Recovery)?;
        let now = Timestamp::now();
        let mut recovered = 0;

        for StoredCollection {
            name,
            config,
            created_at,
        } in loaded
        {
            if let Err(e) = validate_collection_name(&name).and_then(|_| config.validate()) {
                warn!(target: "vexdb::registry", collection = %name, error = %e, "Skipping invalid collection during recovery");
                continue;
            }

            let _mutation = self.begin_mutation(&name)?;
            if self.entries.contains_key(&name) {
                continue;
            }
            if !self
                .backing
                .contains(&name)
                .map_err(RegistryError::Recovery)?
            {
                debug!(target: "vexdb::registry", collection = %name, "Collection released before recovery reached it");
                continue;
            }

            let entry = CollectionEntry::recovered(
                name.clone(),
                config,
                self.allocate_version(),
                created_at.unwrap_or(now),
            );
            self.entries.insert(name, entry);
            recovered += 1;
        }

        debug!(target: "vexdb::registry", recovered, backing = self.backing.kind(), "Recovery complete");
        Ok(recovered)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a collection
    ///
    /// Publishes a Creating entry, allocates backing storage and publishes
    /// Ready. Concurrent `collection_exists` calls return `false` until the
    /// Ready entry is published.
    ///
    /// # Errors
    /// - `InvalidName` / `InvalidConfig` on bad input
    /// - `AlreadyExists` if an entry for the name exists in any state
    /// - `AllocationFailed` if the backing store refused; the entry is removed
    /// - `Busy` if the name lock was not acquired within the configured timeout
    /// - `Closed` after shutdown
    pub fn create_collection(
        &self,
        name: &str,
        config: CollectionConfig,
    ) -> RegistryResult<Versioned<CollectionEntry>> {
        validate_collection_name(name)?;
        config.validate()?;
        self.ensure_open()?;

        // Rejects Creating and Dropping entries without waiting on their lock.
        if self.entries.contains_key(name) {
            return Err(self.reject_exists(name));
        }

        let _mutation = self.begin_mutation(name)?;
        if self.entries.contains_key(name) {
            return Err(self.reject_exists(name));
        }

        let creating =
            CollectionEntry::creating(name, config, self.allocate_version(), Timestamp::now());
        self.entries.insert(name.to_string(), creating.clone());
        let pending = PendingEntry::new(&self.entries, name, creating.version);

        debug!(target: "vexdb::registry", collection = name, version = %creating.version, "Collection creating");

        if let Err(source) = self.backing.allocate(name, &creating.config) {
            drop(pending);
            Counters::bump(&self.counters.allocation_failures);
            warn!(target: "vexdb::registry", collection = name, backing = self.backing.kind(), error = %source, "Allocation failed, creation rolled back");
            return Err(RegistryError::AllocationFailed {
                name: name.to_string(),
                source,
            });
        }

        let ready = self.advance(&creating, CollectionState::Ready)?;
        self.entries.insert(name.to_string(), ready.clone());
        pending.disarm();
        Counters::bump(&self.counters.created);

        info!(target: "vexdb::registry", collection = name, version = %ready.version, dimension = ready.config.vectors.size, backing = self.backing.kind(), "Collection created");

        let (version, timestamp) = (ready.version, ready.last_modified_at);
        Ok(Versioned::with_timestamp(ready, version, timestamp))
    }

    /// Drop a collection
    ///
    /// Publishes a Dropping entry, releases backing storage and removes the
    /// entry. If a create of the same name is in flight, waits for it and
    /// drops the result.
    ///
    /// # Errors
    /// - `InvalidName` on a malformed name
    /// - `NotFound` if there is no entry or it is already Dropping
    /// - `DeallocationFailed` if the backing store failed; the entry is
    ///   removed regardless and the storage may be leaked
    /// - `Busy` if the name lock was not acquired within the configured timeout
    /// - `Closed` after shutdown
    pub fn drop_collection(&self, name: &str) -> RegistryResult<()> {
        validate_collection_name(name)?;
        self.ensure_open()?;

        if matches!(
            self.collection_state(name),
            None | Some(CollectionState::Dropping)
        ) {
            return Err(self.reject_missing(name));
        }

        let _mutation = self.begin_mutation(name)?;
        let current = self.entries.get(name).map(|entry| entry.value().clone());
        let current = match current {
            Some(entry) if entry.is_ready() => entry,
            _ => return Err(self.reject_missing(name)),
        };

        let dropping = self.advance(&current, CollectionState::Dropping)?;
        self.entries.insert(name.to_string(), dropping.clone());
        let pending = PendingEntry::new(&self.entries, name, dropping.version);

        debug!(target: "vexdb::registry", collection = name, version = %dropping.version, "Collection dropping");

        let released = self.backing.deallocate(name);
        drop(pending);

        match released {
            Ok(()) => {
                Counters::bump(&self.counters.dropped);
                info!(target: "vexdb::registry", collection = name, backing = self.backing.kind(), "Collection dropped");
                Ok(())
            }
            Err(source) => {
                Counters::bump(&self.counters.deallocation_failures);
                error!(target: "vexdb::registry", collection = name, backing = self.backing.kind(), error = %source, "Deallocation failed, collection removed and storage may be leaked");
                Err(RegistryError::DeallocationFailed {
                    name: name.to_string(),
                    source,
                })
            }
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Check whether a collection exists and is usable
    ///
    /// True iff the name has a Ready entry. Creating and Dropping entries,
    /// unknown names and malformed names all return `false`. Never waits for
    /// in-flight mutations.
    pub fn collection_exists(&self, name: &str) -> bool {
        let exists = self
            .entries
            .get(name)
            .map_or(false, |entry| entry.is_ready());
        trace!(target: "vexdb::registry", collection = name, exists, "Existence check");
        exists
    }

    /// Names of all Ready collections, sorted
    ///
    /// Each shard is read atomically; the result may be stale as soon as it
    /// is returned.
    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.is_ready())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Snapshot of the entry for `name` in any state
    pub fn get_collection(&self, name: &str) -> Option<Versioned<CollectionEntry>> {
        self.entries.get(name).map(|entry| {
            let entry = entry.value().clone();
            let (version, timestamp) = (entry.version, entry.last_modified_at);
            Versioned::with_timestamp(entry, version, timestamp)
        })
    }

    /// Current state of `name`, `None` if absent
    pub fn collection_state(&self, name: &str) -> Option<CollectionState> {
        self.entries.get(name).map(|entry| entry.state)
    }

    /// Number of Ready collections
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_ready()).count()
    }

    /// Whether no collection is Ready
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counter snapshot
    pub fn metrics(&self) -> RegistryMetrics {
        RegistryMetrics::from_counters(&self.counters, self.len() as u64)
    }

    /// Short name of the backing store
    pub fn backing_kind(&self) -> &'static str {
        self.backing.kind()
    }

    /// Last version handed out
    pub fn current_version(&self) -> Version {
        Version::new(self.version.load(Ordering::SeqCst))
    }

    // ========================================================================
    // Shutdown
    // ========================================================================

    /// Stop accepting mutations and wait for in-flight ones
    ///
    /// Reads keep working after shutdown. Returns `false` if mutations were
    /// still running when `timeout` expired.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.closed.store(true, Ordering::SeqCst);
        let idle = self.wait_for_idle(timeout);
        if idle {
            info!(target: "vexdb::registry", collections = self.len(), "Registry shut down");
        } else {
            warn!(target: "vexdb::registry", in_flight = self.counters.in_flight.load(Ordering::SeqCst), locked_names = self.locks.active(), "Registry shut down with mutations still in flight");
        }
        idle
    }

    /// Whether `shutdown` was called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn wait_for_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        let sleep_duration = Duration::from_millis(1);

        while self.counters.in_flight.load(Ordering::SeqCst) > 0 {
            if start.elapsed() > timeout {
                return false;
            }
            std::thread::sleep(sleep_duration);
        }
        true
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn allocate_version(&self) -> Version {
        Version::new(self.version.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn ensure_open(&self) -> RegistryResult<()> {
        if self.is_closed() {
            return Err(RegistryError::Closed);
        }
        Ok(())
    }

    fn begin_mutation(&self, name: &str) -> RegistryResult<Mutation<'_>> {
        let guard = match self.lock_timeout {
            None => self.locks.lock(name),
            Some(timeout) => self.locks.try_lock_for(name, timeout).ok_or_else(|| {
                warn!(target: "vexdb::registry", collection = name, timeout_ms = timeout.as_millis() as u64, "Timed out waiting for collection lock");
                RegistryError::Busy {
                    name: name.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                }
            })?,
        };

        self.counters.in_flight.fetch_add(1, Ordering::SeqCst);
        let mutation = Mutation {
            _name: guard,
            counters: &self.counters,
        };

        // Shutdown may have started while waiting for the lock.
        self.ensure_open()?;
        Ok(mutation)
    }

    fn advance(
        &self,
        current: &CollectionEntry,
        next: CollectionState,
    ) -> RegistryResult<CollectionEntry> {
        current
            .transition(next, self.allocate_version(), Timestamp::now())
            .ok_or_else(|| RegistryError::InvalidTransition {
                name: current.name.clone(),
                from: current.state,
                to: next,
            })
    }

    fn reject_exists(&self, name: &str) -> RegistryError {
        Counters::bump(&self.counters.rejected);
        RegistryError::AlreadyExists {
            name: name.to_string(),
        }
    }

    fn reject_missing(&self, name: &str) -> RegistryError {
        Counters::bump(&self.counters.rejected);
        RegistryError::NotFound {
            name: name.to_string(),
        }
    }
}
