//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
pub use vexdb::{
    BackingError, BackingStore, CollectionConfig, CollectionRegistry, CollectionState,
    CollectionsApi, Distance, MemoryBackingStore, RegistryConfig, RegistryError,
};
use tempfile::TempDir;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Collection name unique within the test binary
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// 4-dimensional dot-product collection
pub fn config_small() -> CollectionConfig {
    CollectionConfig::new(4, Distance::Dot)
}

/// 384-dimensional cosine collection
pub fn config_standard() -> CollectionConfig {
    CollectionConfig::new(384, Distance::Cosine)
}

// ============================================================================
// Registries
// ============================================================================

/// Registry over a fresh in-memory backing store
pub fn memory_registry() -> (Arc<MemoryBackingStore>, Arc<CollectionRegistry>) {
    let backing = Arc::new(MemoryBackingStore::new());
    let registry = Arc::new(CollectionRegistry::new(backing.clone()));
    (backing, registry)
}

/// Registry over an arbitrary backing store
pub fn registry_over(backing: Arc<dyn BackingStore>) -> Arc<CollectionRegistry> {
    Arc::new(CollectionRegistry::new(backing))
}

/// On-disk registry in a temporary directory
pub struct TestRegistry {
    pub registry: Arc<CollectionRegistry>,
    pub dir: TempDir,
}

impl TestRegistry {
    /// Open a disk registry in a fresh temp dir
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let registry = CollectionRegistry::open(dir.path()).expect("Failed to open registry");
        TestRegistry { registry, dir }
    }

    /// Close and reopen from the same directory
    pub fn reopen(&mut self) {
        assert!(self.registry.shutdown(Duration::from_secs(5)));
        self.registry = CollectionRegistry::open(self.dir.path()).expect("Failed to reopen registry");
    }
}

// ============================================================================
// Backing stores
// ============================================================================

/// Backing store that fails on demand
#[derive(Default)]
pub struct FailingBacking {
    pub inner: MemoryBackingStore,
    pub fail_allocate: AtomicBool,
    pub fail_deallocate: AtomicBool,
}

impl FailingBacking {
    pub fn set_fail_allocate(&self, fail: bool) {
        self.fail_allocate.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deallocate(&self, fail: bool) {
        self.fail_deallocate.store(fail, Ordering::SeqCst);
    }
}

impl BackingStore for FailingBacking {
    fn allocate(&self, name: &str, config: &CollectionConfig) -> Result<(), BackingError> {
        if self.fail_allocate.load(Ordering::SeqCst) {
            return Err(BackingError::Other("no space left on device".to_string()));
        }
        self.inner.allocate(name, config)
    }

    fn deallocate(&self, name: &str) -> Result<(), BackingError> {
        if self.fail_deallocate.load(Ordering::SeqCst) {
            return Err(BackingError::Other("device busy".to_string()));
        }
        self.inner.deallocate(name)
    }

    fn kind(&self) -> &'static str {
        "failing"
    }
}

/// Backing call a [`GatedBacking`] parks in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedCall {
    Allocate,
    Deallocate,
}

/// Backing store that parks one call for one chosen name until released
///
/// Other names and calls pass straight through to the inner memory store.
/// With `set_fail(true)` the parked call fails once released.
pub struct GatedBacking {
    pub inner: MemoryBackingStore,
    gated: String,
    call: GatedCall,
    fail: AtomicBool,
    entered: Mutex<Option<Sender<()>>>,
    release: Mutex<Option<Receiver<()>>>,
}

/// Handles to drive a [`GatedBacking`]
pub struct Gate {
    pub entered: Receiver<()>,
    pub release: Sender<()>,
}

impl GatedBacking {
    /// Park `allocate` of `gated`
    pub fn new(gated: &str) -> (Arc<Self>, Gate) {
        Self::gating(gated, GatedCall::Allocate)
    }

    /// Park `deallocate` of `gated`
    pub fn on_deallocate(gated: &str) -> (Arc<Self>, Gate) {
        Self::gating(gated, GatedCall::Deallocate)
    }

    fn gating(gated: &str, call: GatedCall) -> (Arc<Self>, Gate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let backing = Arc::new(GatedBacking {
            inner: MemoryBackingStore::new(),
            gated: gated.to_string(),
            call,
            fail: AtomicBool::new(false),
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
        });
        (
            backing,
            Gate {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Park if this is the gated call; report whether it should fail
    fn pass(&self, name: &str, call: GatedCall) -> bool {
        if name != self.gated || call != self.call {
            return false;
        }
        let entered = self.entered.lock().take();
        if let Some(tx) = entered {
            let _ = tx.send(());
        }
        let release = self.release.lock().take();
        if let Some(rx) = release {
            let _ = rx.recv();
        }
        self.fail.load(Ordering::SeqCst)
    }
}

impl BackingStore for GatedBacking {
    fn allocate(&self, name: &str, config: &CollectionConfig) -> Result<(), BackingError> {
        if self.pass(name, GatedCall::Allocate) {
            return Err(BackingError::Other("allocation refused".to_string()));
        }
        self.inner.allocate(name, config)
    }

    fn deallocate(&self, name: &str) -> Result<(), BackingError> {
        if self.pass(name, GatedCall::Deallocate) {
            return Err(BackingError::Other("deallocation refused".to_string()));
        }
        self.inner.deallocate(name)
    }

    fn contains(&self, name: &str) -> Result<bool, BackingError> {
        self.inner.contains(name)
    }

    fn kind(&self) -> &'static str {
        "gated"
    }
}

/// Backing store whose every call sleeps first
pub struct SlowBacking {
    pub inner: MemoryBackingStore,
    pub delay: Duration,
}

impl SlowBacking {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryBackingStore::new(),
            delay,
        }
    }
}

impl BackingStore for SlowBacking {
    fn allocate(&self, name: &str, config: &CollectionConfig) -> Result<(), BackingError> {
        std::thread::sleep(self.delay);
        self.inner.allocate(name, config)
    }

    fn deallocate(&self, name: &str) -> Result<(), BackingError> {
        std::thread::sleep(self.delay);
        self.inner.deallocate(name)
    }

    fn kind(&self) -> &'static str {
        "slow"
    }
}
