//! Registry operation counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated with relaxed atomics
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) created: AtomicU64,
    pub(crate) dropped: AtomicU64,
    pub(crate) allocation_failures: AtomicU64,
    pub(crate) deallocation_failures: AtomicU64,
    pub(crate) rejected: AtomicU64,
    pub(crate) in_flight: AtomicU64,
}

impl Counters {
    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of the registry counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RegistryMetrics {
    /// Collections that reached Ready through `create_collection`
    pub collections_created: u64,
    /// Collections removed through `drop_collection`
    pub collections_dropped: u64,
    /// Creates rolled back because allocation failed
    pub allocation_failures: u64,
    /// Drops whose deallocation failed
    pub deallocation_failures: u64,
    /// Mutations rejected with AlreadyExists or NotFound
    pub rejected: u64,
    /// Mutations currently holding a name lock
    pub in_flight: u64,
    /// Collections currently Ready
    pub ready: u64,
}

impl RegistryMetrics {
    pub(crate) fn from_counters(counters: &Counters, ready: u64) -> Self {
        RegistryMetrics {
            collections_created: counters.created.load(Ordering::Relaxed),
            collections_dropped: counters.dropped.load(Ordering::Relaxed),
            allocation_failures: counters.allocation_failures.load(Ordering::Relaxed),
            deallocation_failures: counters.deallocation_failures.load(Ordering::Relaxed),
            rejected: counters.rejected.load(Ordering::Relaxed),
            in_flight: counters.in_flight.load(Ordering::Relaxed),
            ready,
        }
    }

    /// Failed mutations of any kind
    pub fn total_failures(&self) -> u64 {
        self.allocation_failures + self.deallocation_failures + self.rejected
    }
}
