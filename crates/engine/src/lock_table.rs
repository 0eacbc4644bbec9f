//! Per-name mutation locks
//!
//! Create and drop of the same collection name are mutually exclusive;
//! mutations of different names never contend. Each name that currently has
//! a holder or a waiter owns one slot in a sharded map. A slot is removed
//! when its last user releases it, so the table only grows with the number
//! of names being mutated concurrently.

use dashmap::DashMap;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::sync::Arc;
use std::time::Duration;

type Slot = Arc<Mutex<()>>;

/// Sharded table of per-name mutexes
#[derive(Debug, Default)]
pub(crate) struct LockTable {
    slots: DashMap<String, Slot>,
}

/// Exclusive right to mutate one name
///
/// Releases the lock, then reclaims the slot if nobody else is waiting.
pub(crate) struct NameGuard<'a> {
    table: &'a LockTable,
    name: String,
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl LockTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn slot(&self, name: &str) -> Slot {
        // The shard write lock is held only while cloning the Arc.
        Arc::clone(
            self.slots
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Block until the lock for `name` is acquired
    pub(crate) fn lock(&self, name: &str) -> NameGuard<'_> {
        let guard = self.slot(name).lock_arc();
        NameGuard {
            table: self,
            name: name.to_string(),
            guard: Some(guard),
        }
    }

    /// Acquire the lock for `name`, giving up after `timeout`
    pub(crate) fn try_lock_for(&self, name: &str, timeout: Duration) -> Option<NameGuard<'_>> {
        let slot = self.slot(name);
        match slot.try_lock_arc_for(timeout) {
            Some(guard) => Some(NameGuard {
                table: self,
                name: name.to_string(),
                guard: Some(guard),
            }),
            None => {
                drop(slot);
                self.reclaim(name);
                None
            }
        }
    }

    fn reclaim(&self, name: &str) {
        // Clones of a slot are only taken under the shard lock that
        // `remove_if` holds, so a count of 1 means the map is the sole owner.
        self.slots
            .remove_if(name, |_, slot| Arc::strong_count(slot) == 1);
    }

    /// Number of names with a holder or waiter
    pub(crate) fn active(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
impl NameGuard<'_> {
    /// The locked name
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for NameGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.table.reclaim(&self.name);
    }
}
