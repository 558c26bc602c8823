//! Snapshot holder with a locking strategy chosen at construction.
//!
//! A store that never reloads has no watcher racing its readers, so it keeps
//! its snapshot in an [`ArcSwap`] and reads it without locking; an explicit
//! load still swaps the whole snapshot. A reloading store swaps an
//! `Arc<Snapshot>` behind a [`parking_lot::RwLock`] held only for the pointer
//! swap or the lookup itself.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::RwLock;

use crate::snapshot::Snapshot;

pub(crate) enum SnapshotCell {
    /// Lock-free reads, replaced only by explicit loads.
    Unlocked(ArcSwap<Snapshot>),
    /// Replaced wholesale on every reload.
    Shared(RwLock<Arc<Snapshot>>),
}

impl SnapshotCell {
    pub(crate) fn new(reload: bool) -> Self {
        if reload {
            Self::Shared(RwLock::new(Arc::new(Snapshot::new())))
        } else {
            Self::Unlocked(ArcSwap::from_pointee(Snapshot::new()))
        }
    }

    /// Read the current snapshot via a closure.
    pub(crate) fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Snapshot) -> R,
    {
        match self {
            Self::Unlocked(cell) => f(&cell.load()),
            Self::Shared(lock) => {
                let guard = lock.read();
                f(&guard)
            }
        }
    }

    /// Get a clone of the current snapshot.
    pub(crate) fn get(&self) -> Arc<Snapshot> {
        match self {
            Self::Unlocked(cell) => cell.load_full(),
            Self::Shared(lock) => lock.read().clone(),
        }
    }

    /// Install `snapshot`, dropping the previous one outside any lock.
    pub(crate) fn replace(&self, snapshot: Arc<Snapshot>) {
        let old = match self {
            Self::Unlocked(cell) => cell.swap(snapshot),
            Self::Shared(lock) => std::mem::replace(&mut *lock.write(), snapshot),
        };
        drop(old);
    }
}

impl std::fmt::Debug for SnapshotCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlocked(_) => f.write_str("Unlocked"),
            Self::Shared(_) => f.write_str("Shared"),
        }
    }
}
