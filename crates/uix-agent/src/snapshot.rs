//! Snapshot store
//!
//! Holds the most recent UI tree. The platform thread calls
//! [`SnapshotStore::replace`] on every UI change while any number of command
//! handlers call [`SnapshotStore::current`]. A snapshot is never mutated after
//! it is published: replacement swaps a whole `Arc`, and readers keep the
//! snapshot they were handed alive for as long as they need it.

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use uix_protocol::UiNode;

/// One captured UI tree
#[derive(Debug)]
pub struct Snapshot {
    root: UiNode,
    generation: u64,
    captured_at: Instant,
}

impl Snapshot {
    pub fn root(&self) -> &UiNode {
        &self.root
    }

    /// Sequence number assigned by the store, starting at 1
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }
}

/// Process-wide holder of the latest snapshot
#[derive(Debug, Default)]
pub struct SnapshotStore {
    // The lock only guards the pointer swap, never a tree traversal.
    current: RwLock<Option<Arc<Snapshot>>>,
    generation: AtomicU64,
}

impl SnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new snapshot, fully superseding the previous one.
    ///
    /// `None` installs the absent state. Returns the generation number of
    /// the installed state.
    pub fn replace(&self, root: Option<UiNode>) -> u64 {
        let captured_at = Instant::now();
        let mut slot = self.current.write();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *slot = root.map(|root| {
            Arc::new(Snapshot {
                root,
                generation,
                captured_at,
            })
        });
        drop(slot);

        tracing::trace!(generation, "Snapshot replaced");
        generation
    }

    /// Drop the current snapshot
    pub fn clear(&self) -> u64 {
        self.replace(None)
    }

    /// The latest snapshot, if any
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    /// Generation of the latest `replace` (0 if never replaced)
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
