//! Bounded polling for nodes to appear
//!
//! Cooperative polling over the snapshot store: detection latency is bounded
//! by one poll interval. Blocks the calling thread, so it must run on a
//! blocking worker, never on an async executor thread.

use crate::search::Selector;
use crate::snapshot::SnapshotStore;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use uix_protocol::UiNode;

/// Default interval between two searches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Polls the snapshot store until a selector matches or a deadline passes
#[derive(Debug, Clone)]
pub struct WaitEngine {
    store: Arc<SnapshotStore>,
    poll_interval: Duration,
}

impl WaitEngine {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self::with_poll_interval(store, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(store: Arc<SnapshotStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Search the latest snapshot until `selector` matches.
    ///
    /// Returns a copy of the first match, or `None` once `timeout` has
    /// elapsed on the monotonic clock. At least one search is always made,
    /// even with a zero timeout.
    pub fn wait_for(&self, selector: &Selector, timeout: Duration) -> Option<UiNode> {
        let deadline = Instant::now() + timeout;
        let mut polls = 0u32;

        loop {
            polls += 1;
            if let Some(snapshot) = self.store.current()
                && let Some(node) = selector.find(Some(snapshot.root()))
            {
                tracing::debug!(
                    polls,
                    generation = snapshot.generation(),
                    snapshot_age_ms = snapshot.captured_at().elapsed().as_millis() as u64,
                    "Wait satisfied for {:?}",
                    selector
                );
                return Some(node.clone());
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(polls, "Wait timed out for {:?}", selector);
                return None;
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}
