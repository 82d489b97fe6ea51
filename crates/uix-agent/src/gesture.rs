//! Synchronous gesture execution
//!
//! The platform reports gesture completion through a callback fired later on
//! an arbitrary thread. [`GestureSynchronizer`] turns that into a blocking
//! call returning `true` for completed and `false` for cancelled.
//!
//! The calling thread is blocked for the whole gesture duration, so callers
//! must run on a blocking worker (see `tokio::task::spawn_blocking`), never
//! on an async executor thread.

use crate::backend::GestureBackend;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use uix_protocol::{DEFAULT_SWIPE_DURATION_MS, DEFAULT_TAP_DURATION_MS, Point};

/// A single pointer stroke through `points`, lasting `duration`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeDescription {
    pub points: Vec<Point>,
    pub duration: Duration,
}

impl StrokeDescription {
    /// Single-point stroke
    pub fn tap(point: Point, duration: Duration) -> Self {
        Self {
            points: vec![point],
            duration,
        }
    }

    /// Straight two-point stroke
    pub fn swipe(from: Point, to: Point, duration: Duration) -> Self {
        Self {
            points: vec![from, to],
            duration,
        }
    }
}

/// How a dispatched gesture ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Completed,
    Cancelled,
}

/// Single-use completion handle handed to the gesture backend.
///
/// Signalling consumes the handle, so a gesture can be reported at most
/// once. Dropping it without signalling counts as cancellation.
#[derive(Debug)]
pub struct GestureCallback {
    tx: oneshot::Sender<GestureOutcome>,
}

impl GestureCallback {
    pub fn signal(self, outcome: GestureOutcome) {
        // The waiting side only goes away if its thread died
        let _ = self.tx.send(outcome);
    }

    pub fn completed(self) {
        self.signal(GestureOutcome::Completed);
    }

    pub fn cancelled(self) {
        self.signal(GestureOutcome::Cancelled);
    }
}

/// Blocking front-end to an asynchronous gesture backend
#[derive(Clone)]
pub struct GestureSynchronizer {
    backend: Arc<dyn GestureBackend>,
}

impl GestureSynchronizer {
    pub fn new(backend: Arc<dyn GestureBackend>) -> Self {
        Self { backend }
    }

    /// Dispatch a stroke and block until the backend reports its outcome.
    ///
    /// There is no timeout: the backend is trusted to signal eventually.
    pub fn execute_gesture(&self, stroke: StrokeDescription) -> bool {
        let (tx, rx) = oneshot::channel();
        tracing::debug!("Dispatching gesture {:?}", stroke);
        self.backend.dispatch_gesture(stroke, GestureCallback { tx });

        match rx.blocking_recv() {
            Ok(GestureOutcome::Completed) => true,
            Ok(GestureOutcome::Cancelled) => {
                tracing::debug!("Gesture cancelled");
                false
            }
            Err(_) => {
                tracing::warn!("Gesture backend dropped the callback without signalling");
                false
            }
        }
    }

    /// Tap at `point` for `duration`
    pub fn tap(&self, point: Point, duration: Duration) -> bool {
        self.execute_gesture(StrokeDescription::tap(point, duration))
    }

    /// Tap with the default duration
    pub fn click(&self, point: Point) -> bool {
        self.tap(point, Duration::from_millis(DEFAULT_TAP_DURATION_MS))
    }

    /// Swipe from `from` to `to` over `duration`
    pub fn swipe(&self, from: Point, to: Point, duration: Duration) -> bool {
        self.execute_gesture(StrokeDescription::swipe(from, to, duration))
    }

    /// Swipe with the default duration
    pub fn swipe_default(&self, from: Point, to: Point) -> bool {
        self.swipe(from, to, Duration::from_millis(DEFAULT_SWIPE_DURATION_MS))
    }
}
