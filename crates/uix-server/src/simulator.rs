//! Simulated device
//!
//! Stands in for the platform so the command server can be driven without a
//! real device: the UI comes from a JSON fixture, gestures "complete" after
//! their stroke duration on a separate thread, and set-text edits publish a
//! new snapshot with the text replaced.

use crate::errors::FixtureError;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use uix_agent::{
    ActionBackend, GestureBackend, GestureCallback, GlobalAction, SnapshotStore,
    StrokeDescription, UiNode,
};

/// Load a UI tree from a JSON file in the wire node shape
pub fn load_fixture(path: &Path) -> Result<UiNode, FixtureError> {
    let data = std::fs::read_to_string(path).map_err(|e| FixtureError::read(path, e))?;
    serde_json::from_str(&data).map_err(|e| FixtureError::parse(path, e))
}

/// Platform stand-in backed by a snapshot store
pub struct SimulatedDevice {
    store: Arc<SnapshotStore>,
}

impl SimulatedDevice {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }
}

impl GestureBackend for SimulatedDevice {
    fn dispatch_gesture(&self, stroke: StrokeDescription, callback: GestureCallback) {
        tracing::info!(
            points = ?stroke.points,
            duration_ms = stroke.duration.as_millis() as u64,
            "Simulated gesture"
        );
        thread::spawn(move || {
            thread::sleep(stroke.duration);
            callback.completed();
        });
    }
}

impl ActionBackend for SimulatedDevice {
    fn perform_global_action(&self, action: GlobalAction) -> bool {
        tracing::info!(%action, "Simulated global action");
        true
    }

    fn set_text(&self, node: &UiNode, text: &str) -> bool {
        if !node.editable {
            tracing::info!(view_id = %node.view_identifier, "Rejected set text on read-only node");
            return false;
        }

        let Some(snapshot) = self.store.current() else {
            return false;
        };
        let mut root = snapshot.root().clone();
        if !set_text_by_id(&mut root, &node.view_identifier, text) {
            return false;
        }

        let generation = self.store.replace(Some(root));
        tracing::info!(
            view_id = %node.view_identifier,
            generation,
            "Simulated set text"
        );
        true
    }
}

/// Replace the text of the first node (BFS order) with identifier `id`
fn set_text_by_id(root: &mut UiNode, id: &str, text: &str) -> bool {
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        if node.view_identifier == id {
            node.text = text.to_string();
            return true;
        }
        queue.extend(node.children.iter_mut());
    }
    false
}
