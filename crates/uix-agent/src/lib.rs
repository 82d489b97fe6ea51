//! Library to embed in a device-side service for uix remote control
//!
//! The embedding service owns the platform glue: it implements
//! [`GestureBackend`] and [`ActionBackend`], forwards UI change notifications
//! to [`UixAgent::on_ui_changed`], and starts the command server. Everything
//! between the socket and those traits lives here.

use std::sync::Arc;

pub use uix_protocol::{
    Bounds, Command, CommandError, GlobalAction, Point, Request, Response, UiNode,
};

mod backend;
mod dispatcher;
mod gesture;
pub mod search;
mod server;
mod snapshot;
mod wait;

pub use backend::{ActionBackend, GestureBackend};
pub use dispatcher::Dispatcher;
pub use gesture::{GestureCallback, GestureOutcome, GestureSynchronizer, StrokeDescription};
pub use search::Selector;
pub use server::{
    CommandServer, DEFAULT_BACKLOG, DEFAULT_READ_TIMEOUT, ServerConfig, ServerError, ServerHandle,
};
pub use snapshot::{Snapshot, SnapshotStore};
pub use wait::{DEFAULT_POLL_INTERVAL, WaitEngine};

/// Shared state for the uix agent
#[derive(Clone)]
pub struct UixAgent {
    store: Arc<SnapshotStore>,
    dispatcher: Arc<Dispatcher>,
}

impl UixAgent {
    /// Create an agent with an empty snapshot store
    pub fn new(gestures: Arc<dyn GestureBackend>, actions: Arc<dyn ActionBackend>) -> Self {
        let store = Arc::new(SnapshotStore::new());
        let dispatcher = Dispatcher::new(Arc::clone(&store), gestures, actions);
        Self::from_parts(store, dispatcher)
    }

    /// Assemble an agent from a store and a dispatcher built on that store
    pub fn from_parts(store: Arc<SnapshotStore>, dispatcher: Dispatcher) -> Self {
        Self {
            store,
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Feed a UI change notification from the platform.
    ///
    /// A notification without a root (no active window) keeps the previous
    /// snapshot; use [`SnapshotStore::clear`] to drop it explicitly.
    pub fn on_ui_changed(&self, root: Option<UiNode>) {
        match root {
            Some(root) => {
                let generation = self.store.replace(Some(root));
                tracing::debug!(generation, "UI snapshot updated");
            }
            None => tracing::trace!("UI change without an active root, keeping snapshot"),
        }
    }

    /// Start the command server in a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_server(&self, config: &ServerConfig) -> Result<ServerHandle, ServerError> {
        CommandServer::spawn(config, Arc::clone(&self.dispatcher))
    }
}
