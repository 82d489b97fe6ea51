//! Command dispatch
//!
//! Turns one request line into one [`Response`]. Handlers never fail hard:
//! malformed arguments, missing nodes, timeouts and declined actions all
//! become `Response::Error` values.
//!
//! Dispatch may block (gestures, waits) and must run on a blocking worker.

use crate::backend::{ActionBackend, GestureBackend};
use crate::gesture::GestureSynchronizer;
use crate::search::Selector;
use crate::snapshot::SnapshotStore;
use crate::wait::WaitEngine;
use std::sync::Arc;
use std::time::Duration;
use uix_protocol::{Command, CommandError, GlobalAction, Point, Request, Response};

/// Routes parsed commands to their handlers
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<SnapshotStore>,
    waiter: WaitEngine,
    gestures: GestureSynchronizer,
    actions: Arc<dyn ActionBackend>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<SnapshotStore>,
        gestures: Arc<dyn GestureBackend>,
        actions: Arc<dyn ActionBackend>,
    ) -> Self {
        Self {
            waiter: WaitEngine::new(Arc::clone(&store)),
            store,
            gestures: GestureSynchronizer::new(gestures),
            actions,
        }
    }

    /// Replace the wait engine (e.g. with a shorter poll interval)
    pub fn with_wait_engine(mut self, waiter: WaitEngine) -> Self {
        self.waiter = waiter;
        self
    }

    /// Parse and execute one request line
    pub fn dispatch_line(&self, line: &str) -> Response {
        let request = Request::parse(line);
        match Command::try_from(&request) {
            Ok(command) => self.execute(command),
            Err(error) => {
                tracing::debug!(verb = %request.verb, "Rejected request: {}", error);
                Response::Error(error)
            }
        }
    }

    /// Execute a parsed command
    pub fn execute(&self, command: Command) -> Response {
        tracing::debug!(verb = command.verb(), "Executing command");
        match command {
            Command::Dump => self.dump(),
            Command::FindText(query) => self.find(&Selector::Text(query)),
            Command::FindId(id) => self.find(&Selector::Id(id)),
            Command::ClickText(query) => self.click(&Selector::Text(query)),
            Command::ClickId(id) => self.click(&Selector::Id(id)),
            Command::SetTextId { id, text } => self.set_text(&id, &text),
            Command::Global(action) => self.global(action),
            Command::Swipe {
                from,
                to,
                duration_ms,
            } => self.swipe(from, to, duration_ms),
            Command::WaitText { text, timeout_ms } => {
                self.wait(&Selector::Text(text), timeout_ms)
            }
            Command::WaitId { id, timeout_ms } => self.wait(&Selector::Id(id), timeout_ms),
        }
    }

    fn dump(&self) -> Response {
        let snapshot = self.store.current();
        Response::Dump(snapshot.map(|s| s.root().clone()))
    }

    fn find(&self, selector: &Selector) -> Response {
        let snapshot = self.store.current();
        let root = snapshot.as_deref().map(|s| s.root());
        Response::Found(selector.find(root).cloned())
    }

    fn click(&self, selector: &Selector) -> Response {
        let point = {
            let snapshot = self.store.current();
            let root = snapshot.as_deref().map(|s| s.root());
            match selector.find(root) {
                Some(node) => node.bounds.center(),
                None => return CommandError::NodeNotFound.into(),
            }
        };

        let ok = self.gestures.click(point);
        Response::Clicked { ok, point }
    }

    fn set_text(&self, id: &str, text: &str) -> Response {
        let snapshot = self.store.current();
        let root = snapshot.as_deref().map(|s| s.root());
        let Some(node) = Selector::Id(id.to_string()).find(root) else {
            return CommandError::NodeNotFound.into();
        };

        if self.actions.set_text(node, text) {
            Response::TextSet
        } else {
            tracing::debug!(id, "Set text declined by backend");
            CommandError::ActionFailed.into()
        }
    }

    fn global(&self, action: GlobalAction) -> Response {
        if self.actions.perform_global_action(action) {
            Response::GlobalAction(action)
        } else {
            tracing::debug!(%action, "Global action declined by backend");
            CommandError::ActionFailed.into()
        }
    }

    fn swipe(&self, from: Point, to: Point, duration_ms: u64) -> Response {
        let ok = self
            .gestures
            .swipe(from, to, Duration::from_millis(duration_ms));
        Response::Swiped {
            ok,
            from,
            to,
            duration_ms,
        }
    }

    fn wait(&self, selector: &Selector, timeout_ms: u64) -> Response {
        match self
            .waiter
            .wait_for(selector, Duration::from_millis(timeout_ms))
        {
            Some(node) => Response::Appeared(node),
            None => CommandError::Timeout.into(),
        }
    }
}
