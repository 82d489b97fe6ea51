//! Platform collaborators
//!
//! The agent does not talk to the platform directly. A device-side service
//! implements these traits on top of its accessibility APIs and feeds UI
//! changes into [`crate::UixAgent::on_ui_changed`].

use crate::gesture::{GestureCallback, StrokeDescription};
use uix_protocol::{GlobalAction, UiNode};

/// Low-level gesture injection.
///
/// `dispatch_gesture` must return promptly. The outcome is reported later,
/// exactly once, through `callback`, from any thread.
pub trait GestureBackend: Send + Sync {
    fn dispatch_gesture(&self, stroke: StrokeDescription, callback: GestureCallback);
}

/// Immediate platform actions
pub trait ActionBackend: Send + Sync {
    /// Perform a system navigation action; `false` if the platform declined
    fn perform_global_action(&self, action: GlobalAction) -> bool;

    /// Replace the text of `node`; `false` if the platform declined
    fn set_text(&self, node: &UiNode, text: &str) -> bool;
}
