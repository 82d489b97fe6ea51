//! Typed command responses
//!
//! Each handler produces a [`Response`] variant; the exact wire field names
//! are fixed in one place, the [`Serialize`] impl below.

use crate::command::GlobalAction;
use crate::node::{Point, UiNode};
use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// Reasons reported in the `error` field of a failed response.
///
/// The `Display` output is the exact wire string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown_command")]
    UnknownCommand,
    #[error("node_not_found")]
    NodeNotFound,
    #[error("timeout")]
    Timeout,
    #[error("action_failed")]
    ActionFailed,
    #[error("unknown_global_action")]
    UnknownGlobalAction,
    #[error("invalid_arguments")]
    InvalidArguments,
    #[error("command_too_long")]
    CommandTooLong,
    /// Malformed or missing arguments, carrying the usage line of the verb
    #[error("{0}")]
    Usage(&'static str),
}

/// Response to a single command
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// `DUMP`: the full tree, or `{}` when no snapshot exists
    Dump(Option<UiNode>),
    /// `FIND_*`: `{found, node?}`
    Found(Option<UiNode>),
    /// `CLICK_*`: the tapped point and whether the gesture completed
    Clicked { ok: bool, point: Point },
    /// `SET_TEXT_ID` accepted by the backend
    TextSet,
    /// `GLOBAL` accepted by the backend
    GlobalAction(GlobalAction),
    /// `SWIPE`: echo of the stroke and whether the gesture completed
    Swiped {
        ok: bool,
        from: Point,
        to: Point,
        duration_ms: u64,
    },
    /// `WAIT_*`: the node that appeared
    Appeared(UiNode),
    /// Any failure: `{ok:false, error}`
    Error(CommandError),
}

impl Response {
    /// Whether the response signals success (`ok` or `found`)
    pub fn is_success(&self) -> bool {
        match self {
            Response::Dump(_) | Response::TextSet | Response::GlobalAction(_) => true,
            Response::Appeared(_) => true,
            Response::Found(node) => node.is_some(),
            Response::Clicked { ok, .. } | Response::Swiped { ok, .. } => *ok,
            Response::Error(_) => false,
        }
    }

    /// Serialize to a single JSON line (without the terminator)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<CommandError> for Response {
    fn from(error: CommandError) -> Self {
        Response::Error(error)
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Response::Dump(Some(root)) => root.serialize(serializer),
            Response::Dump(None) => serializer.serialize_map(Some(0))?.end(),
            Response::Found(node) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("found", &node.is_some())?;
                if let Some(node) = node {
                    map.serialize_entry("node", node)?;
                }
                map.end()
            }
            Response::Clicked { ok, point } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("ok", ok)?;
                map.serialize_entry("x", &point.x)?;
                map.serialize_entry("y", &point.y)?;
                map.end()
            }
            Response::TextSet => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("ok", &true)?;
                map.end()
            }
            Response::GlobalAction(action) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("ok", &true)?;
                map.serialize_entry("action", action)?;
                map.end()
            }
            Response::Swiped {
                ok,
                from,
                to,
                duration_ms,
            } => {
                let mut map = serializer.serialize_map(Some(6))?;
                map.serialize_entry("ok", ok)?;
                map.serialize_entry("x1", &from.x)?;
                map.serialize_entry("y1", &from.y)?;
                map.serialize_entry("x2", &to.x)?;
                map.serialize_entry("y2", &to.y)?;
                map.serialize_entry("duration", duration_ms)?;
                map.end()
            }
            Response::Appeared(node) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("ok", &true)?;
                map.serialize_entry("node", node)?;
                map.end()
            }
            Response::Error(error) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("ok", &false)?;
                map.serialize_entry("error", &error.to_string())?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SWIPE_USAGE;
    use crate::node::Bounds;
    use serde_json::{Value, json};

    fn to_value(response: &Response) -> Value {
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn test_error_strings() {
        assert_eq!(CommandError::UnknownCommand.to_string(), "unknown_command");
        assert_eq!(CommandError::NodeNotFound.to_string(), "node_not_found");
        assert_eq!(CommandError::Timeout.to_string(), "timeout");
        assert_eq!(
            CommandError::Usage(SWIPE_USAGE).to_string(),
            "usage: SWIPE x1 y1 x2 y2 [durationMs]"
        );
    }

    #[test]
    fn test_empty_dump_is_empty_object() {
        assert_eq!(to_value(&Response::Dump(None)), json!({}));
    }

    #[test]
    fn test_dump_is_bare_tree() {
        let root = UiNode::with_text("root");
        let value = to_value(&Response::Dump(Some(root)));
        assert_eq!(value["text"], "root");
        assert_eq!(value["children"], json!([]));
        assert!(value.get("ok").is_none());
    }

    #[test]
    fn test_found_shapes() {
        assert_eq!(to_value(&Response::Found(None)), json!({"found": false}));

        let value = to_value(&Response::Found(Some(UiNode::with_text("Login"))));
        assert_eq!(value["found"], true);
        assert_eq!(value["node"]["text"], "Login");
    }

    #[test]
    fn test_click_shape() {
        let value = to_value(&Response::Clicked {
            ok: true,
            point: Bounds::new(0, 0, 100, 50).center(),
        });
        assert_eq!(value, json!({"ok": true, "x": 50, "y": 25}));
    }

    #[test]
    fn test_swipe_shape() {
        let value = to_value(&Response::Swiped {
            ok: true,
            from: Point::new(10, 10),
            to: Point::new(90, 90),
            duration_ms: 300,
        });
        assert_eq!(
            value,
            json!({"ok": true, "x1": 10, "y1": 10, "x2": 90, "y2": 90, "duration": 300})
        );
    }

    #[test]
    fn test_global_and_set_text_shapes() {
        assert_eq!(
            to_value(&Response::GlobalAction(GlobalAction::QuickSettings)),
            json!({"ok": true, "action": "QUICK_SETTINGS"})
        );
        assert_eq!(to_value(&Response::TextSet), json!({"ok": true}));
    }

    #[test]
    fn test_error_shape() {
        assert_eq!(
            to_value(&CommandError::NodeNotFound.into()),
            json!({"ok": false, "error": "node_not_found"})
        );
    }

    #[test]
    fn test_field_order_on_the_wire() {
        let json = Response::Clicked {
            ok: false,
            point: Point::new(1, 2),
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"ok":false,"x":1,"y":2}"#);
    }

    #[test]
    fn test_is_success() {
        assert!(Response::Dump(None).is_success());
        assert!(!Response::Found(None).is_success());
        assert!(!Response::Error(CommandError::Timeout).is_success());
        assert!(
            !Response::Clicked {
                ok: false,
                point: Point::default()
            }
            .is_success()
        );
    }
}
