//! UI tree model
//!
//! One [`UiNode`] is one element of the on-screen hierarchy. A snapshot is a
//! whole tree of them, owned and immutable once captured.

use serde::{Deserialize, Serialize};

/// A rectangle in screen pixels.
///
/// Bounds are screen-absolute, never relative to the parent node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Integer midpoint of the rectangle (truncating division).
    ///
    /// Valid for any edges, including ones near the `i32` limits.
    pub fn center(&self) -> Point {
        Point {
            x: midpoint(self.left, self.right),
            y: midpoint(self.top, self.bottom),
        }
    }
}

/// The mean of two `i32` always fits in an `i32`
fn midpoint(a: i32, b: i32) -> i32 {
    ((i64::from(a) + i64::from(b)) / 2) as i32
}

/// A point in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Information about a UI node
///
/// Absent platform strings are represented as empty strings, and a leaf has an
/// empty `children` vector. Missing fields in hand-written JSON fall back to
/// those defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiNode {
    /// Visible text
    pub text: String,
    /// Accessibility description
    #[serde(rename = "content_desc")]
    pub content_description: String,
    /// Resource identifier, usually namespaced like `pkg:id/name`
    #[serde(rename = "view_id")]
    pub view_identifier: String,
    pub class_name: String,
    pub package_name: String,
    pub clickable: bool,
    pub enabled: bool,
    pub focusable: bool,
    pub checked: bool,
    pub editable: bool,
    pub bounds: Bounds,
    /// Children in the order the platform reports them
    pub children: Vec<UiNode>,
}

impl UiNode {
    /// Create a node with the given text and no other attributes set
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a node with the given view identifier and bounds
    pub fn with_view_id(view_id: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            view_identifier: view_id.into(),
            bounds,
            ..Default::default()
        }
    }

    /// Builder-style helper to append a child
    pub fn child(mut self, child: UiNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(UiNode::subtree_len).sum::<usize>()
    }
}
