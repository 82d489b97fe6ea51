//! Breadth-first tree search
//!
//! Both lookups return the first match in BFS order: shallowest depth first,
//! then left to right among siblings. Trees own their children, so they are
//! acyclic and every node is visited exactly once without a visited set.

use std::collections::VecDeque;
use uix_protocol::UiNode;

/// What a find, click or wait command is looking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Case-insensitive substring of text or content description
    Text(String),
    /// Exact, case-sensitive view identifier
    Id(String),
}

impl Selector {
    /// Find the first matching node under `root`
    pub fn find<'a>(&self, root: Option<&'a UiNode>) -> Option<&'a UiNode> {
        match self {
            Selector::Text(query) => find_by_text(root, query),
            Selector::Id(id) => find_by_identifier(root, id),
        }
    }
}

/// First node whose text or content description contains `query`,
/// ignoring case.
///
/// An empty query is a substring of every string, so it matches the root
/// itself, even when the root has no text.
pub fn find_by_text<'a>(root: Option<&'a UiNode>, query: &str) -> Option<&'a UiNode> {
    let query = query.to_lowercase();
    find_first(root, |node| {
        node.text.to_lowercase().contains(&query)
            || node.content_description.to_lowercase().contains(&query)
    })
}

/// First node whose view identifier equals `id` exactly
pub fn find_by_identifier<'a>(root: Option<&'a UiNode>, id: &str) -> Option<&'a UiNode> {
    find_first(root, |node| node.view_identifier == id)
}

/// Generic BFS returning the first node accepted by `predicate`
pub fn find_first<'a, F>(root: Option<&'a UiNode>, mut predicate: F) -> Option<&'a UiNode>
where
    F: FnMut(&UiNode) -> bool,
{
    let root = root?;
    let mut queue = VecDeque::from([root]);

    while let Some(node) = queue.pop_front() {
        if predicate(node) {
            return Some(node);
        }
        queue.extend(node.children.iter());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use uix_protocol::Bounds;

    fn node(text: &str, id: &str) -> UiNode {
        UiNode {
            text: text.into(),
            view_identifier: id.into(),
            ..Default::default()
        }
    }

    /// ```text
    /// root
    /// ├── a ("Settings", pkg:id/a)
    /// │   └── a1 ("Login deep", pkg:id/dup)
    /// └── b (desc "LOGIN button", pkg:id/b)
    ///     └── b1 ("", pkg:id/dup)
    /// ```
    fn fixture() -> UiNode {
        let mut b = node("", "pkg:id/b");
        b.content_description = "LOGIN button".into();
        b.children.push(node("", "pkg:id/dup"));

        node("", "")
            .child(node("Settings", "pkg:id/a").child(node("Login deep", "pkg:id/dup")))
            .child(b)
    }

    #[test]
    fn test_absent_root() {
        assert!(find_by_text(None, "x").is_none());
        assert!(find_by_identifier(None, "x").is_none());
        assert!(find_by_text(None, "").is_none());
    }

    #[test]
    fn test_text_prefers_shallowest_match() {
        let tree = fixture();
        // "Login deep" is at depth 2; the description match on b is at depth 1
        let found = find_by_text(Some(&tree), "login").unwrap();
        assert_eq!(found.view_identifier, "pkg:id/b");
    }

    #[test]
    fn test_text_case_insensitive() {
        let tree = fixture();
        let found = find_by_text(Some(&tree), "SETTINGS").unwrap();
        assert_eq!(found.view_identifier, "pkg:id/a");
        assert!(find_by_text(Some(&tree), "missing").is_none());
    }

    #[test]
    fn test_text_matches_description() {
        let tree = fixture();
        let found = find_by_text(Some(&tree), "button").unwrap();
        assert_eq!(found.content_description, "LOGIN button");
    }

    #[test]
    fn test_empty_query_matches_root() {
        let tree = fixture();
        let found = find_by_text(Some(&tree), "").unwrap();
        assert!(std::ptr::eq(found, &tree));
        assert!(found.text.is_empty());
    }

    #[test]
    fn test_identifier_is_exact_and_case_sensitive() {
        let tree = fixture();
        assert!(find_by_identifier(Some(&tree), "pkg:id/A").is_none());
        assert!(find_by_identifier(Some(&tree), "pkg:id").is_none());
        assert_eq!(
            find_by_identifier(Some(&tree), "pkg:id/a").unwrap().text,
            "Settings"
        );
    }

    #[test]
    fn test_identifier_collision_resolved_by_bfs_order() {
        let tree = fixture();
        // Both a1 and b1 are at depth 2; a1 comes first left to right
        let found = find_by_identifier(Some(&tree), "pkg:id/dup").unwrap();
        assert_eq!(found.text, "Login deep");
    }

    #[test]
    fn test_left_to_right_among_siblings() {
        let tree = UiNode::default()
            .child(UiNode::with_view_id("x", Bounds::new(0, 0, 1, 1)))
            .child(UiNode::with_view_id("x", Bounds::new(5, 5, 6, 6)));
        let found = find_by_identifier(Some(&tree), "x").unwrap();
        assert_eq!(found.bounds.left, 0);
    }

    #[test]
    fn test_visits_every_node_once() {
        let tree = fixture();
        let mut visited = Vec::new();
        let result = find_first(Some(&tree), |n| {
            visited.push(n.view_identifier.clone());
            false
        });
        assert!(result.is_none());
        assert_eq!(
            visited,
            vec!["", "pkg:id/a", "pkg:id/b", "pkg:id/dup", "pkg:id/dup"]
        );
    }

    #[test]
    fn test_large_tree_is_searched_completely() {
        let mut root = UiNode::default();
        root.children = vec![UiNode::default(); 10_000];
        root.children
            .push(UiNode::with_view_id("pkg:id/target", Bounds::new(0, 0, 10, 10)));
        root.children.push(UiNode::with_text("needle"));

        let found = find_by_identifier(Some(&root), "pkg:id/target").unwrap();
        assert_eq!(found.bounds, Bounds::new(0, 0, 10, 10));
        assert_eq!(find_by_text(Some(&root), "needle").unwrap().text, "needle");
    }

    #[test]
    fn test_selector_dispatch() {
        let tree = fixture();
        assert_eq!(
            Selector::Text("settings".into())
                .find(Some(&tree))
                .unwrap()
                .view_identifier,
            "pkg:id/a"
        );
        assert_eq!(
            Selector::Id("pkg:id/b".into())
                .find(Some(&tree))
                .unwrap()
                .content_description,
            "LOGIN button"
        );
    }
}
