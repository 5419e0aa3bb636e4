//! Base walker - the minimal document-order traversal primitive
//!
//! `LinearWalker` moves a cursor unit by unit through the tree. What counts
//! as a unit is decided by the predicate passed into each move, which is the
//! seam the smart walker plugs its classification into; plain callers pass
//! the host's basic leaf test.
//!
//! The walker never descends into a node the predicate accepts, and it
//! skips units that carry no content.

use dom::{NodeId, TreeAccess};

/// Document-order traversal cursor
#[derive(Debug, Clone, Default)]
pub struct LinearWalker {
    current: Option<NodeId>,
    previous: Option<NodeId>,
    /// Ancestor chain of `current` at the time it was last set, root-most
    /// first. Used as the repair path when `current` detaches.
    ancestor_path: Vec<NodeId>,
}

impl LinearWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a walker positioned at a starting node
    pub fn at<T: TreeAccess>(tree: &T, node: NodeId) -> Self {
        let mut walker = Self::new();
        walker.set_position(tree, node);
        walker
    }

    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// The node occupied immediately before the latest move
    pub fn previous_node(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn ancestor_path(&self) -> &[NodeId] {
        &self.ancestor_path
    }

    /// Move the cursor and refresh the ancestor cache
    pub fn set_position<T: TreeAccess>(&mut self, tree: &T, node: NodeId) {
        self.previous = self.current;
        self.current = Some(node);
        self.ancestor_path = tree.ancestors(node);
    }

    /// Advance to the next content-bearing unit in document order
    ///
    /// Returns `None` at the end of the document; the cursor is unchanged
    /// on `None`.
    pub fn next<T, F>(&mut self, tree: &T, is_unit: F) -> Option<NodeId>
    where
        T: TreeAccess,
        F: Fn(&T, NodeId) -> bool + Copy,
    {
        let from = self.current?;
        let target = next_unit(tree, from, is_unit)?;
        self.set_position(tree, target);
        Some(target)
    }

    /// Move to the previous content-bearing unit in document order
    pub fn previous<T, F>(&mut self, tree: &T, is_unit: F) -> Option<NodeId>
    where
        T: TreeAccess,
        F: Fn(&T, NodeId) -> bool + Copy,
    {
        let from = self.current?;
        let target = previous_unit(tree, from, is_unit)?;
        self.set_position(tree, target);
        Some(target)
    }

    /// Ancestors of `current` not shared with `previous` - the newly
    /// entered scope, root-most first
    pub fn unique_ancestors<T: TreeAccess>(&self, tree: &T) -> Vec<NodeId> {
        let Some(current) = self.current else {
            return Vec::new();
        };
        let chain = tree.ancestors(current);
        let Some(previous) = self.previous else {
            return chain;
        };
        let shared = tree.ancestors(previous);
        chain
            .into_iter()
            .filter(|a| *a != previous && !shared.contains(a))
            .collect()
    }
}

/// Next node after `node`'s subtree in document order: following sibling,
/// climbing when the sibling chain is exhausted
fn after<T: TreeAccess>(tree: &T, node: NodeId) -> Option<NodeId> {
    let mut n = node;
    loop {
        if let Some(sibling) = tree.next_sibling(n) {
            return Some(sibling);
        }
        n = tree.parent(n)?;
    }
}

/// Descend along first children until the predicate accepts a node (or a
/// childless node is reached)
fn descend_first<T, F>(tree: &T, node: NodeId, is_unit: F) -> NodeId
where
    T: TreeAccess,
    F: Fn(&T, NodeId) -> bool + Copy,
{
    let mut n = node;
    while !is_unit(tree, n) {
        match tree.first_child(n) {
            Some(child) => n = child,
            None => break,
        }
    }
    n
}

/// Mirror of `descend_first` along last children
fn descend_last<T, F>(tree: &T, node: NodeId, is_unit: F) -> NodeId
where
    T: TreeAccess,
    F: Fn(&T, NodeId) -> bool + Copy,
{
    let mut n = node;
    while !is_unit(tree, n) {
        match tree.last_child(n) {
            Some(child) => n = child,
            None => break,
        }
    }
    n
}

fn next_unit<T, F>(tree: &T, from: NodeId, is_unit: F) -> Option<NodeId>
where
    T: TreeAccess,
    F: Fn(&T, NodeId) -> bool + Copy,
{
    // A container cursor (fresh or repaired walker) is entered, a unit
    // cursor is stepped over.
    let mut cand = if !is_unit(tree, from) {
        tree.first_child(from).or_else(|| after(tree, from))?
    } else {
        after(tree, from)?
    };
    loop {
        cand = descend_first(tree, cand, is_unit);
        if is_unit(tree, cand) && tree.has_content(cand) {
            return Some(cand);
        }
        cand = after(tree, cand)?;
    }
}

fn previous_unit<T, F>(tree: &T, from: NodeId, is_unit: F) -> Option<NodeId>
where
    T: TreeAccess,
    F: Fn(&T, NodeId) -> bool + Copy,
{
    let mut node = from;
    loop {
        if let Some(sibling) = tree.prev_sibling(node) {
            let cand = descend_last(tree, sibling, is_unit);
            if is_unit(tree, cand) && tree.has_content(cand) {
                return Some(cand);
            }
            node = cand;
        } else {
            // The parent is an already-entered container, never a unit to
            // stop on; keep climbing.
            node = tree.parent(node)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::Document;

    fn fixture() -> Document {
        Document::from_json(&serde_json::json!({
            "tag": "div",
            "children": [
                { "tag": "h1", "children": ["Title"] },
                { "tag": "p", "children": ["one"] },
                { "tag": "p", "children": ["  "] },
                { "tag": "p", "children": ["two"] }
            ]
        }))
        .unwrap()
    }

    fn basic(tree: &Document, node: dom::NodeId) -> bool {
        tree.is_basic_leaf(node)
    }

    #[test]
    fn test_next_walks_content_in_document_order() {
        let doc = fixture();
        let root = doc.root_id().unwrap();
        let mut walker = LinearWalker::at(&doc, root);

        let mut texts = Vec::new();
        while let Some(n) = walker.next(&doc, basic) {
            texts.push(doc.collapsed_text(n));
        }
        // whitespace-only paragraph is skipped
        assert_eq!(texts, vec!["Title", "one", "two"]);
    }

    #[test]
    fn test_round_trip() {
        let doc = fixture();
        let root = doc.root_id().unwrap();
        let mut walker = LinearWalker::at(&doc, root);

        let first = walker.next(&doc, basic).unwrap();
        let second = walker.next(&doc, basic).unwrap();
        assert_ne!(first, second);
        assert_eq!(walker.previous(&doc, basic), Some(first));
        assert_eq!(walker.current(), Some(first));
    }

    #[test]
    fn test_failed_move_leaves_cursor() {
        let doc = fixture();
        let root = doc.root_id().unwrap();
        let mut walker = LinearWalker::at(&doc, root);
        let first = walker.next(&doc, basic).unwrap();

        assert_eq!(walker.previous(&doc, basic), None);
        assert_eq!(walker.current(), Some(first));
    }

    #[test]
    fn test_unit_predicate_stops_descent() {
        let doc = fixture();
        let root = doc.root_id().unwrap();
        let mut walker = LinearWalker::at(&doc, root);

        // paragraphs as whole units
        let para_or_leaf = |t: &Document, n: dom::NodeId| {
            t.node_tag(n) == Some("P") || t.is_basic_leaf(n)
        };
        let first = walker.next(&doc, para_or_leaf).unwrap();
        assert_eq!(doc.collapsed_text(first), "Title");
        let second = walker.next(&doc, para_or_leaf).unwrap();
        assert_eq!(doc.node_tag(second), Some("P"));
        assert_eq!(doc.collapsed_text(second), "one");
    }

    #[test]
    fn test_unique_ancestors() {
        let doc = Document::from_json(&serde_json::json!({
            "tag": "div",
            "children": [
                { "tag": "p", "children": ["a"] },
                { "tag": "ul", "children": [
                    { "tag": "li", "children": ["b"] }
                ] }
            ]
        }))
        .unwrap();
        let root = doc.root_id().unwrap();
        let mut walker = LinearWalker::at(&doc, root);

        walker.next(&doc, basic).unwrap(); // "a"
        let b = walker.next(&doc, basic).unwrap(); // "b"

        let unique = walker.unique_ancestors(&doc);
        let tags: Vec<_> = unique
            .iter()
            .map(|&a| doc.node_tag(a).unwrap_or("#text").to_string())
            .collect();
        assert_eq!(tags, vec!["UL", "LI"]);
        assert!(doc.is_descendant_of_node(b, *unique.last().unwrap()));
    }
}
