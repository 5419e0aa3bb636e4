//! Accessor capabilities over the host tree
//!
//! `TreeAccess` is the capability surface a navigation engine consumes:
//! structural relationships, content extraction, leaf tests, and the
//! breakout structural query. `Document` is the in-process reference host
//! backed by `DomArena`.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{DomNode, NodeId, NodeType};
use crate::utils::{collapse_whitespace, is_whitespace_only};
use serde::{Deserialize, Serialize};

/// Element kinds the structural query can look for
///
/// Each kind matches a tag set or a role set; the kind list itself is
/// engine configuration, not host knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Heading,
    List,
    Table,
    FormControl,
    CompositeWidget,
}

const HEADING_TAGS: &[&str] = &["H1", "H2", "H3", "H4", "H5", "H6"];
const LIST_TAGS: &[&str] = &["UL", "OL", "DL"];
const TABLE_TAGS: &[&str] = &["TABLE"];
const CONTROL_TAGS: &[&str] = &["INPUT", "SELECT", "TEXTAREA", "BUTTON"];

const LIST_ROLES: &[&str] = &["list", "directory", "feed"];
const TABLE_ROLES: &[&str] = &["table", "grid", "treegrid"];
const CONTROL_ROLES: &[&str] = &[
    "button",
    "checkbox",
    "radio",
    "textbox",
    "searchbox",
    "combobox",
    "slider",
    "spinbutton",
    "switch",
];
const COMPOSITE_ROLES: &[&str] = &[
    "combobox",
    "grid",
    "listbox",
    "menu",
    "menubar",
    "radiogroup",
    "tablist",
    "toolbar",
    "tree",
    "treegrid",
];

impl ElementKind {
    /// Whether a node with the given tag/role belongs to this kind
    pub fn matches(&self, tag: Option<&str>, role: Option<&str>) -> bool {
        let tag_in = |set: &[&str]| tag.map(|t| set.contains(&t)).unwrap_or(false);
        let role_in = |set: &[&str]| role.map(|r| set.contains(&r)).unwrap_or(false);
        match self {
            ElementKind::Heading => tag_in(HEADING_TAGS) || role == Some("heading"),
            ElementKind::List => tag_in(LIST_TAGS) || role_in(LIST_ROLES),
            ElementKind::Table => tag_in(TABLE_TAGS) || role_in(TABLE_ROLES),
            ElementKind::FormControl => tag_in(CONTROL_TAGS) || role_in(CONTROL_ROLES),
            ElementKind::CompositeWidget => role_in(COMPOSITE_ROLES),
        }
    }
}

/// Capability set a host tree provides to the navigation engine
///
/// Handles are opaque `NodeId`s; a handle may refer to a node that has been
/// detached from the document since it was obtained, and every capability
/// must stay safe to call on such a handle.
pub trait TreeAccess {
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn first_child(&self, node: NodeId) -> Option<NodeId>;
    fn last_child(&self, node: NodeId) -> Option<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn prev_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Whether the node is still reachable from the document root
    fn is_attached(&self, node: NodeId) -> bool;

    /// Uppercase tag name for elements
    fn node_tag(&self, node: NodeId) -> Option<&str>;
    /// Explicit ARIA role
    fn node_role(&self, node: NodeId) -> Option<&str>;
    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Accessible name (label text), empty when absent
    fn name(&self, node: NodeId) -> String;
    /// Text value: text-node content or a control's current value
    fn value(&self, node: NodeId) -> String;

    /// Basic (non-smart) leaf test: text nodes, childless elements, and
    /// atomic element kinds the host never descends into
    fn is_basic_leaf(&self, node: NodeId) -> bool;

    /// Composite interactive widget (aggregates sub-controls)
    fn is_composite_control(&self, node: NodeId) -> bool;
    fn is_focusable(&self, node: NodeId) -> bool;

    /// Resolve an element by its id attribute (headers="..." references)
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Whether structural queries are available on this host
    fn query_supported(&self) -> bool;

    /// Descendants of `scope` (scope itself excluded) matching any of the
    /// given kinds, in document order. Empty when queries are unsupported.
    fn query_kinds(&self, scope: NodeId, kinds: &[ElementKind]) -> Vec<NodeId>;

    /// Ancestor chain of a node, root-most first, excluding the node
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Whether `node` lies inside the subtree rooted at `ancestor`
    fn is_descendant_of_node(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Nearest self-or-ancestor carrying the given tag
    fn ancestor_with_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.node_tag(n) == Some(tag) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    /// Child handles in document order
    fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.first_child(node);
        while let Some(c) = current {
            out.push(c);
            current = self.next_sibling(c);
        }
        out
    }

    /// Concatenated text of the subtree, document order
    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let value = self.value(n);
            if !value.is_empty() {
                out.push_str(&value);
            } else if self.first_child(n).is_none() {
                // childless element: its accessible name stands in (alt text)
                out.push_str(&self.name(n));
            }
            let mut children = self.children_of(n);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Whether the subtree carries any non-whitespace text
    fn has_content(&self, node: NodeId) -> bool {
        !is_whitespace_only(&self.text_content(node))
    }

    /// Collapsed, trimmed text of the subtree
    fn collapsed_text(&self, node: NodeId) -> String {
        collapse_whitespace(&self.text_content(node))
    }
}

/// Host configuration
///
/// `structural_queries` models hosts that lack a query engine; the walker
/// degrades to non-smart behavior without it.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub structural_queries: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            structural_queries: true,
        }
    }
}

/// The in-process reference host: arena storage plus accessor capabilities
#[derive(Debug)]
pub struct Document {
    config: DocumentConfig,
    arena: DomArena,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Element kinds the host never descends into
const ATOMIC_TAGS: &[&str] = &["IMG", "INPUT", "SELECT", "TEXTAREA", "BUTTON", "BR", "HR"];

impl Document {
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            config,
            arena: DomArena::new(),
        }
    }

    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut DomArena {
        &mut self.arena
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.arena.root_id()
    }

    /// Unlink a subtree, simulating host-side content replacement
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        self.arena.detach(node)
    }

    fn node(&self, node: NodeId) -> Option<&DomNode> {
        self.arena.get(node).ok()
    }

    fn sibling_offset(&self, node: NodeId, forward: bool) -> Option<NodeId> {
        let parent = self.node(node)?.parent_id?;
        let siblings = &self.node(parent)?.children_ids;
        let pos = siblings.iter().position(|&c| c == node)?;
        if forward {
            siblings.get(pos + 1).copied()
        } else {
            pos.checked_sub(1).and_then(|p| siblings.get(p).copied())
        }
    }
}

impl TreeAccess for Document {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent_id
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.children_ids.first().copied()
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.children_ids.last().copied()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling_offset(node, true)
    }

    fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling_offset(node, false)
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.arena.is_attached(node)
    }

    fn node_tag(&self, node: NodeId) -> Option<&str> {
        self.node(node)?.tag_name()
    }

    fn node_role(&self, node: NodeId) -> Option<&str> {
        self.node(node)?.role()
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?.attr(name)
    }

    fn name(&self, node: NodeId) -> String {
        let Some(n) = self.node(node) else {
            return String::new();
        };
        for attr in ["aria-label", "alt", "title"] {
            if let Some(v) = n.attr(attr) {
                if !v.is_empty() {
                    return v.to_string();
                }
            }
        }
        String::new()
    }

    fn value(&self, node: NodeId) -> String {
        let Some(n) = self.node(node) else {
            return String::new();
        };
        if n.is_text() {
            return n.node_value.clone();
        }
        n.attr("value").unwrap_or("").to_string()
    }

    fn is_basic_leaf(&self, node: NodeId) -> bool {
        let Some(n) = self.node(node) else {
            return false;
        };
        match n.node_type {
            NodeType::Text => true,
            NodeType::Element => {
                n.children_ids.is_empty() || ATOMIC_TAGS.contains(&n.node_name.as_str())
            }
            _ => false,
        }
    }

    fn is_composite_control(&self, node: NodeId) -> bool {
        ElementKind::CompositeWidget.matches(self.node_tag(node), self.node_role(node))
    }

    fn is_focusable(&self, node: NodeId) -> bool {
        let Some(n) = self.node(node) else {
            return false;
        };
        if n.focusable || n.attr("tabindex").is_some() {
            return true;
        }
        match n.node_name.as_str() {
            "A" => n.attr("href").is_some(),
            "INPUT" | "SELECT" | "TEXTAREA" | "BUTTON" => true,
            _ => false,
        }
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.arena.find_by_id(id)
    }

    fn query_supported(&self) -> bool {
        self.config.structural_queries
    }

    fn query_kinds(&self, scope: NodeId, kinds: &[ElementKind]) -> Vec<NodeId> {
        if !self.config.structural_queries {
            return Vec::new();
        }
        let mut hits = Vec::new();
        let mut stack: Vec<NodeId> = self
            .children_of(scope)
            .into_iter()
            .rev()
            .collect();
        while let Some(n) = stack.pop() {
            let tag = self.node_tag(n);
            let role = self.node_role(n);
            if kinds.iter().any(|k| k.matches(tag, role)) {
                hits.push(n);
            }
            let mut children = self.children_of(n);
            children.reverse();
            stack.extend(children);
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DomNode;

    #[test]
    fn test_ancestors_rootmost_first() {
        let mut doc = Document::new();
        let a = doc.arena_mut().add_node(DomNode::element("div"));
        let b = doc.arena_mut().add_node(DomNode::element("p"));
        let c = doc.arena_mut().add_node(DomNode::text("x"));
        doc.arena_mut().set_root(a).unwrap();
        doc.arena_mut().append_child(a, b).unwrap();
        doc.arena_mut().append_child(b, c).unwrap();

        assert_eq!(doc.ancestors(c), vec![a, b]);
        assert!(doc.is_descendant_of_node(c, a));
        assert!(!doc.is_descendant_of_node(a, c));
    }

    #[test]
    fn test_text_content_document_order() {
        let mut doc = Document::new();
        let root = doc.arena_mut().add_node(DomNode::element("p"));
        let t1 = doc.arena_mut().add_node(DomNode::text("Hello "));
        let em = doc.arena_mut().add_node(DomNode::element("em"));
        let t2 = doc.arena_mut().add_node(DomNode::text("world"));
        doc.arena_mut().set_root(root).unwrap();
        doc.arena_mut().append_child(root, t1).unwrap();
        doc.arena_mut().append_child(root, em).unwrap();
        doc.arena_mut().append_child(em, t2).unwrap();

        assert_eq!(doc.collapsed_text(root), "Hello world");
        assert!(doc.has_content(root));
    }

    #[test]
    fn test_basic_leaf() {
        let mut doc = Document::new();
        let img = doc.arena_mut().add_node(DomNode::element("img"));
        let p = doc.arena_mut().add_node(DomNode::element("p"));
        let t = doc.arena_mut().add_node(DomNode::text("x"));
        doc.arena_mut().set_root(p).unwrap();
        doc.arena_mut().append_child(p, t).unwrap();

        assert!(doc.is_basic_leaf(img));
        assert!(doc.is_basic_leaf(t));
        assert!(!doc.is_basic_leaf(p));
    }

    #[test]
    fn test_query_kinds_excludes_scope() {
        let mut doc = Document::new();
        let table = doc.arena_mut().add_node(DomNode::element("table"));
        let tr = doc.arena_mut().add_node(DomNode::element("tr"));
        let h = doc.arena_mut().add_node(DomNode::element("h2"));
        doc.arena_mut().set_root(table).unwrap();
        doc.arena_mut().append_child(table, tr).unwrap();
        doc.arena_mut().append_child(tr, h).unwrap();

        let hits = doc.query_kinds(table, &[ElementKind::Table, ElementKind::Heading]);
        assert_eq!(hits, vec![h]);
    }

    #[test]
    fn test_query_unsupported_is_empty() {
        let mut doc = Document::with_config(DocumentConfig {
            structural_queries: false,
        });
        let root = doc.arena_mut().add_node(DomNode::element("div"));
        let h = doc.arena_mut().add_node(DomNode::element("h1"));
        doc.arena_mut().set_root(root).unwrap();
        doc.arena_mut().append_child(root, h).unwrap();

        assert!(!doc.query_supported());
        assert!(doc.query_kinds(root, &[ElementKind::Heading]).is_empty());
    }

    #[test]
    fn test_composite_and_focus() {
        let mut doc = Document::new();
        let menu = doc
            .arena_mut()
            .add_node(DomNode::element("div").with_attr("role", "menubar"));
        let link = doc
            .arena_mut()
            .add_node(DomNode::element("a").with_attr("href", "#"));
        let plain = doc.arena_mut().add_node(DomNode::element("a"));
        doc.arena_mut().set_root(menu).unwrap();

        assert!(doc.is_composite_control(menu));
        assert!(!doc.is_focusable(menu));
        assert!(doc.is_focusable(link));
        assert!(!doc.is_focusable(plain));
    }
}
