//! Core node types for the host document tree
//!
//! Key design principles:
//! 1. Use u32 for node handles (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for child lists (most nodes have few children)
//! 3. Keep the node flat: no back-references beyond parent_id

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Node identifier (index into the arena)
/// u32 allows 4 billion nodes, enough for any document
pub type NodeId = u32;

/// Node type matching the DOM specification numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            3 => Some(NodeType::Text),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            _ => None,
        }
    }
}

/// One node of the host document tree
///
/// Handles into the tree stay valid after a subtree is detached; whether a
/// node is still reachable from the root is a separate question answered by
/// the arena's attachment check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    /// Uppercase tag name for elements, "#text" / "#document" otherwise
    pub node_name: String,
    /// Text content for text nodes, empty for containers
    pub node_value: String,
    pub attributes: HashMap<String, String>,

    /// Host-reported focusability (keyboard reachable)
    pub focusable: bool,
}

impl DomNode {
    /// Create an element node with the given tag
    pub fn element(tag: &str) -> Self {
        Self {
            node_id: 0,
            node_type: NodeType::Element,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name: tag.to_uppercase(),
            node_value: String::new(),
            attributes: HashMap::new(),
            focusable: false,
        }
    }

    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            node_id: 0,
            node_type: NodeType::Text,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name: "#text".to_string(),
            node_value: content.into(),
            attributes: HashMap::new(),
            focusable: false,
        }
    }

    /// Create a document root node
    pub fn document() -> Self {
        Self {
            node_id: 0,
            node_type: NodeType::Document,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name: "#document".to_string(),
            node_value: String::new(),
            attributes: HashMap::new(),
            focusable: false,
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// The explicit ARIA role, if any
    pub fn role(&self) -> Option<&str> {
        self.attr("role")
    }

    /// Builder-style attribute setter for fixture construction
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }
}
