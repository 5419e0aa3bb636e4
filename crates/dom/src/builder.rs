//! Fixture loader - build a document tree from a compact JSON form
//!
//! The shape mirrors how tests want to write trees:
//!
//! ```json
//! {
//!   "tag": "div",
//!   "attrs": { "id": "main" },
//!   "children": [
//!     { "tag": "h1", "children": ["Title"] },
//!     { "tag": "p", "children": ["Body text"] }
//!   ]
//! }
//! ```
//!
//! Bare strings are text nodes. The parsed element becomes the single child
//! of an implicit `#document` root.

use crate::access::Document;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId};
use serde_json::Value;

impl Document {
    /// Build a document from the JSON fixture form
    pub fn from_json(fixture: &Value) -> Result<Document> {
        let mut doc = Document::new();
        let root = doc.arena_mut().add_node(DomNode::document());
        doc.arena_mut().set_root(root)?;
        let child = parse_value(&mut doc, fixture)?;
        doc.arena_mut().append_child(root, child)?;
        Ok(doc)
    }
}

fn parse_value(doc: &mut Document, value: &Value) -> Result<NodeId> {
    match value {
        Value::String(text) => Ok(doc.arena_mut().add_node(DomNode::text(text.clone()))),
        Value::Object(obj) => {
            let tag = obj
                .get("tag")
                .and_then(|t| t.as_str())
                .ok_or_else(|| DomError::Fixture("element needs a 'tag'".to_string()))?;

            let mut node = DomNode::element(tag);
            if let Some(attrs) = obj.get("attrs").and_then(|a| a.as_object()) {
                for (name, v) in attrs {
                    let v = v
                        .as_str()
                        .ok_or_else(|| DomError::Fixture(format!("attr '{name}' must be a string")))?;
                    node.attributes.insert(name.clone(), v.to_string());
                }
            }
            if let Some(focusable) = obj.get("focusable").and_then(|f| f.as_bool()) {
                node.focusable = focusable;
            }

            let node_id = doc.arena_mut().add_node(node);
            if let Some(children) = obj.get("children").and_then(|c| c.as_array()) {
                for child in children {
                    let child_id = parse_value(doc, child)?;
                    doc.arena_mut().append_child(node_id, child_id)?;
                }
            }
            Ok(node_id)
        }
        other => Err(DomError::Fixture(format!(
            "unsupported fixture value: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::TreeAccess;

    #[test]
    fn test_from_json_builds_tree() {
        let doc = Document::from_json(&serde_json::json!({
            "tag": "div",
            "attrs": { "id": "main" },
            "children": [
                { "tag": "h1", "children": ["Title"] },
                { "tag": "p", "children": ["Body"] }
            ]
        }))
        .unwrap();

        let div = doc.element_by_id("main").unwrap();
        assert_eq!(doc.node_tag(div), Some("DIV"));
        assert_eq!(doc.children_of(div).len(), 2);
        assert_eq!(doc.collapsed_text(div), "TitleBody");
        assert!(doc.is_attached(div));
    }

    #[test]
    fn test_from_json_rejects_bad_shapes() {
        assert!(Document::from_json(&serde_json::json!(42)).is_err());
        assert!(Document::from_json(&serde_json::json!({ "children": [] })).is_err());
    }
}
