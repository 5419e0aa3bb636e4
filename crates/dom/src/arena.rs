//! Arena-based document tree storage
//!
//! The arena eliminates:
//! - Rc/Arc overhead (16 bytes per pointer)
//! - Recursive function calls (stack overflow risk)
//! - Cache misses (nodes stored sequentially)
//!
//! Handles are indices into a single `Vec<DomNode>`. Detaching a subtree
//! unlinks it from its parent but keeps the nodes in the arena, so stale
//! handles held by a walker stay safe to inspect.

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};
use ahash::AHashMap;

/// Arena allocator for document nodes
///
/// Design:
/// - Single Vec<DomNode> for sequential allocation
/// - HashMap for id-attribute → NodeId lookup (headers="..." resolution)
/// - No Rc/Arc: use indices everywhere
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// id attribute → NodeId lookup
    id_map: AHashMap<String, NodeId>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(256),
            id_map: AHashMap::with_capacity(64),
            root_id: None,
        }
    }

    /// Add a node to the arena, returns its ID
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        if let Some(id_attr) = node.attr("id") {
            self.id_map.insert(id_attr.to_string(), node_id);
        }
        self.nodes.push(node);
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Link a child under a parent, at the end of the child list
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<()> {
        self.get(child_id)?;
        let parent = self.get_mut(parent_id)?;
        parent.children_ids.push(child_id);
        self.get_mut(child_id)?.parent_id = Some(parent_id);
        Ok(())
    }

    /// Unlink a subtree from its parent
    ///
    /// The nodes stay in the arena and their handles stay valid; they simply
    /// stop being reachable from the root. This is how host-side content
    /// replacement is modeled.
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let parent_id = self.get(node_id)?.parent_id;
        if let Some(parent_id) = parent_id {
            let parent = self.get_mut(parent_id)?;
            parent.children_ids.retain(|c| *c != node_id);
            self.get_mut(node_id)?.parent_id = None;
        }
        Ok(())
    }

    /// Whether a node is still reachable from the document root
    pub fn is_attached(&self, node_id: NodeId) -> bool {
        let Some(root_id) = self.root_id else {
            return false;
        };
        let mut current = node_id;
        loop {
            if current == root_id {
                return true;
            }
            match self.nodes.get(current as usize).and_then(|n| n.parent_id) {
                Some(parent_id) => current = parent_id,
                None => return false,
            }
        }
    }

    /// Traverse tree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Find nodes matching predicate
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| {
                if predicate(node) {
                    Some(idx as NodeId)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Find first node matching predicate
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes.iter().enumerate().find_map(|(idx, node)| {
            if predicate(node) {
                Some(idx as NodeId)
            } else {
                None
            }
        })
    }

    /// Find all elements by tag name
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.find(|node| {
            node.node_type == NodeType::Element && node.node_name.eq_ignore_ascii_case(tag)
        })
    }

    /// Find element by ID attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_map.get(id).copied()
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> (DomArena, NodeId, NodeId, NodeId) {
        let mut arena = DomArena::new();
        let root = arena.add_node(DomNode::element("div"));
        let child1 = arena.add_node(DomNode::element("span"));
        let child2 = arena.add_node(DomNode::text("hello"));
        arena.set_root(root).unwrap();
        arena.append_child(root, child1).unwrap();
        arena.append_child(child1, child2).unwrap();
        (arena, root, child1, child2)
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        let node = DomNode::element("div").with_attr("id", "main");
        let id = arena.add_node(node);
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "DIV");
        assert_eq!(arena.find_by_id("main"), Some(id));
    }

    #[test]
    fn test_traverse_df_order() {
        let (arena, root, child1, child2) = small_tree();
        let mut visited = Vec::new();
        arena
            .traverse_df(root, |node| {
                visited.push(node.node_id);
                Ok(())
            })
            .unwrap();
        assert_eq!(visited, vec![root, child1, child2]);
    }

    #[test]
    fn test_detach_breaks_attachment() {
        let (mut arena, root, child1, child2) = small_tree();
        assert!(arena.is_attached(child2));

        arena.detach(child1).unwrap();
        assert!(arena.is_attached(root));
        assert!(!arena.is_attached(child1));
        assert!(!arena.is_attached(child2));

        // Handles survive the detach
        assert_eq!(arena.get(child2).unwrap().node_value, "hello");
    }

    #[test]
    fn test_missing_node_errors() {
        let arena = DomArena::new();
        assert!(matches!(arena.get(7), Err(DomError::NodeNotFound(7))));
    }
}
