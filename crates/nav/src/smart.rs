//! Smart walker - unit-of-navigation decisions layered on the base walker
//!
//! Three concerns live here:
//! - leaf classification: which subtrees read as one navigation stop
//! - table-mode lifecycle: a stack of table models while the cursor is
//!   inside (possibly nested) tables, with a retained history
//! - stale-cursor recovery: repositioning through the cached ancestor path
//!   when the host mutated the tree under the cursor

use crate::table::{is_table_node, TableModel};
use crate::walker::LinearWalker;
use dom::{ElementKind, NodeId, TreeAccess};

/// Engine tunables
///
/// The character threshold and the breakout kind list were calibrated
/// empirically; treat them as configuration, not invariants.
#[derive(Debug, Clone)]
pub struct NavConfig {
    /// Combined text beyond this many characters is never one unit
    pub max_unit_chars: usize,
    /// Element kinds that force descent instead of leaf treatment
    pub breakout_kinds: Vec<ElementKind>,
    /// Annotation labels eligible for collection folding
    pub foldable_labels: Vec<String>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            max_unit_chars: 1500,
            breakout_kinds: vec![
                ElementKind::Heading,
                ElementKind::List,
                ElementKind::Table,
                ElementKind::FormControl,
                ElementKind::CompositeWidget,
            ],
            foldable_labels: vec!["Link".to_string()],
        }
    }
}

/// Whether a subtree reads as one atomic navigation stop
///
/// Ordered rule set, short-circuit: small-content acceptance first, then
/// capability fallback, size/emptiness guards, the structural breakout
/// override, and the composite-control override.
pub(crate) fn is_smart_leaf<T: TreeAccess>(tree: &T, config: &NavConfig, node: NodeId) -> bool {
    // the traversal root is the container of everything, never a stop
    if tree.parent(node).is_none() {
        return false;
    }
    // a label and its bound control announce as one unit
    if tree.node_tag(node) == Some("LABEL") {
        let children = tree.children_of(node);
        if !children.is_empty() && children.iter().all(|&c| tree.is_basic_leaf(c)) {
            return true;
        }
    }
    if tree.is_basic_leaf(node) {
        return true;
    }
    if !tree.query_supported() {
        // capability gap, not an error: behave like the base walker
        tracing::trace!("[SmartWalker] no structural query support, basic leaf test only");
        return false;
    }
    let text = tree.collapsed_text(node);
    if text.chars().count() > config.max_unit_chars {
        return false;
    }
    if text.is_empty() {
        return false;
    }
    if tree
        .query_kinds(node, &config.breakout_kinds)
        .iter()
        .any(|&hit| tree.has_content(hit))
    {
        return false;
    }
    if tree.is_composite_control(node) && !tree.is_focusable(node) {
        return false;
    }
    true
}

/// Walker with smart unit boundaries, table mode, and cursor repair
#[derive(Debug)]
pub struct SmartWalker {
    walker: LinearWalker,
    config: NavConfig,
    /// Every table model ever entered, retained for summaries
    tables: Vec<TableModel>,
    /// Active nesting, as indices into `tables`; empty means no table mode
    stack: Vec<usize>,
    /// One-shot flag: the next description announces the table shape
    announce_table: bool,
}

impl SmartWalker {
    pub fn new(config: NavConfig) -> Self {
        Self {
            walker: LinearWalker::new(),
            config,
            tables: Vec::new(),
            stack: Vec::new(),
            announce_table: false,
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn current(&self) -> Option<NodeId> {
        self.walker.current()
    }

    pub fn position_at<T: TreeAccess>(&mut self, tree: &T, node: NodeId) {
        self.walker.set_position(tree, node);
    }

    /// Classify a node with the walker's configuration
    pub fn is_leaf_unit<T: TreeAccess>(&self, tree: &T, node: NodeId) -> bool {
        is_smart_leaf(tree, &self.config, node)
    }

    /// Advance to the next navigation unit
    ///
    /// Inside a table this is a cell move; past the last cell, table mode
    /// ends and linear traversal resumes.
    pub fn next<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        if !self.repair_cursor(tree, true) {
            return None;
        }
        if self.in_table() {
            return self.cell_step(tree, true);
        }
        let config = &self.config;
        self.walker
            .next(tree, |t, n| is_smart_leaf(t, config, n))
    }

    /// Move to the previous navigation unit
    pub fn previous<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        if !self.repair_cursor(tree, false) {
            return None;
        }
        if self.in_table() {
            return self.cell_step(tree, false);
        }
        let config = &self.config;
        self.walker
            .previous(tree, |t, n| is_smart_leaf(t, config, n))
    }

    pub fn in_table(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn active_table(&self) -> Option<&TableModel> {
        self.stack.last().map(|&idx| &self.tables[idx])
    }

    pub fn active_table_mut(&mut self) -> Option<&mut TableModel> {
        self.stack.last().map(|&idx| &mut self.tables[idx])
    }

    /// All table models entered over the walker's lifetime
    pub fn table_history(&self) -> &[TableModel] {
        &self.tables
    }

    /// Enter table mode at the nearest enclosing table, or push a nested
    /// table found inside the current cell when already in table mode
    pub fn enter_table<T: TreeAccess>(&mut self, tree: &T) -> bool {
        let Some(current) = self.walker.current() else {
            return false;
        };

        let table_node = if self.in_table() {
            let Some(cell) = self.active_table().and_then(|m| m.current_cell()) else {
                return false;
            };
            let cell_node = cell.node;
            match tree
                .query_kinds(cell_node, &[ElementKind::Table])
                .into_iter()
                .next()
            {
                Some(nested) => nested,
                None => return false,
            }
        } else {
            match nearest_table(tree, current) {
                Some(table) => table,
                None => return false,
            }
        };

        let Ok(mut model) = TableModel::new(tree, table_node) else {
            return false;
        };
        if !model.go_to_containing_cell(tree, current) && !model.go_to_first_cell() {
            return false; // table without cells
        }
        let Some(cell_node) = model.current_cell().map(|c| c.node) else {
            return false;
        };
        tracing::debug!(
            "[SmartWalker] entering table mode ({}x{})",
            model.row_count(),
            model.col_count()
        );
        self.tables.push(model);
        self.stack.push(self.tables.len() - 1);
        self.announce_table = true;
        self.walker.set_position(tree, cell_node);
        true
    }

    /// Leave table mode entirely (history is retained)
    pub fn exit_table(&mut self) -> bool {
        if self.stack.is_empty() {
            return false;
        }
        tracing::debug!("[SmartWalker] leaving table mode");
        self.stack.clear();
        self.announce_table = false;
        true
    }

    /// Run a cursor move against the active table; on success the linear
    /// cursor follows to the target cell's node
    pub fn with_active_table<T, F>(&mut self, tree: &T, action: F) -> Option<NodeId>
    where
        T: TreeAccess,
        F: FnOnce(&mut TableModel) -> bool,
    {
        let idx = *self.stack.last()?;
        if !action(&mut self.tables[idx]) {
            return None;
        }
        let node = self.tables[idx].current_cell()?.node;
        self.walker.set_position(tree, node);
        Some(node)
    }

    /// Pending shape announcement, cleared on read
    pub fn take_table_announcement(&mut self) -> Option<(usize, usize)> {
        if !self.announce_table {
            return None;
        }
        self.announce_table = false;
        let model = self.active_table()?;
        Some((model.row_count(), model.col_count()))
    }

    fn cell_step<T: TreeAccess>(&mut self, tree: &T, forward: bool) -> Option<NodeId> {
        let idx = *self.stack.last()?;
        if let Some(target) = self.tables[idx].neighbor_origin(forward) {
            self.tables[idx].go_to_cell(target);
            let node = self.tables[idx].current_cell()?.node;
            self.walker.set_position(tree, node);
            return Some(node);
        }
        tracing::debug!("[SmartWalker] table edge reached, leaving table mode");
        self.stack.clear();
        self.announce_table = false;
        let config = &self.config;
        if forward {
            self.walker.next(tree, |t, n| is_smart_leaf(t, config, n))
        } else {
            self.walker
                .previous(tree, |t, n| is_smart_leaf(t, config, n))
        }
    }

    /// Validate the cursor before a move, repairing through the cached
    /// ancestor path if the node detached
    ///
    /// Returns false only when no cached ancestor is attached anymore, the
    /// terminal "no content" outcome.
    fn repair_cursor<T: TreeAccess>(&mut self, tree: &T, forward: bool) -> bool {
        let Some(current) = self.walker.current() else {
            return false;
        };
        if tree.is_attached(current) {
            return true;
        }

        let anchor = self
            .walker
            .ancestor_path()
            .iter()
            .rev()
            .copied()
            .find(|&a| tree.is_attached(a));
        let Some(anchor) = anchor else {
            tracing::warn!("[SmartWalker] cursor detached with no attached ancestor left");
            return false;
        };
        tracing::debug!(
            "[SmartWalker] cursor node {current} detached, recovering at ancestor {anchor}"
        );

        // a detached cell invalidates any derived grid
        if self.in_table() {
            self.stack.clear();
            self.announce_table = false;
        }

        self.walker.set_position(tree, anchor);
        // compensating step: the requested move then re-enters the repaired
        // subtree adjacent to the anchor
        let config = &self.config;
        if forward {
            self.walker
                .previous(tree, |t, n| is_smart_leaf(t, config, n));
        } else {
            self.walker.next(tree, |t, n| is_smart_leaf(t, config, n));
        }
        true
    }
}

fn nearest_table<T: TreeAccess>(tree: &T, node: NodeId) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(n) = current {
        if is_table_node(tree, n) {
            return Some(n);
        }
        current = tree.parent(n);
    }
    None
}
