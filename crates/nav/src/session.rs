//! Navigation session - the command surface of the engine
//!
//! One session per tree being read. Commands mirror what a caller binds to
//! keys: linear moves, table mode entry/exit, intra-table jumps, header
//! queries, and description of whatever the cursor landed on. All indices
//! exposed here are 1-based.

use crate::describe::{description_from_ancestors, fold_collections, Description};
use crate::smart::{NavConfig, SmartWalker};
use crate::table::TableCursor;
use crate::walker::LinearWalker;
use dom::{NodeId, TreeAccess};

/// Stateful reading cursor over one tree
#[derive(Debug)]
pub struct NavigationSession {
    walker: SmartWalker,
}

impl NavigationSession {
    /// Start a session at the tree root with the given configuration
    pub fn new<T: TreeAccess>(tree: &T, start: NodeId, config: NavConfig) -> Self {
        let mut walker = SmartWalker::new(config);
        walker.position_at(tree, start);
        tracing::info!("[NavigationSession] session started at node {start}");
        Self { walker }
    }

    pub fn with_defaults<T: TreeAccess>(tree: &T, start: NodeId) -> Self {
        Self::new(tree, start, NavConfig::default())
    }

    pub fn current(&self) -> Option<NodeId> {
        self.walker.current()
    }

    pub fn in_table(&self) -> bool {
        self.walker.in_table()
    }

    /// Advance to the next unit; `None` means end of content
    pub fn next<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.walker.next(tree)
    }

    /// Move to the previous unit; `None` means start of content
    pub fn previous<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.walker.previous(tree)
    }

    pub fn enter_table<T: TreeAccess>(&mut self, tree: &T) -> bool {
        self.walker.enter_table(tree)
    }

    pub fn exit_table(&mut self) -> bool {
        self.walker.exit_table()
    }

    pub fn go_to_first_cell<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.walker.with_active_table(tree, |m| m.go_to_first_cell())
    }

    pub fn go_to_last_cell<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.walker.with_active_table(tree, |m| m.go_to_last_cell())
    }

    pub fn go_to_row_first_cell<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.walker
            .with_active_table(tree, |m| m.go_to_row_first_cell())
    }

    pub fn go_to_row_last_cell<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.walker
            .with_active_table(tree, |m| m.go_to_row_last_cell())
    }

    pub fn go_to_col_first_cell<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.walker
            .with_active_table(tree, |m| m.go_to_col_first_cell())
    }

    pub fn go_to_col_last_cell<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.walker
            .with_active_table(tree, |m| m.go_to_col_last_cell())
    }

    pub fn previous_row<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.step_row_col(tree, -1, 0)
    }

    pub fn next_row<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.step_row_col(tree, 1, 0)
    }

    pub fn previous_col<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.step_row_col(tree, 0, -1)
    }

    pub fn next_col<T: TreeAccess>(&mut self, tree: &T) -> Option<NodeId> {
        self.step_row_col(tree, 0, 1)
    }

    fn step_row_col<T: TreeAccess>(&mut self, tree: &T, dr: isize, dc: isize) -> Option<NodeId> {
        self.walker.with_active_table(tree, |m| {
            let cur = m.cursor();
            let row = cur.row.checked_add_signed(dr);
            let col = cur.col.checked_add_signed(dc);
            match (row, col) {
                (Some(row), Some(col)) => m.go_to_cell(TableCursor::new(row, col)),
                _ => false,
            }
        })
    }

    /// 1-based row of the current cell, `None` outside table mode
    pub fn row_index(&self) -> Option<usize> {
        self.walker.active_table().map(|m| m.cursor().row + 1)
    }

    /// 1-based column of the current cell, `None` outside table mode
    pub fn col_index(&self) -> Option<usize> {
        self.walker.active_table().map(|m| m.cursor().col + 1)
    }

    pub fn row_count(&self) -> Option<usize> {
        self.walker.active_table().map(|m| m.row_count())
    }

    pub fn col_count(&self) -> Option<usize> {
        self.walker.active_table().map(|m| m.col_count())
    }

    /// Joined text of the headers associated with the current cell's row
    pub fn row_header_text<T: TreeAccess>(&self, tree: &T) -> Option<String> {
        let model = self.walker.active_table()?;
        Some(join_header_text(tree, &model.cell_row_headers(tree)))
    }

    /// Joined text of the headers associated with the current cell's column
    pub fn col_header_text<T: TreeAccess>(&self, tree: &T) -> Option<String> {
        let model = self.walker.active_table()?;
        Some(join_header_text(tree, &model.cell_col_headers(tree)))
    }

    /// Text of the first cell in the current row, a fallback when no real
    /// header markup exists
    pub fn row_header_guess<T: TreeAccess>(&self, tree: &T) -> Option<String> {
        let model = self.walker.active_table()?;
        let cell = model.get_cell_at(TableCursor::new(model.cursor().row, 0))?;
        Some(tree.collapsed_text(cell.node))
    }

    /// Text of the first cell in the current column
    pub fn col_header_guess<T: TreeAccess>(&self, tree: &T) -> Option<String> {
        let model = self.walker.active_table()?;
        let cell = model.get_cell_at(TableCursor::new(0, model.cursor().col))?;
        Some(tree.collapsed_text(cell.node))
    }

    /// Describe the unit under the cursor as an ordered record sequence
    ///
    /// A basic leaf yields a single record; a composite unit is walked
    /// internally, one record per content node, then collection folding
    /// runs over the batch. Table shape and cell-state records are added
    /// while in table mode.
    pub fn current_description<T: TreeAccess>(&mut self, tree: &T) -> Vec<Description> {
        let Some(current) = self.walker.current() else {
            return Vec::new();
        };

        let mut records = if tree.is_basic_leaf(current) {
            vec![description_from_ancestors(tree, &[], current)]
        } else {
            self.describe_subtree(tree, current)
        };

        records = fold_collections(records, &self.walker.config().foldable_labels);

        if let Some((rows, cols)) = self.walker.take_table_announcement() {
            records.insert(0, Description::text_only(format!("{rows} rows, {cols} columns")));
        }

        if self.walker.in_table() {
            if tree.collapsed_text(current).is_empty() {
                records.push(Description::text_only("Empty cell"));
            }
            if self
                .walker
                .active_table()
                .map(|m| m.is_spanned())
                .unwrap_or(false)
            {
                records.push(Description::text_only("Spanned"));
            }
        }

        records
    }

    fn describe_subtree<T: TreeAccess>(&self, tree: &T, unit: NodeId) -> Vec<Description> {
        let mut records = Vec::new();
        let mut probe = LinearWalker::at(tree, unit);
        while let Some(node) = probe.next(tree, |t, n| t.is_basic_leaf(n)) {
            if node != unit && !tree.is_descendant_of_node(node, unit) {
                break;
            }
            let mut entered: Vec<NodeId> = probe
                .unique_ancestors(tree)
                .into_iter()
                .filter(|&a| tree.is_descendant_of_node(a, unit))
                .collect();
            if records.is_empty() {
                // the unit itself was just entered by the outer move
                entered.insert(0, unit);
            }
            records.push(description_from_ancestors(tree, &entered, node));
        }
        if records.is_empty() {
            // no inner content nodes; describe the unit itself
            records.push(description_from_ancestors(tree, &[], unit));
        }
        records
    }
}

fn join_header_text<T: TreeAccess>(tree: &T, headers: &[NodeId]) -> String {
    headers
        .iter()
        .map(|&h| tree.collapsed_text(h))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::Document;

    fn doc_with_table() -> Document {
        Document::from_json(&serde_json::json!({
            "tag": "div",
            "children": [
                { "tag": "p", "children": ["before"] },
                { "tag": "table", "children": [
                    { "tag": "tr", "children": [
                        { "tag": "th", "children": ["Name"] },
                        { "tag": "th", "children": ["Age"] }
                    ] },
                    { "tag": "tr", "children": [
                        { "tag": "td", "children": ["Ada"] },
                        { "tag": "td", "children": ["36"] }
                    ] },
                    { "tag": "tr", "children": [
                        { "tag": "td", "children": ["Grace"] },
                        { "tag": "td", "children": ["45"] }
                    ] }
                ] },
                { "tag": "p", "children": ["after"] }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_one_based_indices() {
        let doc = doc_with_table();
        let root = doc.root_id().unwrap();
        let mut session = NavigationSession::with_defaults(&doc, root);

        session.next(&doc); // "before"
        session.next(&doc); // first table cell or the table unit
        while !session.enter_table(&doc) {
            if session.next(&doc).is_none() {
                panic!("never reached the table");
            }
        }
        assert_eq!(session.row_index(), Some(1));
        assert_eq!(session.col_index(), Some(1));
        assert_eq!(session.row_count(), Some(3));
        assert_eq!(session.col_count(), Some(2));

        assert!(session.next_row(&doc).is_some());
        assert_eq!(session.row_index(), Some(2));
        assert!(session.next_col(&doc).is_some());
        assert_eq!(session.col_index(), Some(2));

        // edges fail without moving
        assert!(session.go_to_last_cell(&doc).is_some());
        assert!(session.next_row(&doc).is_none());
        assert!(session.next_col(&doc).is_none());
        assert_eq!(session.row_index(), Some(3));
        assert_eq!(session.col_index(), Some(2));
    }

    #[test]
    fn test_header_queries() {
        let doc = doc_with_table();
        let root = doc.root_id().unwrap();
        let mut session = NavigationSession::with_defaults(&doc, root);
        while !session.enter_table(&doc) {
            session.next(&doc).unwrap();
        }
        session.go_to_last_cell(&doc).unwrap();

        assert_eq!(session.col_header_text(&doc).as_deref(), Some("Age"));
        assert_eq!(session.row_header_guess(&doc).as_deref(), Some("Grace"));
        assert_eq!(session.col_header_guess(&doc).as_deref(), Some("Age"));
    }

    #[test]
    fn test_outside_table_queries_are_none() {
        let doc = doc_with_table();
        let root = doc.root_id().unwrap();
        let mut session = NavigationSession::with_defaults(&doc, root);
        session.next(&doc);

        assert!(!session.in_table());
        assert_eq!(session.row_index(), None);
        assert_eq!(session.row_count(), None);
        assert!(session.go_to_first_cell(&doc).is_none());
        assert!(session.next_row(&doc).is_none());
        assert!(session.row_header_text(&doc).is_none());
        assert!(!session.exit_table());
    }

    #[test]
    fn test_description_of_simple_unit() {
        let doc = Document::from_json(&serde_json::json!({
            "tag": "div",
            "children": [
                { "tag": "h1", "children": ["Welcome"] }
            ]
        }))
        .unwrap();
        let root = doc.root_id().unwrap();
        let mut session = NavigationSession::with_defaults(&doc, root);
        session.next(&doc).unwrap();

        let records = session.current_description(&doc);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Welcome");
        assert_eq!(records[0].annotation, "Heading");
    }
}
