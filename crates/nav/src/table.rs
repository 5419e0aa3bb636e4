//! Table model - a rectangular grid view over a table-shaped subtree
//!
//! The grid is derived once at construction: rows and cells are collected
//! scoped to this table (nested tables excluded), and row/column spans fill
//! the usual occupancy grid. All cursor moves validate against the derived
//! shape and fail as side-effect-free no-ops; navigation commands are
//! frequent and speculative, so nothing here ever panics or errors on an
//! out-of-range request.
//!
//! Indices are 0-based throughout this module; the 1-based human-facing
//! conversion happens at the session surface.

use crate::error::NavError;
use dom::{NodeId, TreeAccess};
use serde::{Deserialize, Serialize};

const TABLE_ROLES: &[&str] = &["table", "grid", "treegrid"];
const CELL_ROLES: &[&str] = &["cell", "gridcell", "columnheader", "rowheader"];

pub(crate) fn is_table_node<T: TreeAccess>(tree: &T, node: NodeId) -> bool {
    tree.node_tag(node) == Some("TABLE")
        || tree
            .node_role(node)
            .map(|r| TABLE_ROLES.contains(&r))
            .unwrap_or(false)
}

fn is_row_node<T: TreeAccess>(tree: &T, node: NodeId) -> bool {
    tree.node_tag(node) == Some("TR") || tree.node_role(node) == Some("row")
}

fn is_cell_node<T: TreeAccess>(tree: &T, node: NodeId) -> bool {
    matches!(tree.node_tag(node), Some("TD") | Some("TH"))
        || tree
            .node_role(node)
            .map(|r| CELL_ROLES.contains(&r))
            .unwrap_or(false)
}

/// Grid coordinates of the table cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableCursor {
    pub row: usize,
    pub col: usize,
}

impl TableCursor {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One table cell with its origin position and span footprint
#[derive(Debug, Clone)]
pub struct TableCell {
    pub node: NodeId,
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub is_header: bool,
    pub scope: Option<String>,
}

/// Derived 2D view over one table subtree
///
/// Owns exactly one cursor; a walker holds a stack of these for nested
/// tables.
#[derive(Debug)]
pub struct TableModel {
    table: NodeId,
    cells: Vec<TableCell>,
    /// Row-major occupancy grid; a spanned cell occupies several positions,
    /// all pointing at the same cell index
    grid: Vec<Vec<Option<usize>>>,
    cursor: TableCursor,
}

impl TableModel {
    /// Derive the grid for a table-shaped subtree
    pub fn new<T: TreeAccess>(tree: &T, table: NodeId) -> Result<Self, NavError> {
        if !is_table_node(tree, table) {
            return Err(NavError::NotATable(table));
        }

        let rows = collect_scoped(tree, table, is_row_node);
        let mut cells: Vec<TableCell> = Vec::new();
        let mut grid: Vec<Vec<Option<usize>>> = vec![Vec::new(); rows.len()];

        for (r, &row_node) in rows.iter().enumerate() {
            let mut c = 0usize;
            for cell_node in collect_scoped(tree, row_node, is_cell_node) {
                // skip grid positions already claimed by spans from above
                while grid[r].get(c).map_or(false, |slot| slot.is_some()) {
                    c += 1;
                }
                let row_span = span_attr(tree, cell_node, "rowspan").min(rows.len() - r);
                let col_span = span_attr(tree, cell_node, "colspan");
                let idx = cells.len();
                cells.push(TableCell {
                    node: cell_node,
                    row: r,
                    col: c,
                    row_span,
                    col_span,
                    is_header: is_header_cell(tree, cell_node),
                    scope: tree.attr(cell_node, "scope").map(|s| s.to_string()),
                });
                for covered in grid.iter_mut().take(r + row_span).skip(r) {
                    if covered.len() < c + col_span {
                        covered.resize(c + col_span, None);
                    }
                    for slot in covered.iter_mut().take(c + col_span).skip(c) {
                        if slot.is_none() {
                            *slot = Some(idx);
                        }
                    }
                }
                c += col_span;
            }
        }

        // normalize to a rectangle
        let width = grid.iter().map(|row| row.len()).max().unwrap_or(0);
        for row in grid.iter_mut() {
            row.resize(width, None);
        }

        Ok(Self {
            table,
            cells,
            grid,
            cursor: TableCursor::default(),
        })
    }

    /// The table subtree this model was derived from
    pub fn table_node(&self) -> NodeId {
        self.table
    }

    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    pub fn col_count(&self) -> usize {
        self.grid.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn cursor(&self) -> TableCursor {
        self.cursor
    }

    /// Move the cursor if a cell exists at the target coordinates
    ///
    /// A position covered by a spanned cell counts as existing. On failure
    /// the cursor is unchanged.
    pub fn go_to_cell(&mut self, target: TableCursor) -> bool {
        let exists = self
            .grid
            .get(target.row)
            .and_then(|row| row.get(target.col))
            .map_or(false, |slot| slot.is_some());
        if exists {
            self.cursor = target;
        }
        exists
    }

    pub fn go_to_first_cell(&mut self) -> bool {
        let target = self.scan_origins(true).next();
        match target {
            Some(target) => self.go_to_cell(target),
            None => false,
        }
    }

    pub fn go_to_last_cell(&mut self) -> bool {
        let target = self.scan_origins(false).next();
        match target {
            Some(target) => self.go_to_cell(target),
            None => false,
        }
    }

    pub fn go_to_row_first_cell(&mut self) -> bool {
        match self.scan_row(self.cursor.row, true) {
            Some(target) => self.go_to_cell(target),
            None => false,
        }
    }

    pub fn go_to_row_last_cell(&mut self) -> bool {
        match self.scan_row(self.cursor.row, false) {
            Some(target) => self.go_to_cell(target),
            None => false,
        }
    }

    pub fn go_to_col_first_cell(&mut self) -> bool {
        match self.scan_col(self.cursor.col, true) {
            Some(target) => self.go_to_cell(target),
            None => false,
        }
    }

    pub fn go_to_col_last_cell(&mut self) -> bool {
        match self.scan_col(self.cursor.col, false) {
            Some(target) => self.go_to_cell(target),
            None => false,
        }
    }

    /// Position the cursor on the cell containing the given node
    pub fn go_to_containing_cell<T: TreeAccess>(&mut self, tree: &T, node: NodeId) -> bool {
        let target = self
            .cells
            .iter()
            .find(|cell| cell.node == node || tree.is_descendant_of_node(node, cell.node))
            .map(|cell| TableCursor::new(cell.row, cell.col));
        match target {
            Some(target) => self.go_to_cell(target),
            None => false,
        }
    }

    /// Read-only cell lookup, used for header guessing without moving the
    /// cursor
    pub fn get_cell_at(&self, coord: TableCursor) -> Option<&TableCell> {
        let idx = (*self.grid.get(coord.row)?.get(coord.col)?)?;
        self.cells.get(idx)
    }

    pub fn current_cell(&self) -> Option<&TableCell> {
        self.get_cell_at(self.cursor)
    }

    /// Whether the current cell's footprint exceeds one grid position
    pub fn is_spanned(&self) -> bool {
        self.current_cell()
            .map(|cell| cell.row_span > 1 || cell.col_span > 1)
            .unwrap_or(false)
    }

    /// Origin position of the next/previous cell in reading order
    pub(crate) fn neighbor_origin(&self, forward: bool) -> Option<TableCursor> {
        let cols = self.col_count();
        if cols == 0 {
            return None;
        }
        let total = self.row_count() * cols;
        let mut idx = self.cursor.row * cols + self.cursor.col;
        loop {
            if forward {
                idx += 1;
                if idx >= total {
                    return None;
                }
            } else {
                if idx == 0 {
                    return None;
                }
                idx -= 1;
            }
            let (r, c) = (idx / cols, idx % cols);
            if let Some(cell_idx) = self.grid[r][c] {
                let cell = &self.cells[cell_idx];
                // only stop at a cell's origin so spans are visited once
                if cell.row == r && cell.col == c {
                    return Some(TableCursor::new(r, c));
                }
            }
        }
    }

    /// Ordered header nodes associated with the current cell's row
    pub fn cell_row_headers<T: TreeAccess>(&self, tree: &T) -> Vec<NodeId> {
        self.cell_headers(tree, true)
    }

    /// Ordered header nodes associated with the current cell's column
    pub fn cell_col_headers<T: TreeAccess>(&self, tree: &T) -> Vec<NodeId> {
        self.cell_headers(tree, false)
    }

    fn cell_headers<T: TreeAccess>(&self, tree: &T, want_row: bool) -> Vec<NodeId> {
        let Some(cell) = self.current_cell() else {
            return Vec::new();
        };
        let (cell_row, cell_col, cell_node) = (cell.row, cell.col, cell.node);

        // explicit header markup takes precedence over positional inference
        if let Some(refs) = tree.attr(cell_node, "headers") {
            let mut out = Vec::new();
            for id in refs.split_whitespace() {
                let Some(node) = tree.element_by_id(id) else {
                    continue;
                };
                let Some(header) = self.cells.iter().find(|c| c.node == node) else {
                    continue;
                };
                let is_row_assoc = header.row == cell_row;
                if is_row_assoc == want_row {
                    out.push(header.node);
                }
            }
            if !out.is_empty() || !refs.trim().is_empty() {
                return out;
            }
        }

        // positional: header cells to the left in the row, or above in the
        // column, honoring explicit scope when present
        self.cells
            .iter()
            .filter(|h| h.is_header && h.node != cell_node)
            .filter(|h| {
                if want_row {
                    h.row == cell_row
                        && h.col < cell_col
                        && h.scope.as_deref() != Some("col")
                        && tree.node_role(h.node) != Some("columnheader")
                } else {
                    h.col == cell_col
                        && h.row < cell_row
                        && h.scope.as_deref() != Some("row")
                        && tree.node_role(h.node) != Some("rowheader")
                }
            })
            .map(|h| h.node)
            .collect()
    }

    fn scan_row(&self, row: usize, forward: bool) -> Option<TableCursor> {
        let slots = self.grid.get(row)?;
        let pos = if forward {
            slots.iter().position(|s| s.is_some())?
        } else {
            slots.iter().rposition(|s| s.is_some())?
        };
        Some(TableCursor::new(row, pos))
    }

    fn scan_col(&self, col: usize, forward: bool) -> Option<TableCursor> {
        let occupied = |r: &Vec<Option<usize>>| r.get(col).map_or(false, |s| s.is_some());
        let row = if forward {
            self.grid.iter().position(occupied)?
        } else {
            self.grid.iter().rposition(occupied)?
        };
        Some(TableCursor::new(row, col))
    }

    fn scan_origins(&self, forward: bool) -> impl Iterator<Item = TableCursor> + '_ {
        let cols = self.col_count();
        let total = self.row_count() * cols;
        let indices: Vec<usize> = if forward {
            (0..total).collect()
        } else {
            (0..total).rev().collect()
        };
        indices.into_iter().filter_map(move |idx| {
            let (r, c) = (idx / cols, idx % cols);
            let cell_idx = self.grid[r][c]?;
            let cell = &self.cells[cell_idx];
            (cell.row == r && cell.col == c).then(|| TableCursor::new(r, c))
        })
    }
}

fn span_attr<T: TreeAccess>(tree: &T, node: NodeId, name: &str) -> usize {
    tree.attr(node, name)
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(1)
}

fn is_header_cell<T: TreeAccess>(tree: &T, node: NodeId) -> bool {
    tree.node_tag(node) == Some("TH")
        || matches!(
            tree.node_role(node),
            Some("columnheader") | Some("rowheader")
        )
}

/// Matching descendants of `scope`, document order, without descending into
/// matches or into nested tables
fn collect_scoped<T, P>(tree: &T, scope: NodeId, pred: P) -> Vec<NodeId>
where
    T: TreeAccess,
    P: Fn(&T, NodeId) -> bool,
{
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = tree.children_of(scope).into_iter().rev().collect();
    while let Some(n) = stack.pop() {
        if is_table_node(tree, n) {
            continue; // nested table owns its own rows and cells
        }
        if pred(tree, n) {
            out.push(n);
            continue;
        }
        let mut children = tree.children_of(n);
        children.reverse();
        stack.extend(children);
    }
    out
}
