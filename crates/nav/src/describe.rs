//! Description records - structured output of a navigation step
//!
//! A step yields an ordered sequence of `Description` records, one per
//! content node entered, assembled from the node's uniquely-entered
//! ancestors. A post-pass folds runs of same-kind records (a block of
//! links) into a single count summary.

use dom::{NodeId, TreeAccess};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of one unit's semantic content
///
/// Fixed shape: absent fields are empty strings, never missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Description {
    /// Labels of the container scopes entered with this node
    pub context: String,
    /// The node's spoken text
    pub text: String,
    /// Current value of a form control, if any
    pub user_value: String,
    /// Role label of the node ("Link", "Button", ...)
    pub annotation: String,
}

impl Description {
    /// Synthetic record carrying only spoken text
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Role label used as the record annotation
fn role_label<T: TreeAccess>(tree: &T, node: NodeId) -> &'static str {
    let tag = tree.node_tag(node);
    let role = tree.node_role(node);
    match (tag, role) {
        (Some("A"), _) | (_, Some("link")) => "Link",
        (Some("BUTTON"), _) | (_, Some("button")) => "Button",
        (Some("INPUT"), _) => match tree.attr(node, "type") {
            Some("checkbox") => "Check box",
            Some("radio") => "Radio button",
            Some("submit") | Some("button") => "Button",
            _ => "Edit text",
        },
        (Some("TEXTAREA"), _) | (_, Some("textbox")) => "Edit text",
        (Some("SELECT"), _) | (_, Some("combobox")) => "Combo box",
        (Some("H1" | "H2" | "H3" | "H4" | "H5" | "H6"), _) | (_, Some("heading")) => "Heading",
        (Some("IMG"), _) | (_, Some("img")) => "Image",
        (Some("LI"), _) | (_, Some("listitem")) => "List item",
        _ => "",
    }
}

/// Context label contributed by an entered container ancestor
fn context_label<T: TreeAccess>(tree: &T, node: NodeId) -> String {
    let tag = tree.node_tag(node);
    let role = tree.node_role(node);
    match (tag, role) {
        (Some("UL" | "OL" | "DL"), _) | (_, Some("list")) => {
            let items = tree
                .children_of(node)
                .iter()
                .filter(|&&c| {
                    tree.node_tag(c) == Some("LI") || tree.node_role(c) == Some("listitem")
                })
                .count();
            format!("List with {items} items")
        }
        (Some("BLOCKQUOTE"), _) => "Blockquote".to_string(),
        (Some("TABLE"), _) | (_, Some("table") | Some("grid")) => "Table".to_string(),
        _ => String::new(),
    }
}

/// Assemble one record for a node from its uniquely-entered ancestors
pub fn description_from_ancestors<T: TreeAccess>(
    tree: &T,
    unique_ancestors: &[NodeId],
    node: NodeId,
) -> Description {
    let mut annotation = role_label(tree, node);
    if annotation.is_empty() {
        // the nearest entered ancestor speaks for a bare text node
        for &ancestor in unique_ancestors.iter().rev() {
            let label = role_label(tree, ancestor);
            if !label.is_empty() {
                annotation = label;
                break;
            }
        }
    }

    let context = unique_ancestors
        .iter()
        .map(|&a| context_label(tree, a))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut text = tree.collapsed_text(node);
    if text.is_empty() {
        text = tree.name(node);
    }

    let user_value = if tree.node_tag(node).is_some() {
        tree.value(node)
    } else {
        String::new()
    };

    Description {
        context,
        text,
        user_value,
        annotation: annotation.to_string(),
    }
}

/// Fold a run of same-annotation records into a count summary
///
/// Applies only when at least 3 records all carry the same non-empty
/// annotation and that label is configured foldable. Folding is
/// opportunistic; anything irregular returns the input untouched.
pub fn fold_collections(records: Vec<Description>, foldable: &[String]) -> Vec<Description> {
    if records.len() < 3 {
        return records;
    }
    let label = records[0].annotation.clone();
    if label.is_empty()
        || !records.iter().all(|r| r.annotation == label)
        || !foldable.iter().any(|f| *f == label)
    {
        return records;
    }

    let mut out = Vec::with_capacity(records.len() + 1);
    out.push(Description::text_only(format!(
        "{} collection with {} items",
        label,
        records.len()
    )));
    for mut record in records {
        record.annotation.clear();
        record.context.clear();
        out.push(record);
    }
    out
}
