//! Plain-text formatters for the tree and flat shapes.

use super::annotate::column_annotations;
use super::tree::{NodeKind, TreeNode};
use crate::graph::SchemaGraph;
use crate::schema::Table;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Render the projected tree with box-drawing connectors.
///
/// The orphan group is printed after the hierarchy as a bulleted section.
pub fn tree_to_text(root: &TreeNode<'_>) -> String {
    let mut out = String::new();
    out.push_str(&root.name);
    out.push('\n');

    let (orphans, tables): (Vec<&TreeNode<'_>>, Vec<&TreeNode<'_>>) =
        root.children.iter().partition(|c| c.is_orphan_group());

    write_tables(&mut out, &tables);

    for group in orphans {
        out.push_str("\nOrphan tables:\n");
        for orphan in &group.children {
            out.push_str("• ");
            out.push_str(&orphan.name);
            out.push('\n');
            if let Some(table) = orphan.table {
                write_columns(&mut out, table, "  ", false);
            }
        }
    }

    out
}

/// Pre-order walk over an explicit stack of (node, prefix, is_last) entries
fn write_tables(out: &mut String, tables: &[&TreeNode<'_>]) {
    let mut stack: Vec<(&TreeNode<'_>, String, bool)> = tables
        .iter()
        .enumerate()
        .rev()
        .map(|(i, node)| (*node, String::new(), i + 1 == tables.len()))
        .collect();

    while let Some((node, prefix, is_last)) = stack.pop() {
        out.push_str(&prefix);
        out.push_str(if is_last { LAST_BRANCH } else { BRANCH });
        out.push_str(&node.name);

        match node.kind {
            NodeKind::Circular => {
                out.push_str(" (circular reference)\n");
                continue;
            }
            NodeKind::AlreadyShown => {
                out.push_str(" (see above)\n");
                continue;
            }
            NodeKind::Table | NodeKind::Group => out.push('\n'),
        }

        let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
        if let Some(table) = node.table {
            write_columns(out, table, &child_prefix, !node.children.is_empty());
        }
        let count = node.children.len();
        for (i, child) in node.children.iter().enumerate().rev() {
            stack.push((child, child_prefix.clone(), i + 1 == count));
        }
    }
}

/// Column lines; the last column only closes the branch when nothing follows it
fn write_columns(out: &mut String, table: &Table, prefix: &str, more_follow: bool) {
    for (i, column) in table.columns.iter().enumerate() {
        let is_last = i + 1 == table.columns.len() && !more_follow;
        out.push_str(prefix);
        out.push_str(if is_last { LAST_BRANCH } else { BRANCH });
        out.push_str(&column_line(table, &column.name, &column.data_type));
        out.push('\n');
    }
}

/// `name (type)` followed by every annotation of the column
fn column_line(table: &Table, name: &str, data_type: &str) -> String {
    let mut line = format!("{} ({})", name, data_type);
    for annotation in column_annotations(table, name) {
        line.push(' ');
        line.push_str(&annotation.to_string());
    }
    line
}

/// Alphabetical listing of every table with its columns
pub fn flat_to_text(graph: &SchemaGraph) -> String {
    let mut out = format!(
        "Database: {}\nTables: {}\n\n",
        graph.database_name,
        graph.len()
    );

    for (name, table) in &graph.nodes {
        out.push_str(name);
        out.push('\n');
        for column in &table.columns {
            out.push_str("  - ");
            out.push_str(&column_line(table, &column.name, &column.data_type));
            out.push('\n');
        }
        out.push('\n');
    }

    out
}
