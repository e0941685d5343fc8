//! JSON formatters for the tree and flat shapes.

use super::annotate::column_annotations;
use super::tree::{NodeKind, TreeNode};
use crate::error::RenderError;
use crate::graph::SchemaGraph;
use crate::schema::Table;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// JSON representation of the projected tree
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TreeJson {
    pub database: String,
    pub tables: Vec<TreeTableJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphans: Vec<TreeTableJson>,
}

/// A tree node. Circular and already shown occurrences carry only `name`.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TreeTableJson {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnJson>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeTableJson>,
}

impl Drop for TreeTableJson {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// JSON representation of a column
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ColumnJson {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: String,
    /// `PRIMARY KEY` or `UNIQUE` for single-column keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    /// Referenced `table.column` for foreign key columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// JSON representation of the flat listing
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FlatJson {
    pub database: String,
    pub tables: Vec<FlatTableJson>,
    pub edges: Vec<EdgeJson>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FlatTableJson {
    pub name: String,
    pub columns: Vec<ColumnJson>,
}

/// A foreign key edge, mirrored verbatim from the schema graph
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EdgeJson {
    pub from: String,
    pub to: String,
    pub columns: Vec<String>,
    pub reference_columns: Vec<String>,
}

/// Columns with their key and reference annotations.
///
/// When several annotations apply, the last one of each kind wins.
fn columns_json(table: &Table) -> Vec<ColumnJson> {
    table
        .columns
        .iter()
        .map(|column| {
            let annotations = column_annotations(table, &column.name);
            ColumnJson {
                name: column.name.clone(),
                col_type: column.data_type.clone(),
                constraint: annotations
                    .iter()
                    .filter_map(|a| a.tag())
                    .last()
                    .map(str::to_string),
                reference: annotations.iter().filter_map(|a| a.target()).last(),
            }
        })
        .collect()
}

/// Node without its children; markers carry only the name
fn shell(node: &TreeNode<'_>) -> TreeTableJson {
    match node.kind {
        NodeKind::Circular | NodeKind::AlreadyShown => TreeTableJson {
            name: node.name.clone(),
            columns: None,
            children: Vec::new(),
        },
        NodeKind::Table | NodeKind::Group => TreeTableJson {
            name: node.name.clone(),
            columns: node.table.map(columns_json),
            children: Vec::with_capacity(node.children.len()),
        },
    }
}

struct JsonFrame<'n, 'a> {
    node: &'n TreeNode<'a>,
    json: TreeTableJson,
    cursor: usize,
}

impl<'n, 'a> JsonFrame<'n, 'a> {
    fn new(node: &'n TreeNode<'a>) -> Self {
        Self {
            node,
            json: shell(node),
            cursor: 0,
        }
    }
}

/// Built bottom-up: a node is attached to its parent once all its children are
fn node_json(root: &TreeNode<'_>) -> TreeTableJson {
    let mut stack = vec![JsonFrame::new(root)];

    while let Some(frame) = stack.last_mut() {
        let node = frame.node;
        if let Some(child) = node.children.get(frame.cursor) {
            frame.cursor += 1;
            stack.push(JsonFrame::new(child));
            continue;
        }

        if let Some(done) = stack.pop() {
            match stack.last_mut() {
                Some(parent) => parent.json.children.push(done.json),
                None => return done.json,
            }
        }
    }

    shell(root)
}

pub(crate) fn build_tree_json(root: &TreeNode<'_>) -> TreeJson {
    let mut tables = Vec::new();
    let mut orphans = Vec::new();

    for child in &root.children {
        if child.is_orphan_group() {
            orphans.extend(child.children.iter().map(node_json));
        } else {
            tables.push(node_json(child));
        }
    }

    TreeJson {
        database: root.name.clone(),
        tables,
        orphans,
    }
}

pub(crate) fn build_flat_json(graph: &SchemaGraph) -> FlatJson {
    FlatJson {
        database: graph.database_name.clone(),
        tables: graph
            .nodes
            .iter()
            .map(|(name, table)| FlatTableJson {
                name: name.clone(),
                columns: columns_json(table),
            })
            .collect(),
        edges: graph
            .edges
            .iter()
            .map(|e| EdgeJson {
                from: e.from_table.clone(),
                to: e.to_table.clone(),
                columns: e.columns.clone(),
                reference_columns: e.reference_columns.clone(),
            })
            .collect(),
    }
}

pub fn tree_to_json(root: &TreeNode<'_>) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(&build_tree_json(root))?)
}

pub fn flat_to_json(graph: &SchemaGraph) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(&build_flat_json(graph))?)
}
