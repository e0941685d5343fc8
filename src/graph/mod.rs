//! Schema graph: one node per table, one edge per foreign key.
//!
//! This module provides:
//! - Graph construction from a [`Database`] model
//! - Connected components and dependency ordering for diagram layout
//! - Cycle detection using Tarjan's SCC algorithm

pub mod analysis;

pub use analysis::{connected_components, dependency_order, find_cycles, Cycle};

use crate::error::RenderError;
use crate::schema::{Database, Table};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A foreign key relationship from the owning table to the referenced table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyEdge {
    /// Table holding the foreign key columns
    pub from_table: String,
    /// Referenced table
    pub to_table: String,
    /// Local columns, index-aligned with `reference_columns`
    pub columns: Vec<String>,
    pub reference_columns: Vec<String>,
}

impl ForeignKeyEdge {
    pub fn is_self_reference(&self) -> bool {
        self.from_table == self.to_table
    }
}

/// Directed schema graph built once per render request.
///
/// Nodes are keyed by table name in a `BTreeMap` so that every iteration is
/// lexicographic. Every edge endpoint exists in `nodes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaGraph {
    pub database_name: String,
    pub nodes: BTreeMap<String, Table>,
    /// Edges in table and constraint declaration order
    pub edges: Vec<ForeignKeyEdge>,
}

impl SchemaGraph {
    /// Build a graph from a schema model.
    ///
    /// Foreign keys whose referenced table is not part of the schema are dropped.
    pub fn build(db: Option<&Database>) -> Result<Self, RenderError> {
        let db = db.ok_or(RenderError::MissingSchema)?;

        let mut nodes: BTreeMap<String, Table> = BTreeMap::new();
        for table in &db.tables {
            if nodes.contains_key(&table.name) {
                warn!(table = %table.name, "duplicate table definition ignored");
                continue;
            }
            nodes.insert(table.name.clone(), table.clone());
        }

        let mut edges = Vec::new();
        let mut seen = ahash::AHashSet::new();
        for table in &db.tables {
            // Only the first definition of a duplicated table contributes edges
            if !seen.insert(table.name.as_str()) {
                continue;
            }

            for fk in table.foreign_keys() {
                let Some(target) = fk.reference_table.as_deref() else {
                    continue;
                };
                if !nodes.contains_key(target) {
                    debug!(
                        from = %table.name,
                        to = %target,
                        "dropping foreign key to unknown table"
                    );
                    continue;
                }
                edges.push(ForeignKeyEdge {
                    from_table: table.name.clone(),
                    to_table: target.to_string(),
                    columns: fk.columns.clone(),
                    reference_columns: fk.reference_columns.clone(),
                });
            }
        }

        debug!(
            database = %db.name,
            tables = nodes.len(),
            edges = edges.len(),
            "built schema graph"
        );

        Ok(Self {
            database_name: db.name.clone(),
            nodes,
            edges,
        })
    }

    /// Get the number of tables in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.nodes.get(name)
    }

    /// Table names in lexicographic order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}
