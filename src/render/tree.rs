//! Cycle-aware tree projection of a schema graph.
//!
//! Referenced tables sit above the tables that reference them. A table is
//! expanded once; later encounters become leaf markers, and tables without any
//! relationship are collected in an orphan group.

use crate::graph::SchemaGraph;
use crate::schema::Table;
use ahash::{AHashMap, AHashSet};
use tracing::trace;

/// Name of the synthetic node collecting tables outside the hierarchy
pub const ORPHAN_GROUP: &str = "orphan_tables";

/// What a tree node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic node: the database root or the orphan group
    Group,
    /// First and only expanded occurrence of a table
    Table,
    /// Table encountered again while it is still on the current path
    Circular,
    /// Table encountered again after it was fully expanded elsewhere
    AlreadyShown,
}

/// A node of the projected tree
#[derive(Debug, Clone)]
pub struct TreeNode<'a> {
    pub name: String,
    /// Table definition for `Table` nodes
    pub table: Option<&'a Table>,
    pub kind: NodeKind,
    pub children: Vec<TreeNode<'a>>,
}

impl<'a> TreeNode<'a> {
    fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    fn table(name: &str, table: Option<&'a Table>) -> Self {
        Self {
            name: name.to_string(),
            table,
            kind: NodeKind::Table,
            children: Vec::new(),
        }
    }

    fn marker(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            table: None,
            kind,
            children: Vec::new(),
        }
    }

    pub fn is_circular(&self) -> bool {
        self.kind == NodeKind::Circular
    }

    pub fn already_shown(&self) -> bool {
        self.kind == NodeKind::AlreadyShown
    }

    /// Whether this is the orphan group appended under the database root
    pub fn is_orphan_group(&self) -> bool {
        self.kind == NodeKind::Group && self.name == ORPHAN_GROUP
    }

    /// Depth-first iterator over this node and all of its descendants
    pub fn walk(&self) -> impl Iterator<Item = &TreeNode<'a>> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Drops descendants iteratively; nesting depth does not consume stack
impl Drop for TreeNode<'_> {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Work frame of the iterative expansion
struct Frame<'a> {
    name: &'a str,
    node: TreeNode<'a>,
    children: Vec<&'a str>,
    cursor: usize,
}

/// Project the graph into a tree rooted at a synthetic database node.
///
/// Roots are the connected tables without outgoing references, in lexicographic
/// order. Connected tables no root reaches (cycle-only components, cycles above
/// a rooted component) are then expanded from their smallest unvisited table.
/// Isolated tables go into the orphan group, so every table appears at least once.
pub fn build_tree(graph: &SchemaGraph) -> TreeNode<'_> {
    let mut projector = Projector::new(graph);

    let mut root = TreeNode::group(graph.database_name.as_str());
    let connected = projector.connected_tables();
    let starts: Vec<&str> = connected
        .iter()
        .copied()
        .filter(|name| !projector.has_outgoing.contains(name))
        .chain(connected.iter().copied())
        .collect();

    for start in starts {
        if projector.visited.contains(start) {
            continue;
        }
        root.children.push(projector.expand(start));
    }

    let orphans: Vec<TreeNode<'_>> = graph
        .table_names()
        .filter(|name| !projector.visited.contains(*name))
        .map(|name| TreeNode::table(name, graph.table(name)))
        .collect();

    if !orphans.is_empty() {
        trace!(count = orphans.len(), "collected orphan tables");
        let mut group = TreeNode::group(ORPHAN_GROUP);
        group.children = orphans;
        root.children.push(group);
    }

    root
}

struct Projector<'a> {
    graph: &'a SchemaGraph,
    /// Referenced table -> referencing tables, deduplicated, in edge order
    referencing: AHashMap<&'a str, Vec<&'a str>>,
    has_outgoing: AHashSet<&'a str>,
    connected: AHashSet<&'a str>,
    visited: AHashSet<&'a str>,
    processing: AHashSet<&'a str>,
}

impl<'a> Projector<'a> {
    fn new(graph: &'a SchemaGraph) -> Self {
        let mut referencing: AHashMap<&str, Vec<&str>> = AHashMap::new();
        let mut has_outgoing = AHashSet::new();
        let mut connected = AHashSet::new();

        for edge in &graph.edges {
            let (from, to) = (edge.from_table.as_str(), edge.to_table.as_str());
            let children = referencing.entry(to).or_default();
            if !children.contains(&from) {
                children.push(from);
            }
            has_outgoing.insert(from);
            connected.insert(from);
            connected.insert(to);
        }

        Self {
            graph,
            referencing,
            has_outgoing,
            connected,
            visited: AHashSet::new(),
            processing: AHashSet::new(),
        }
    }

    /// Tables touching at least one edge, in lexicographic order
    fn connected_tables(&self) -> Vec<&'a str> {
        self.graph
            .table_names()
            .filter(|name| self.connected.contains(name))
            .collect()
    }

    fn enter(&mut self, name: &'a str) -> Frame<'a> {
        self.visited.insert(name);
        self.processing.insert(name);
        Frame {
            name,
            node: TreeNode::table(name, self.graph.table(name)),
            children: self.referencing.get(name).cloned().unwrap_or_default(),
            cursor: 0,
        }
    }

    /// Expand a not yet visited table with an explicit stack
    fn expand(&mut self, start: &'a str) -> TreeNode<'a> {
        let mut stack = vec![self.enter(start)];

        while let Some(frame) = stack.last_mut() {
            if let Some(&child) = frame.children.get(frame.cursor) {
                frame.cursor += 1;
                if self.processing.contains(child) {
                    frame
                        .node
                        .children
                        .push(TreeNode::marker(child, NodeKind::Circular));
                } else if self.visited.contains(child) {
                    frame
                        .node
                        .children
                        .push(TreeNode::marker(child, NodeKind::AlreadyShown));
                } else {
                    let next = self.enter(child);
                    stack.push(next);
                }
                continue;
            }

            if let Some(done) = stack.pop() {
                self.processing.remove(done.name);
                match stack.last_mut() {
                    Some(parent) => parent.node.children.push(done.node),
                    None => return done.node,
                }
            }
        }

        TreeNode::table(start, self.graph.table(start))
    }
}
