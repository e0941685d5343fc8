//! Graph analysis algorithms: connected components, dependency ordering and
//! cycle detection.

use super::SchemaGraph;
use ahash::{AHashMap, AHashSet};
use std::collections::{BTreeMap, BTreeSet};

/// A cycle in the graph (list of table names forming the cycle)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub tables: Vec<String>,
}

impl Cycle {
    /// Check if this is a self-referencing cycle (single table)
    pub fn is_self_reference(&self) -> bool {
        self.tables.len() == 1
    }

    /// Format the cycle for display
    pub fn display(&self) -> String {
        if self.is_self_reference() {
            format!("{} -> {} (self-reference)", self.tables[0], self.tables[0])
        } else {
            let mut parts = self.tables.clone();
            parts.push(self.tables[0].clone()); // Complete the cycle
            parts.join(" -> ")
        }
    }
}

/// Partition tables into connected components, treating edges as undirected.
///
/// Tables are visited in lexicographic order and each component lists its
/// tables in depth-first discovery order, so the result is deterministic.
pub fn connected_components(graph: &SchemaGraph) -> Vec<Vec<String>> {
    let mut neighbors: BTreeMap<&str, BTreeSet<&str>> = graph
        .table_names()
        .map(|name| (name, BTreeSet::new()))
        .collect();
    for edge in &graph.edges {
        if let Some(set) = neighbors.get_mut(edge.from_table.as_str()) {
            set.insert(edge.to_table.as_str());
        }
        if let Some(set) = neighbors.get_mut(edge.to_table.as_str()) {
            set.insert(edge.from_table.as_str());
        }
    }

    let mut visited: AHashSet<&str> = AHashSet::new();
    let mut components = Vec::new();

    for start in graph.table_names() {
        if visited.contains(start) {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];
        while let Some(table) = stack.pop() {
            if !visited.insert(table) {
                continue;
            }
            component.push(table.to_string());
            if let Some(adjacent) = neighbors.get(table) {
                // Reverse push keeps the smallest neighbor on top of the stack
                for &next in adjacent.iter().rev() {
                    if !visited.contains(next) {
                        stack.push(next);
                    }
                }
            }
        }
        components.push(component);
    }

    components
}

/// Order a component's tables for vertical stacking using Kahn's algorithm.
///
/// The in-degree of a table is the number of its own outgoing references inside
/// the component, so referenced tables surface before the tables pointing at
/// them. Ties are broken lexicographically. Tables left over by a cycle are
/// appended in their original component order.
pub fn dependency_order(graph: &SchemaGraph, component: &[String]) -> Vec<String> {
    let members: AHashSet<&str> = component.iter().map(String::as_str).collect();
    let mut in_degree: AHashMap<&str, usize> = members.iter().map(|&t| (t, 0)).collect();
    let mut referencing: AHashMap<&str, Vec<&str>> = AHashMap::new();

    for edge in &graph.edges {
        let (from, to) = (edge.from_table.as_str(), edge.to_table.as_str());
        if !members.contains(from) || !members.contains(to) {
            continue;
        }
        *in_degree.entry(from).or_default() += 1;
        referencing.entry(to).or_default().push(from);
    }

    let mut queue: Vec<&str> = component
        .iter()
        .map(String::as_str)
        .filter(|t| in_degree[t] == 0)
        .collect();
    queue.sort_unstable();

    let mut order: Vec<String> = Vec::with_capacity(component.len());
    let mut placed: AHashSet<&str> = AHashSet::new();

    while !queue.is_empty() {
        let table = queue.remove(0);
        order.push(table.to_string());
        placed.insert(table);

        if let Some(dependents) = referencing.get(table) {
            for &dependent in dependents {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push(dependent);
                    }
                }
            }
        }
        queue.sort_unstable();
    }

    for table in component {
        if !placed.contains(table.as_str()) {
            order.push(table.clone());
        }
    }

    order
}

/// Find all cycles in the graph using Tarjan's SCC algorithm.
///
/// Cycles are returned in lexicographic order of their smallest table.
pub fn find_cycles(graph: &SchemaGraph) -> Vec<Cycle> {
    let mut finder = TarjanScc::new(graph);
    finder.run();

    let mut cycles: Vec<Cycle> = finder
        .sccs
        .into_iter()
        .filter(|scc| {
            scc.len() > 1
                || graph
                    .edges
                    .iter()
                    .any(|e| e.is_self_reference() && e.from_table == scc[0])
        })
        .map(|mut tables| {
            tables.sort();
            Cycle { tables }
        })
        .collect();
    cycles.sort_by(|a, b| a.tables.cmp(&b.tables));
    cycles
}

/// Tarjan's Strongly Connected Components algorithm with an explicit work
/// stack, so recursion depth does not grow with schema depth.
struct TarjanScc<'a> {
    names: Vec<&'a str>,
    adjacency: Vec<Vec<usize>>,
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    counter: usize,
    sccs: Vec<Vec<String>>,
}

impl<'a> TarjanScc<'a> {
    fn new(graph: &'a SchemaGraph) -> Self {
        let names: Vec<&str> = graph.table_names().collect();
        let position: AHashMap<&str, usize> =
            names.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        let mut adjacency = vec![Vec::new(); names.len()];
        for edge in &graph.edges {
            if let (Some(&from), Some(&to)) = (
                position.get(edge.from_table.as_str()),
                position.get(edge.to_table.as_str()),
            ) {
                adjacency[from].push(to);
            }
        }

        let n = names.len();
        Self {
            names,
            adjacency,
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            counter: 0,
            sccs: Vec::new(),
        }
    }

    fn run(&mut self) {
        for start in 0..self.names.len() {
            if self.index[start].is_none() {
                self.strongconnect(start);
            }
        }
    }

    fn visit(&mut self, v: usize) {
        self.index[v] = Some(self.counter);
        self.lowlink[v] = self.counter;
        self.counter += 1;
        self.stack.push(v);
        self.on_stack[v] = true;
    }

    fn strongconnect(&mut self, start: usize) {
        // Frames of (node, next successor position)
        let mut work: Vec<(usize, usize)> = vec![(start, 0)];
        self.visit(start);

        while let Some(&(v, pos)) = work.last() {
            if let Some(&w) = self.adjacency[v].get(pos) {
                if let Some(frame) = work.last_mut() {
                    frame.1 += 1;
                }
                match self.index[w] {
                    None => {
                        self.visit(w);
                        work.push((w, 0));
                    }
                    Some(w_index) if self.on_stack[w] => {
                        self.lowlink[v] = self.lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                self.lowlink[parent] = self.lowlink[parent].min(self.lowlink[v]);
            }

            if Some(self.lowlink[v]) == self.index[v] {
                let mut scc = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack[w] = false;
                    scc.push(self.names[w].to_string());
                    if w == v {
                        break;
                    }
                }
                self.sccs.push(scc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ForeignKeyEdge;
    use crate::schema::Table;

    fn graph(tables: &[&str], edges: &[(&str, &str)]) -> SchemaGraph {
        SchemaGraph {
            database_name: "test".to_string(),
            nodes: tables
                .iter()
                .map(|&t| (t.to_string(), Table::new(t)))
                .collect(),
            edges: edges
                .iter()
                .map(|&(from, to)| ForeignKeyEdge {
                    from_table: from.to_string(),
                    to_table: to.to_string(),
                    columns: vec!["fk".to_string()],
                    reference_columns: vec!["id".to_string()],
                })
                .collect(),
        }
    }

    #[test]
    fn test_components_are_undirected_and_ordered() {
        let g = graph(
            &["users", "orders", "settings", "audit", "posts"],
            &[("orders", "users"), ("posts", "users"), ("audit", "settings")],
        );
        let components = connected_components(&g);

        assert_eq!(
            components,
            vec![
                vec!["audit".to_string(), "settings".to_string()],
                vec![
                    "orders".to_string(),
                    "users".to_string(),
                    "posts".to_string()
                ],
            ]
        );
    }

    #[test]
    fn test_dependency_order_referenced_first() {
        let g = graph(
            &["users", "orders", "order_items", "products"],
            &[
                ("orders", "users"),
                ("order_items", "orders"),
                ("order_items", "products"),
            ],
        );
        let component: Vec<String> = connected_components(&g).remove(0);
        let order = dependency_order(&g, &component);

        assert_eq!(order, vec!["products", "users", "orders", "order_items"]);
    }

    #[test]
    fn test_dependency_order_residual_cycle() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "a"), ("c", "a")]);
        let component = connected_components(&g).remove(0);
        let order = dependency_order(&g, &component);

        // Nothing is free of outgoing references: all tables stay in component order
        assert_eq!(order, component);
    }

    #[test]
    fn test_self_reference_cycle() {
        let g = graph(&["categories"], &[("categories", "categories")]);
        let cycles = find_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].is_self_reference());
        assert_eq!(
            cycles[0].display(),
            "categories -> categories (self-reference)"
        );
    }

    #[test]
    fn test_multi_table_cycle() {
        let g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a")],
        );
        let cycles = find_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].tables, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_cycles() {
        let g = graph(&["users", "orders"], &[("orders", "users")]);
        assert!(find_cycles(&g).is_empty());
    }
}
