//! ASCII box-and-arrow diagram of a schema graph.
//!
//! Each connected component is laid out on its own canvas. Tables are stacked
//! top to bottom in dependency order, referenced tables first, and every foreign
//! key column gets an orthogonal arrow in a dedicated lane to the right.

pub mod canvas;
pub mod layout;
pub mod routing;

use crate::graph::{connected_components, dependency_order, SchemaGraph};
use canvas::Canvas;
use routing::{collect_relations, draw_relation, lane_allowance};
use tracing::debug;

/// Render every component of the graph, separated by blank lines
pub fn render_diagram(graph: &SchemaGraph) -> String {
    let blocks: Vec<String> = connected_components(graph)
        .iter()
        .map(|component| render_component(graph, component))
        .collect();

    if blocks.is_empty() {
        return String::new();
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

/// Lay out and draw one connected component
pub fn render_component(graph: &SchemaGraph, component: &[String]) -> String {
    let order = dependency_order(graph, component);
    let tables = order.iter().filter_map(|name| graph.table(name));
    let (layouts, inner_width, height) = layout::stack(tables);

    let relations = collect_relations(graph, &layouts);
    let width = inner_width + 2 + lane_allowance(relations.len());
    debug!(
        tables = layouts.len(),
        relations = relations.len(),
        width,
        height,
        "laying out diagram component"
    );

    let mut canvas = Canvas::new(width, height);
    for table in &layouts {
        table.draw(&mut canvas, inner_width);
    }
    for (index, relation) in relations.iter().enumerate() {
        draw_relation(&mut canvas, relation, index, inner_width);
    }

    canvas.to_string()
}
