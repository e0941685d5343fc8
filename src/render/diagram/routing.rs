//! Orthogonal arrow routing in lanes to the right of the boxes.

use super::canvas::{Canvas, ARROW_LEFT, BOTTOM_RIGHT, TOP_RIGHT};
use super::layout::TableLayout;
use crate::graph::SchemaGraph;
use ahash::AHashMap;

/// Horizontal distance between neighbouring lanes
pub const LANE_SPACING: usize = 2;
/// Distance from the right border to the first lane
pub const LANE_MARGIN: usize = 3;

/// One foreign key column drawn as an arrow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub from_table: String,
    pub column: String,
    pub to_table: String,
    /// Row of the source column
    pub source_row: usize,
    /// Row of the arrowhead on the target box
    pub target_row: usize,
}

/// Collect the relations of a component, numbered in layout order.
///
/// Foreign key columns whose target lies outside the component, or that are
/// not declared columns of their table, are skipped.
pub fn collect_relations(graph: &SchemaGraph, layouts: &[TableLayout]) -> Vec<Relation> {
    let by_name: AHashMap<&str, &TableLayout> =
        layouts.iter().map(|l| (l.name.as_str(), l)).collect();

    let mut relations = Vec::new();
    for source in layouts {
        for edge in graph.edges.iter().filter(|e| e.from_table == source.name) {
            let Some(target) = by_name.get(edge.to_table.as_str()) else {
                continue;
            };
            for (i, column) in edge.columns.iter().enumerate() {
                if i >= edge.reference_columns.len() {
                    continue;
                }
                let Some(source_row) = source.column_row(column) else {
                    continue;
                };
                relations.push(Relation {
                    from_table: source.name.clone(),
                    column: column.clone(),
                    to_table: target.name.clone(),
                    source_row,
                    target_row: target_row(target, source_row),
                });
            }
        }
    }
    relations
}

/// Vertical midpoint of the target box, nudged off the source row for
/// self-references that start exactly there.
fn target_row(target: &TableLayout, source_row: usize) -> usize {
    let anchor = target.anchor_row();
    if anchor != source_row {
        anchor
    } else if anchor + 1 < target.bottom() {
        anchor + 1
    } else {
        anchor - 1
    }
}

/// Columns needed to the right of the boxes for `count` lanes
pub fn lane_allowance(count: usize) -> usize {
    LANE_MARGIN + LANE_SPACING * count + 1
}

/// Draw relation `index` in its own lane.
///
/// The stub leaves the source row, runs vertically in the lane, and returns
/// to the target row ending in a left-pointing arrowhead next to the border.
pub fn draw_relation(canvas: &mut Canvas, relation: &Relation, index: usize, inner_width: usize) {
    let border_x = inner_width + 1;
    let stub_x = border_x + 1;
    let lane_x = border_x + LANE_MARGIN + LANE_SPACING * index;
    let (from, to) = (relation.source_row, relation.target_row);

    canvas.hline(stub_x, lane_x - 1, from);
    canvas.hline(stub_x + 1, lane_x - 1, to);
    if from.abs_diff(to) > 1 {
        canvas.vline(lane_x, from.min(to) + 1, from.max(to) - 1);
    }

    if to > from {
        canvas.glyph(lane_x, from, TOP_RIGHT);
        canvas.glyph(lane_x, to, BOTTOM_RIGHT);
    } else {
        canvas.glyph(lane_x, from, BOTTOM_RIGHT);
        canvas.glyph(lane_x, to, TOP_RIGHT);
    }
    canvas.glyph(stub_x, to, ARROW_LEFT);
}
