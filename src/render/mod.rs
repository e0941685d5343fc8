//! Rendering of a [`SchemaGraph`] as a tree, a flat listing, or an ASCII diagram.
//!
//! This module provides:
//! - Cycle-aware tree projection with an orphan bucket
//! - Text and JSON formatters for the tree and flat shapes
//! - A box-and-arrow diagram layout engine (text only)

mod annotate;
pub mod diagram;
pub(crate) mod json;
mod text;
pub mod tree;

pub use annotate::{column_annotations, column_flags, Annotation, ColumnFlags};
pub use diagram::render_diagram;
pub use json::{ColumnJson, EdgeJson, FlatJson, FlatTableJson, TreeJson, TreeTableJson};
pub use tree::{build_tree, NodeKind, TreeNode, ORPHAN_GROUP};

use crate::error::RenderError;
use crate::graph::SchemaGraph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl FromStr for Format {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            _ => Err(RenderError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Text => write!(f, "text"),
            Format::Json => write!(f, "json"),
        }
    }
}

/// How the schema relationships are structured in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Hierarchy of referenced tables with referencing tables below them
    #[default]
    Tree,
    /// Alphabetical table listing
    Flat,
    /// Box-and-arrow diagram
    Graph,
}

impl FromStr for Shape {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tree" => Ok(Shape::Tree),
            "flat" => Ok(Shape::Flat),
            "graph" | "chart" | "diagram" => Ok(Shape::Graph),
            _ => Err(RenderError::UnknownShape(s.to_string())),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Tree => write!(f, "tree"),
            Shape::Flat => write!(f, "flat"),
            Shape::Graph => write!(f, "graph"),
        }
    }
}

/// Render a schema graph in the requested format and shape.
///
/// The output depends only on the graph and the parameters; calling this twice on
/// the same graph yields identical strings.
pub fn render(
    graph: Option<&SchemaGraph>,
    format: Format,
    shape: Shape,
) -> Result<String, RenderError> {
    let graph = graph.ok_or(RenderError::MissingSchema)?;
    debug!(%format, %shape, tables = graph.len(), "rendering schema");

    match (format, shape) {
        (Format::Text, Shape::Tree) => {
            let tree = build_tree(graph);
            Ok(text::tree_to_text(&tree))
        }
        (Format::Json, Shape::Tree) => {
            let tree = build_tree(graph);
            json::tree_to_json(&tree)
        }
        (Format::Text, Shape::Flat) => Ok(text::flat_to_text(graph)),
        (Format::Json, Shape::Flat) => json::flat_to_json(graph),
        (Format::Text, Shape::Graph) => Ok(render_diagram(graph)),
        (Format::Json, Shape::Graph) => Err(RenderError::GraphRequiresText),
    }
}

/// Render with format and shape given as strings.
///
/// Unknown names fail with [`RenderError::UnsupportedCombination`] naming the
/// offending pair; `json`/`graph` fails with [`RenderError::GraphRequiresText`].
pub fn render_named(
    graph: Option<&SchemaGraph>,
    format: &str,
    shape: &str,
) -> Result<String, RenderError> {
    let unsupported = || RenderError::UnsupportedCombination {
        format: format.to_string(),
        shape: shape.to_string(),
    };
    let parsed_format: Format = format.parse().map_err(|_| unsupported())?;
    let parsed_shape: Shape = shape.parse().map_err(|_| unsupported())?;
    render(graph, parsed_format, parsed_shape)
}
