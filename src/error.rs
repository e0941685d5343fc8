//! Error type shared by the graph builder and the renderers.

use thiserror::Error;

/// Errors returned by graph construction and rendering.
///
/// Dangling foreign keys, residual cycles and relations that leave a diagram
/// component are not errors; they are handled by omission or marking.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("schema graph cannot be empty: no schema model was provided")]
    MissingSchema,

    #[error("graph shape is only supported with text format")]
    GraphRequiresText,

    #[error("unsupported format/shape combination: {format}/{shape}")]
    UnsupportedCombination { format: String, shape: String },

    #[error("unknown format: {0}. Valid options: text, json")]
    UnknownFormat(String),

    #[error("unknown shape: {0}. Valid options: tree, flat, graph")]
    UnknownShape(String),

    #[error("failed to marshal JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}
