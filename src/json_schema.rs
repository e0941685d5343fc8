//! JSON Schema generation for the input model and the JSON outputs.
//!
//! Schemas are generated using the schemars crate and can be exported via the
//! `schema` subcommand.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// Returns all JSON schemas.
/// Uses BTreeMap for deterministic ordering (important for diffable output).
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    // JSON / YAML schema input
    schemas.insert("database", schema_for!(crate::schema::Database));

    // render --format json --shape flat
    schemas.insert("flat", schema_for!(crate::render::FlatJson));

    // render --format json --shape tree
    schemas.insert("tree", schema_for!(crate::render::TreeJson));

    schemas
}

/// Generate a single schema by name.
pub fn get_schema(name: &str) -> Option<Schema> {
    all_schemas().remove(name)
}

/// List all available schema names.
pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}
