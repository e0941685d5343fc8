//! Integration tests that verify JSON output matches the generated JSON schemas.

use dbtree::graph::SchemaGraph;
use dbtree::json_schema::all_schemas;
use dbtree::render::{render, Format, Shape};
use dbtree::schema::{Column, Constraint, Database, Table};
use jsonschema::Validator;
use serde_json::Value;

fn load_schema(name: &str) -> Validator {
    let schema = all_schemas()
        .remove(name)
        .unwrap_or_else(|| panic!("No schema named {}", name));
    let schema: Value = serde_json::to_value(schema).expect("Schema is not serializable");
    Validator::new(&schema).expect("Failed to compile schema")
}

fn validate_json(json: &Value, schema_name: &str) {
    let schema = load_schema(schema_name);
    if let Err(error) = schema.validate(json) {
        panic!(
            "JSON output doesn't match {} schema:\n  - {}: {}\n\nOutput was:\n{}",
            schema_name,
            error.instance_path(),
            error,
            serde_json::to_string_pretty(json).unwrap()
        );
    }
}

fn sample_database() -> Database {
    Database::new("library")
        .table(
            Table::new("authors")
                .column(Column::new("id", "int").not_null())
                .column(Column::new("mentor_id", "int"))
                .constraint(Constraint::primary_key(["id"]))
                .constraint(Constraint::foreign_key(["mentor_id"], "authors", ["id"])),
        )
        .table(
            Table::new("books")
                .column(Column::new("id", "int").not_null())
                .column(Column::new("isbn", "char(13)"))
                .column(Column::new("author_id", "int"))
                .constraint(Constraint::primary_key(["id"]))
                .constraint(Constraint::unique(["isbn"]))
                .constraint(Constraint::foreign_key(["author_id"], "authors", ["id"]))
                .constraint(Constraint::check("length(isbn) = 13")),
        )
        .table(Table::new("settings").column(Column::new("key", "text").with_default("'x'")))
}

fn render_json(shape: Shape) -> Value {
    let graph = SchemaGraph::build(Some(&sample_database())).unwrap();
    let out = render(Some(&graph), Format::Json, shape).unwrap();
    serde_json::from_str(&out).unwrap()
}

#[test]
fn test_tree_output_matches_schema() {
    let json = render_json(Shape::Tree);
    assert!(json.get("orphans").is_some());
    validate_json(&json, "tree");
}

#[test]
fn test_flat_output_matches_schema() {
    validate_json(&render_json(Shape::Flat), "flat");
}

#[test]
fn test_database_model_matches_schema() {
    let json = serde_json::to_value(sample_database()).unwrap();
    validate_json(&json, "database");
}

#[test]
fn test_schema_rejects_malformed_output() {
    let schema = load_schema("flat");
    let bad = serde_json::json!({"database": "x", "tables": []});
    assert!(schema.validate(&bad).is_err());
}

#[test]
fn test_all_schemas_are_valid_json_schema() {
    for (name, schema) in all_schemas() {
        let value = serde_json::to_value(&schema).unwrap();
        assert!(value.get("$schema").is_some(), "{} schema lacks $schema", name);
        Validator::new(&value)
            .unwrap_or_else(|e| panic!("{} is not a valid JSON Schema: {}", name, e));
    }
}
