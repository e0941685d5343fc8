//! Unit tests for the render pipeline: tree projection, formatters and diagrams.

use dbtree::graph::SchemaGraph;
use dbtree::render::{build_tree, render, render_named, Format, NodeKind, Shape};
use dbtree::schema::{Column, Constraint, Database, Table};
use dbtree::RenderError;
use serde_json::Value;

fn graph(db: &Database) -> SchemaGraph {
    SchemaGraph::build(Some(db)).unwrap()
}

fn text_tree(db: &Database) -> String {
    render(Some(&graph(db)), Format::Text, Shape::Tree).unwrap()
}

/// Table with a primary key `id` and one foreign key column per target
fn table(name: &str, refs: &[(&str, &str)]) -> Table {
    let mut t = Table::new(name)
        .column(Column::new("id", "int").not_null())
        .constraint(Constraint::primary_key(["id"]));
    for (column, target) in refs {
        t = t
            .column(Column::new(*column, "int"))
            .constraint(Constraint::foreign_key([*column], *target, ["id"]));
    }
    t
}

fn blog() -> Database {
    Database::new("blog")
        .table(table("users", &[]))
        .table(table("posts", &[("user_id", "users")]))
        .table(table("comments", &[("post_id", "posts"), ("user_id", "users")]))
        .table(table("settings", &[]))
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_mutual_reference_marks_circular() {
        let db = Database::new("company")
            .table(table("departments", &[("manager_id", "employees")]))
            .table(table("employees", &[("dept_id", "departments")]));
        let out = text_tree(&db);

        assert!(out.contains("(circular reference)"));
        assert!(out.contains("departments"));
        assert!(out.contains("employees"));
    }

    #[test]
    fn test_three_table_cycle() {
        let db = Database::new("ring")
            .table(table("a", &[("b_id", "b")]))
            .table(table("b", &[("c_id", "c")]))
            .table(table("c", &[("a_id", "a")]));
        let out = text_tree(&db);

        assert!(out.contains("(circular reference)"));
        for name in ["a", "b", "c"] {
            assert!(out.lines().any(|l| l.ends_with(&format!("── {}", name))));
        }
    }

    #[test]
    fn test_self_reference_shown_once() {
        let db = Database::new("hr").table(table("employees", &[("manager_id", "employees")]));
        let out = text_tree(&db);

        let expanded = out.lines().filter(|l| l.ends_with("── employees")).count();
        assert_eq!(expanded, 1);
        assert!(out.contains("employees (circular reference)"));
    }

    #[test]
    fn test_isolated_table_is_orphan_in_tree_only() {
        let db = Database::new("blog")
            .table(table("users", &[]))
            .table(table("posts", &[("user_id", "users")]))
            .table(table("settings", &[]));
        let g = graph(&db);

        let tree = render(Some(&g), Format::Text, Shape::Tree).unwrap();
        let (main, orphans) = tree.split_once("Orphan tables:").unwrap();
        assert!(!main.contains("settings"));
        assert!(orphans.contains("• settings"));

        let flat = render(Some(&g), Format::Text, Shape::Flat).unwrap();
        assert!(flat.contains("\nsettings\n  - id (int) PRIMARY KEY\n"));
        assert!(!flat.contains("Orphan"));
    }

    #[test]
    fn test_diagram_connects_two_tables() {
        let db = Database::new("shop")
            .table(table("users", &[]))
            .table(table("orders", &[("user_id", "users")]));
        let g = graph(&db);

        let out = render(Some(&g), Format::Text, Shape::Graph).unwrap();
        assert!(out.contains("users"));
        assert!(out.contains("orders"));
        assert!(out.contains('◄'));
        assert!(out.contains("PK id"));
        assert!(out.contains("FK user_id"));

        assert!(matches!(
            render(Some(&g), Format::Json, Shape::Graph),
            Err(RenderError::GraphRequiresText)
        ));
    }
}

mod property_tests {
    use super::*;

    #[test]
    fn test_render_is_deterministic() {
        let g = graph(&blog());
        for format in [Format::Text, Format::Json] {
            for shape in [Shape::Tree, Shape::Flat] {
                let first = render(Some(&g), format, shape).unwrap();
                let second = render(Some(&g), format, shape).unwrap();
                assert_eq!(first, second, "{}/{} not deterministic", format, shape);
            }
        }
        let first = render(Some(&g), Format::Text, Shape::Graph).unwrap();
        assert_eq!(first, render(Some(&g), Format::Text, Shape::Graph).unwrap());
    }

    #[test]
    fn test_every_table_appears_in_tree() {
        let g = graph(&blog());
        let tree = build_tree(&g);
        for name in g.table_names() {
            assert!(
                tree.walk()
                    .any(|n| n.name == name && n.kind == NodeKind::Table),
                "{} missing",
                name
            );
        }
    }

    #[test]
    fn test_multiple_parents_marked_already_shown() {
        let out = text_tree(&blog());
        // comments references both posts and users
        assert_eq!(out.matches("comments (see above)").count(), 1);
    }

    #[test]
    fn test_flat_json_lists_sorted_tables_and_graph_edges() {
        let g = graph(&blog());
        let out = render(Some(&g), Format::Json, Shape::Flat).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        let names: Vec<&str> = value["tables"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["comments", "posts", "settings", "users"]);

        let pairs: Vec<(String, String)> = value["edges"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| {
                (
                    e["from"].as_str().unwrap().to_string(),
                    e["to"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        let expected: Vec<(String, String)> = g
            .edges
            .iter()
            .map(|e| (e.from_table.clone(), e.to_table.clone()))
            .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_tree_json_markers_have_name_only() {
        let db = Database::new("hr").table(table("employees", &[("manager_id", "employees")]));
        let out = render(Some(&graph(&db)), Format::Json, Shape::Tree).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        let marker = &value["tables"][0]["children"][0];
        assert_eq!(marker, &serde_json::json!({"name": "employees"}));
        assert!(value.get("orphans").is_none());
    }

    #[test]
    fn test_tree_json_orphans_separate() {
        let out = render(Some(&graph(&blog())), Format::Json, Shape::Tree).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["database"], "blog");
        assert_eq!(value["orphans"][0]["name"], "settings");
        let roots: Vec<&str> = value["tables"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(roots, vec!["users"]);
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_missing_graph() {
        assert!(matches!(
            render(None, Format::Json, Shape::Flat),
            Err(RenderError::MissingSchema)
        ));
        assert!(matches!(
            SchemaGraph::build(None),
            Err(RenderError::MissingSchema)
        ));
    }

    #[test]
    fn test_invalid_combination_names_values() {
        let g = graph(&blog());
        let err = render_named(Some(&g), "xml", "tree").unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnsupportedCombination { ref format, ref shape }
                if format == "xml" && shape == "tree"
        ));
        assert!(render_named(Some(&g), "json", "flat").is_ok());
    }

    #[test]
    fn test_empty_database_renders() {
        let g = graph(&Database::new("empty"));
        assert_eq!(
            render(Some(&g), Format::Text, Shape::Tree).unwrap(),
            "empty\n"
        );
        assert_eq!(
            render(Some(&g), Format::Text, Shape::Flat).unwrap(),
            "Database: empty\nTables: 0\n\n"
        );
        assert_eq!(render(Some(&g), Format::Text, Shape::Graph).unwrap(), "");
    }
}
