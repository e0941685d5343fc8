//! Integration tests for the dbtree binary.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn dbtree() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dbtree"))
}

fn create_test_schema(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("shop.sql");
    fs::write(
        &path,
        r#"
CREATE TABLE users (
  id INT PRIMARY KEY,
  email VARCHAR(255) UNIQUE
);

CREATE TABLE orders (
  id INT PRIMARY KEY,
  user_id INT,
  FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE categories (
  id INT PRIMARY KEY,
  parent_id INT,
  FOREIGN KEY (parent_id) REFERENCES categories(id)
);

CREATE TABLE audit_log (
  id INT PRIMARY KEY,
  message TEXT
);
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_render_default_text_tree() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);

    let output = dbtree().arg("render").arg(&schema).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("shop\n"));
    assert!(stdout.contains("└── orders") || stdout.contains("├── orders"));
    assert!(stdout.contains("user_id (INT) → users.id"));
    // Unreachable from the `users` root but related to itself
    assert!(stdout.contains("categories (circular reference)"));
    assert!(stdout.contains("Orphan tables:\n• audit_log"));
    assert!(!stdout.contains("• categories"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("4 tables, 2 relationships"));
    assert!(stderr.contains("categories -> categories (self-reference)"));
}

#[test]
fn test_render_json_flat() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);

    let output = dbtree()
        .args(["render", "--format", "json", "--shape", "flat"])
        .arg(&schema)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["database"], "shop");
    assert_eq!(json["tables"].as_array().unwrap().len(), 4);
    assert_eq!(json["edges"].as_array().unwrap().len(), 2);
}

#[test]
fn test_render_graph_to_file() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);
    let out = dir.path().join("diagram.txt");

    let output = dbtree()
        .args(["render", "--shape", "graph", "--tables", "users,orders", "-o"])
        .arg(&out)
        .arg(&schema)
        .output()
        .unwrap();
    assert!(output.status.success());

    let diagram = fs::read_to_string(&out).unwrap();
    assert!(diagram.contains("users"));
    assert!(diagram.contains("orders"));
    assert!(diagram.contains('◄'));
    assert!(!diagram.contains("categories"));
}

#[test]
fn test_json_graph_is_rejected() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);

    let output = dbtree()
        .args(["render", "--format", "json", "--shape", "graph"])
        .arg(&schema)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("graph shape is only supported with text format"));
}

#[test]
fn test_unknown_format_is_rejected() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);

    let output = dbtree()
        .args(["render", "--format", "xml"])
        .arg(&schema)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown format: xml"));
}

#[test]
fn test_missing_input_file() {
    let output = dbtree()
        .args(["render", "does-not-exist.sql"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("input file does not exist"));
}

#[test]
fn test_config_file_with_flag_override() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);
    let config = dir.path().join("dbtree.yaml");
    fs::write(
        &config,
        "format: json\nshape: tree\nexclude: \"audit_*\"\ndatabase_name: storefront\n",
    )
    .unwrap();

    let output = dbtree()
        .args(["render", "--shape", "flat", "--config"])
        .arg(&config)
        .arg(&schema)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["database"], "storefront");
    assert!(json.get("edges").is_some());
    let names: Vec<&str> = json["tables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["categories", "orders", "users"]);
}

#[test]
fn test_schema_command() {
    let output = dbtree().args(["schema", "tree"]).output().unwrap();
    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(schema["properties"]["tables"].is_object());

    let dir = TempDir::new().unwrap();
    let output = dbtree()
        .args(["schema", "-o"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    for name in ["database", "flat", "tree"] {
        assert!(dir.path().join(format!("{}.schema.json", name)).exists());
    }

    let output = dbtree().args(["schema", "erd"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_completions() {
    let output = dbtree().args(["completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("dbtree"));
}
