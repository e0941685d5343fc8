//! Render relational database schemas as trees, flat listings, or ASCII
//! box-and-arrow diagrams.
//!
//! ```
//! use dbtree::graph::SchemaGraph;
//! use dbtree::render::{render, Format, Shape};
//! use dbtree::schema::{Column, Constraint, Database, Table};
//!
//! let db = Database::new("shop")
//!     .table(Table::new("users").column(Column::new("id", "int")))
//!     .table(
//!         Table::new("orders")
//!             .column(Column::new("user_id", "int"))
//!             .constraint(Constraint::foreign_key(["user_id"], "users", ["id"])),
//!     );
//! let graph = SchemaGraph::build(Some(&db)).unwrap();
//! let text = render(Some(&graph), Format::Text, Shape::Tree).unwrap();
//! assert!(text.starts_with("shop\n└── users"));
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod json_schema;
pub mod render;
pub mod schema;

pub use error::RenderError;
pub use graph::SchemaGraph;
pub use render::{render, render_named, Format, Shape};
pub use schema::{load_database, Database};
