//! Normalized schema model consumed by the graph builder and renderers.
//!
//! This module provides:
//! - Data models for databases, tables, columns and constraints
//! - DDL parsing for extracting a schema from `CREATE TABLE` / `ALTER TABLE` statements
//! - File loading (JSON, YAML, SQL; optionally compressed)
//! - Glob-based table filtering

mod ddl;
mod filter;
mod loader;

pub use ddl::*;
pub use filter::TableFilter;
pub use loader::{load_database, Compression, SchemaFormat};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a table constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Unique,
    Check,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::PrimaryKey => write!(f, "PRIMARY KEY"),
            ConstraintKind::ForeignKey => write!(f, "FOREIGN KEY"),
            ConstraintKind::Unique => write!(f, "UNIQUE"),
            ConstraintKind::Check => write!(f, "CHECK"),
        }
    }
}

/// A table constraint (primary key, foreign key, unique or check)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Constraint {
    pub kind: ConstraintKind,
    /// Local column names covered by the constraint
    #[serde(default)]
    pub columns: Vec<String>,
    /// Referenced table (foreign keys only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_table: Option<String>,
    /// Referenced columns, index-aligned with `columns` (foreign keys only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_columns: Vec<String>,
    /// Predicate text (check constraints only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_expression: Option<String>,
}

impl Constraint {
    pub fn primary_key<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self::with_columns(ConstraintKind::PrimaryKey, columns)
    }

    pub fn unique<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self::with_columns(ConstraintKind::Unique, columns)
    }

    pub fn foreign_key<S: Into<String>, R: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        reference_table: impl Into<String>,
        reference_columns: impl IntoIterator<Item = R>,
    ) -> Self {
        Self {
            kind: ConstraintKind::ForeignKey,
            columns: columns.into_iter().map(Into::into).collect(),
            reference_table: Some(reference_table.into()),
            reference_columns: reference_columns.into_iter().map(Into::into).collect(),
            check_expression: None,
        }
    }

    pub fn check(expression: impl Into<String>) -> Self {
        Self {
            kind: ConstraintKind::Check,
            columns: Vec::new(),
            reference_table: None,
            reference_columns: Vec::new(),
            check_expression: Some(expression.into()),
        }
    }

    fn with_columns<S: Into<String>>(
        kind: ConstraintKind,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            kind,
            columns: columns.into_iter().map(Into::into).collect(),
            reference_table: None,
            reference_columns: Vec::new(),
            check_expression: None,
        }
    }

    /// Whether this constraint covers exactly one column with the given name
    pub fn is_single_column(&self, column: &str) -> bool {
        self.columns.len() == 1 && self.columns[0] == column
    }

    /// Whether the given column is part of this constraint
    pub fn covers(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Column definition within a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    /// Column type as reported by the source, kept verbatim
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            default_value: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Table definition: ordered columns plus constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Iterate over foreign key constraints in declaration order
    pub fn foreign_keys(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.kind == ConstraintKind::ForeignKey)
    }
}

/// Complete database schema as produced by an introspection source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Database {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Get table by name (exact match first, then case-insensitive)
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .or_else(|| self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name)))
    }

    /// Get the number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if schema is empty
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
