//! Column annotations shared by every formatter.

use crate::schema::{ConstraintKind, Table};
use std::fmt;

/// A constraint annotation attached to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation<'a> {
    PrimaryKey,
    Unique,
    /// Foreign key target, matched positionally against the referenced columns
    Reference { table: &'a str, column: &'a str },
}

impl Annotation<'_> {
    /// `PRIMARY KEY` / `UNIQUE` tag, if this is a key annotation
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Annotation::PrimaryKey => Some("PRIMARY KEY"),
            Annotation::Unique => Some("UNIQUE"),
            Annotation::Reference { .. } => None,
        }
    }

    /// `table.column` target, if this is a reference annotation
    pub fn target(&self) -> Option<String> {
        match self {
            Annotation::Reference { table, column } => Some(format!("{}.{}", table, column)),
            _ => None,
        }
    }
}

impl fmt::Display for Annotation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::PrimaryKey => write!(f, "PRIMARY KEY"),
            Annotation::Unique => write!(f, "UNIQUE"),
            Annotation::Reference { table, column } => write!(f, "→ {}.{}", table, column),
        }
    }
}

/// Collect annotations for a column, in constraint declaration order.
///
/// A column that is the sole member of a primary key or unique constraint gets
/// the matching tag. A column at position `i` of a foreign key gets a reference
/// to the `i`-th referenced column, when there is one.
pub fn column_annotations<'a>(table: &'a Table, column: &str) -> Vec<Annotation<'a>> {
    let mut annotations = Vec::new();

    for constraint in &table.constraints {
        match constraint.kind {
            ConstraintKind::PrimaryKey if constraint.is_single_column(column) => {
                annotations.push(Annotation::PrimaryKey);
            }
            ConstraintKind::Unique if constraint.is_single_column(column) => {
                annotations.push(Annotation::Unique);
            }
            ConstraintKind::ForeignKey => {
                let Some(ref_table) = constraint.reference_table.as_deref() else {
                    continue;
                };
                for (i, fk_column) in constraint.columns.iter().enumerate() {
                    if fk_column != column {
                        continue;
                    }
                    if let Some(ref_column) = constraint.reference_columns.get(i) {
                        annotations.push(Annotation::Reference {
                            table: ref_table,
                            column: ref_column,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    annotations
}

/// Key membership of a column, counting composite constraints too
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnFlags {
    pub primary_key: bool,
    pub foreign_key: bool,
    pub unique: bool,
}

impl ColumnFlags {
    /// Diagram label: `[PK] [FK] name [(unique)]`
    pub fn label(&self, name: &str) -> String {
        let mut parts = Vec::with_capacity(4);
        if self.primary_key {
            parts.push("PK");
        }
        if self.foreign_key {
            parts.push("FK");
        }
        parts.push(name);
        if self.unique && !self.primary_key {
            parts.push("(unique)");
        }
        parts.join(" ")
    }
}

/// Key membership of a column in any primary key, foreign key or unique constraint
pub fn column_flags(table: &Table, column: &str) -> ColumnFlags {
    let mut flags = ColumnFlags::default();
    for constraint in table.constraints.iter().filter(|c| c.covers(column)) {
        match constraint.kind {
            ConstraintKind::PrimaryKey => flags.primary_key = true,
            ConstraintKind::ForeignKey => flags.foreign_key = true,
            ConstraintKind::Unique => flags.unique = true,
            ConstraintKind::Check => {}
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Constraint};

    fn memberships() -> Table {
        Table::new("memberships")
            .column(Column::new("id", "int"))
            .column(Column::new("org_id", "int"))
            .column(Column::new("user_id", "int"))
            .constraint(Constraint::primary_key(["id"]))
            .constraint(Constraint::unique(["org_id", "user_id"]))
            .constraint(Constraint::foreign_key(
                ["org_id", "user_id"],
                "org_users",
                ["org_id", "user_id"],
            ))
            .constraint(Constraint::unique(["id"]))
            .constraint(Constraint::foreign_key(["id"], "legacy", Vec::<String>::new()))
    }

    #[test]
    fn test_annotations_in_declaration_order() {
        let table = memberships();
        let id = column_annotations(&table, "id");
        assert_eq!(id, vec![Annotation::PrimaryKey, Annotation::Unique]);

        let user = column_annotations(&table, "user_id");
        assert_eq!(
            user,
            vec![Annotation::Reference {
                table: "org_users",
                column: "user_id"
            }]
        );
        assert_eq!(user[0].to_string(), "→ org_users.user_id");
    }

    #[test]
    fn test_flags_count_composite_membership() {
        let table = memberships();
        let flags = column_flags(&table, "org_id");
        assert!(flags.foreign_key && flags.unique && !flags.primary_key);
        assert_eq!(flags.label("org_id"), "FK org_id (unique)");
        assert_eq!(column_flags(&table, "id").label("id"), "PK FK id");
    }
}
