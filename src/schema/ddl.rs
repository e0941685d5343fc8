//! SQL DDL parsing for schema extraction.
//!
//! Parses CREATE TABLE, ALTER TABLE and CREATE UNIQUE INDEX statements to extract:
//! - Column definitions with types, nullability and defaults
//! - Primary key, unique, check and foreign key constraints

use super::{Column, Constraint, ConstraintKind, Database, Table};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Regex to extract table name from CREATE TABLE
/// Supports: `table` (MySQL), "table" (PostgreSQL), [table] (MSSQL), table (SQLite/unquoted), schema.table
static CREATE_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*CREATE\s+(?:(?:GLOBAL\s+|LOCAL\s+)?(?:TEMP|TEMPORARY)\s+|UNLOGGED\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?"#)
        .unwrap()
});

/// Regex to extract table name from ALTER TABLE
static ALTER_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*ALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s]+)[\]`"]?"#).unwrap()
});

/// Regex for column definition: name followed by a (possibly multi-word) type
static COLUMN_DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*[\[`"]?([^\[\]`"\s,]+)[\]`"]?\s+(\w+(?:\s+(?:varying|precision|unsigned))?(?:\s*\([^)]*\))?(?:\s+unsigned)?(?:\s*\[\])?)"#).unwrap()
});

/// Regex for PRIMARY KEY constraint with a column list
static PRIMARY_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)PRIMARY\s+KEY\s*(?:CLUSTERED\s+|NONCLUSTERED\s+)?\(([^)]+)\)").unwrap()
});

/// Regex for table-level UNIQUE constraint: UNIQUE [KEY|INDEX] [name] (cols)
static UNIQUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bUNIQUE\s*(?:KEY\s+|INDEX\s+)?(?:[\[`"]?\w+[\]`"]?\s*)?\(([^)]+)\)"#).unwrap()
});

/// Regex for table-level UNIQUE / CHECK clauses (not columns named `unique_code`, `checked`)
static UNIQUE_CLAUSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^UNIQUE\b").unwrap());
static CHECK_CLAUSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^CHECK\b").unwrap());

/// Regex for plain index clauses: [FULLTEXT|SPATIAL] KEY|INDEX name (cols), EXCLUDE ...
static PLAIN_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^(?:(?:(?:FULLTEXT|SPATIAL)\s+)?(?:KEY|INDEX)\s+[^(]*\(([^)]*)\)|EXCLUDE\b)"#).unwrap()
});

/// Regex for inline PRIMARY KEY on column
static INLINE_PRIMARY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").unwrap());

/// Regex for inline UNIQUE on column
static INLINE_UNIQUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bUNIQUE\b").unwrap());

/// Regex for inline REFERENCES on column: REFERENCES table [(col)]
static INLINE_REFERENCES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bREFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?(?:\s*\(([^)]+)\))?"#).unwrap()
});

/// Regex for FOREIGN KEY constraint with optional constraint name and optional
/// referenced column list
static FOREIGN_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:CONSTRAINT\s+[\[`"]?([^\[\]`"\s]+)[\]`"]?\s+)?FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?(?:\s*\(([^)]+)\))?"#,
    )
    .unwrap()
});

/// Regex to strip a leading `CONSTRAINT name` clause
static CONSTRAINT_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*CONSTRAINT\s+[\[`"]?[^\[\]`"\s]+[\]`"]?\s+"#).unwrap()
});

/// Regex to detect NOT NULL constraint
static NOT_NULL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b").unwrap());

/// Regex for DEFAULT value: quoted string, parenthesized expression, or bare token
static DEFAULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bDEFAULT\s+('(?:[^'\\]|\\.|'')*'|\([^)]*\)|[^\s,]+(?:\(\))?)").unwrap()
});

/// Regex for ALTER TABLE ... ADD [CONSTRAINT n] PRIMARY KEY / UNIQUE
static ALTER_ADD_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bADD\s+(?:CONSTRAINT\s+[\[`"]?[^\[\]`"\s]+[\]`"]?\s+)?(PRIMARY\s+KEY|UNIQUE)\s*(?:KEY\s+|INDEX\s+)?(?:[\[`"]?\w+[\]`"]?\s*)?\(([^)]+)\)"#).unwrap()
});

/// Regex for CREATE UNIQUE INDEX statement
/// Matches: CREATE UNIQUE INDEX [IF NOT EXISTS] idx_name ON table [USING method] (columns)
static CREATE_UNIQUE_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^\s*CREATE\s+UNIQUE\s+(?:CLUSTERED\s+|NONCLUSTERED\s+)?INDEX\s+(?:CONCURRENTLY\s+)?(?:IF\s+NOT\s+EXISTS\s+)?[\[`"]?\w+[\]`"]?\s+ON\s+(?:ONLY\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?(\w+)[\]`"]?\s*(?:USING\s+\w+\s*)?\(([^)]+)\)"#,
    )
    .unwrap()
});

/// Statement kinds the builder cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlStatement {
    CreateTable,
    AlterTable,
    CreateUniqueIndex,
    Other,
}

impl DdlStatement {
    /// Classify a single SQL statement
    pub fn classify(stmt: &str) -> Self {
        if CREATE_TABLE_NAME_RE.is_match(stmt) {
            DdlStatement::CreateTable
        } else if ALTER_TABLE_NAME_RE.is_match(stmt) {
            DdlStatement::AlterTable
        } else if CREATE_UNIQUE_INDEX_RE.is_match(stmt) {
            DdlStatement::CreateUniqueIndex
        } else {
            DdlStatement::Other
        }
    }
}

/// Builder for constructing a [`Database`] from DDL statements
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    name: String,
    tables: Vec<Table>,
    /// Lowercased table name -> index into `tables`
    index: AHashMap<String, usize>,
}

impl SchemaBuilder {
    /// Create a new schema builder for the named database
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            index: AHashMap::new(),
        }
    }

    /// Split a SQL script into statements and feed every DDL statement to the builder
    pub fn parse_script(&mut self, sql: &str) {
        for stmt in split_statements(sql) {
            match DdlStatement::classify(&stmt) {
                DdlStatement::CreateTable => {
                    self.parse_create_table(&stmt);
                }
                DdlStatement::AlterTable => {
                    self.parse_alter_table(&stmt);
                }
                DdlStatement::CreateUniqueIndex => {
                    self.parse_create_unique_index(&stmt);
                }
                DdlStatement::Other => {}
            }
        }
    }

    /// Parse a CREATE TABLE statement and add to schema
    pub fn parse_create_table(&mut self, stmt: &str) -> Option<usize> {
        let table_name = extract_create_table_name(stmt)?;

        if let Some(idx) = self.table_index(&table_name) {
            debug!(table = %table_name, "duplicate CREATE TABLE ignored");
            return Some(idx);
        }

        let body = extract_table_body(stmt)?;
        let mut table = Table::new(table_name);
        parse_table_body(&body, &mut table);

        let idx = self.tables.len();
        self.index.insert(table.name.to_lowercase(), idx);
        self.tables.push(table);
        Some(idx)
    }

    /// Parse an ALTER TABLE statement and add constraints to an existing table
    pub fn parse_alter_table(&mut self, stmt: &str) -> Option<usize> {
        let table_name = extract_alter_table_name(stmt)?;
        let idx = self.table_index(&table_name)?;
        let table = &mut self.tables[idx];

        for caps in ALTER_ADD_KEY_RE.captures_iter(stmt) {
            let columns = parse_column_list(caps.get(2)?.as_str());
            let keyword = caps.get(1)?.as_str().to_uppercase();
            let constraint = if keyword.starts_with("PRIMARY") {
                Constraint::primary_key(columns)
            } else {
                Constraint::unique(columns)
            };
            push_constraint(table, constraint);
        }

        for fk in parse_foreign_keys(stmt) {
            push_constraint(table, fk);
        }

        Some(idx)
    }

    /// Parse a CREATE UNIQUE INDEX statement into a Unique constraint
    pub fn parse_create_unique_index(&mut self, stmt: &str) -> Option<usize> {
        let caps = CREATE_UNIQUE_INDEX_RE.captures(stmt)?;
        let table_name = caps.get(1)?.as_str();
        let columns = parse_column_list(caps.get(2)?.as_str());
        let idx = self.table_index(table_name)?;

        push_constraint(&mut self.tables[idx], Constraint::unique(columns));
        Some(idx)
    }

    /// Finalize the schema.
    ///
    /// Foreign key table names are resolved to their declared spelling, and a
    /// reference without a column list (`REFERENCES users`) points at the
    /// referenced table's primary key.
    pub fn build(mut self) -> Database {
        let declared: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();
        let primary_keys: AHashMap<String, Vec<String>> = self
            .tables
            .iter()
            .filter_map(|t| {
                let pk = t
                    .constraints
                    .iter()
                    .find(|c| c.kind == ConstraintKind::PrimaryKey)?;
                Some((t.name.to_lowercase(), pk.columns.clone()))
            })
            .collect();

        for table in &mut self.tables {
            for fk in table
                .constraints
                .iter_mut()
                .filter(|c| c.kind == ConstraintKind::ForeignKey)
            {
                let Some(target) = fk.reference_table.as_mut() else {
                    continue;
                };
                if !declared.iter().any(|name| *name == *target) {
                    if let Some(resolved) = declared
                        .iter()
                        .find(|name| name.eq_ignore_ascii_case(target.as_str()))
                    {
                        *target = resolved.clone();
                    }
                }

                if !fk.reference_columns.is_empty() {
                    continue;
                }
                match primary_keys.get(&target.to_lowercase()) {
                    Some(pk) if pk.len() == fk.columns.len() => {
                        fk.reference_columns = pk.clone();
                    }
                    _ => debug!(
                        table = %table.name,
                        target = %target,
                        "no primary key to resolve implicit reference columns"
                    ),
                }
            }
        }

        Database {
            name: self.name,
            tables: self.tables,
        }
    }

    fn table_index(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }
}

/// Extract table name from CREATE TABLE statement
pub fn extract_create_table_name(stmt: &str) -> Option<String> {
    CREATE_TABLE_NAME_RE
        .captures(stmt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract table name from ALTER TABLE statement
pub fn extract_alter_table_name(stmt: &str) -> Option<String> {
    ALTER_TABLE_NAME_RE
        .captures(stmt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Split a SQL script into statements on `;`, ignoring semicolons inside
/// string literals, quoted identifiers and comments. Comments are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == '\\' && q == '\'' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                current.push(ch);
            }
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                current.push(' ');
            }
            ';' => {
                if !current.trim().is_empty() {
                    statements.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }

    statements
}

/// Extract the body of a CREATE TABLE statement (between first ( and matching ))
fn extract_table_body(stmt: &str) -> Option<String> {
    let bytes = stmt.as_bytes();
    let mut depth = 0;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if b == b'\\' && in_string {
            escape_next = true;
            continue;
        }

        if b == b'\'' {
            in_string = !in_string;
            continue;
        }

        if in_string {
            continue;
        }

        if b == b'(' {
            if depth == 0 {
                start = Some(i + 1);
            }
            depth += 1;
        } else if b == b')' {
            depth -= 1;
            if depth == 0 {
                if let Some(s) = start {
                    return Some(stmt[s..i].to_string());
                }
            }
        }
    }

    None
}

/// Parse the body of a CREATE TABLE to extract columns and constraints
fn parse_table_body(body: &str, table: &mut Table) {
    for part in split_table_body(body) {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }

        let unprefixed = CONSTRAINT_PREFIX_RE.replace(trimmed, "");
        let upper = unprefixed.to_uppercase();

        if is_plain_index(&unprefixed) {
            // Plain indexes carry no constraint semantics
            continue;
        }

        if upper.starts_with("PRIMARY KEY") {
            if let Some(caps) = PRIMARY_KEY_RE.captures(&unprefixed) {
                let columns = parse_column_list(&caps[1]);
                for name in &columns {
                    if let Some(col) = table
                        .columns
                        .iter_mut()
                        .find(|c| c.name.eq_ignore_ascii_case(name))
                    {
                        col.is_nullable = false;
                    }
                }
                push_constraint(table, Constraint::primary_key(columns));
            }
        } else if upper.starts_with("FOREIGN KEY") {
            for fk in parse_foreign_keys(&unprefixed) {
                push_constraint(table, fk);
            }
        } else if UNIQUE_CLAUSE_RE.is_match(&unprefixed) {
            if let Some(caps) = UNIQUE_RE.captures(&unprefixed) {
                push_constraint(table, Constraint::unique(parse_column_list(&caps[1])));
            }
        } else if CHECK_CLAUSE_RE.is_match(&unprefixed) {
            if let Some(expr) = extract_parenthesized(&unprefixed) {
                push_constraint(table, Constraint::check(expr));
            }
        } else {
            parse_column_def(trimmed, table);
        }
    }
}

/// Whether a body part is a plain (non-unique) index definition.
///
/// `KEY idx (col)` and a column named `key VARCHAR(50)` look alike; an index
/// lists column names in its parentheses, a column type only lists numbers.
fn is_plain_index(part: &str) -> bool {
    let Some(caps) = PLAIN_INDEX_RE.captures(part) else {
        return false;
    };
    match caps.get(1) {
        Some(inner) => !inner
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || c == ',' || c.is_whitespace()),
        None => true,
    }
}

/// Parse a column definition, including inline constraints
fn parse_column_def(def: &str, table: &mut Table) {
    let Some(caps) = COLUMN_DEF_RE.captures(def) else {
        return;
    };
    let name = caps[1].to_string();
    let mut column = Column::new(name.clone(), caps[2].trim());

    // Everything after the type carries inline constraints
    let rest = &def[caps.get(0).map(|m| m.end()).unwrap_or(def.len())..];

    if NOT_NULL_RE.is_match(rest) {
        column.is_nullable = false;
    }
    if let Some(default) = DEFAULT_RE.captures(rest) {
        column.default_value = Some(default[1].to_string());
    }

    let is_pk = INLINE_PRIMARY_KEY_RE.is_match(rest);
    if is_pk {
        column.is_nullable = false;
    }
    table.columns.push(column);

    if is_pk {
        push_constraint(table, Constraint::primary_key([name.clone()]));
    }
    if INLINE_UNIQUE_RE.is_match(rest) {
        push_constraint(table, Constraint::unique([name.clone()]));
    }
    if let Some(refs) = INLINE_REFERENCES_RE.captures(rest) {
        let ref_cols = refs
            .get(2)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();
        push_constraint(table, Constraint::foreign_key([name], &refs[1], ref_cols));
    }
}

fn push_constraint(table: &mut Table, constraint: Constraint) {
    if !table.constraints.contains(&constraint) {
        table.constraints.push(constraint);
    }
}

/// Extract the text inside the first balanced pair of parentheses
fn extract_parenthesized(s: &str) -> Option<String> {
    let start = s.find('(')?;
    let mut depth = 0;
    for (i, ch) in s[start..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(s[start + 1..start + i].trim().to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Split table body by commas, respecting nested parentheses
pub fn split_table_body(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for ch in body.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        if ch == '\\' && in_string {
            current.push(ch);
            escape_next = true;
            continue;
        }

        if ch == '\'' {
            in_string = !in_string;
            current.push(ch);
            continue;
        }

        if in_string {
            current.push(ch);
            continue;
        }

        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// Parse FOREIGN KEY constraints from a statement
fn parse_foreign_keys(stmt: &str) -> Vec<Constraint> {
    FOREIGN_KEY_RE
        .captures_iter(stmt)
        .filter_map(|caps| {
            let local = parse_column_list(caps.get(2)?.as_str());
            let ref_table = caps.get(3)?.as_str();
            // Resolved against the referenced primary key in `SchemaBuilder::build`
            let ref_cols = caps
                .get(4)
                .map(|m| parse_column_list(m.as_str()))
                .unwrap_or_default();

            if local.is_empty() || ref_table.is_empty() {
                return None;
            }
            Some(Constraint::foreign_key(local, ref_table, ref_cols))
        })
        .collect()
}

/// Parse a comma-separated column list, stripping quotes (backticks, double quotes, brackets)
pub fn parse_column_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|c| {
            c.trim()
                .trim_matches('`')
                .trim_matches('"')
                .trim_matches('[')
                .trim_matches(']')
                .to_string()
        })
        .filter(|c| !c.is_empty())
        .collect()
}
