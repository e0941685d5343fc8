//! Glob-based table selection applied before graph construction.

use super::Database;
use glob::Pattern;
use tracing::debug;

/// Include/exclude table filter built from comma-separated glob patterns
#[derive(Debug, Default, Clone)]
pub struct TableFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl TableFilter {
    /// Build a filter from comma-separated pattern lists (e.g. `"user*,orders"`).
    ///
    /// Invalid patterns are reported as errors rather than silently ignored.
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self, glob::PatternError> {
        Ok(Self {
            include: parse_patterns(include)?,
            exclude: parse_patterns(exclude)?,
        })
    }

    /// Whether the filter keeps every table
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Whether a table with this name passes the filter
    pub fn matches(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(name));
        included && !self.exclude.iter().any(|p| p.matches(name))
    }

    /// Drop tables that do not pass the filter.
    ///
    /// Foreign keys pointing at removed tables are left in place; the graph
    /// builder drops them as dangling references.
    pub fn apply(&self, db: &mut Database) {
        if self.is_empty() {
            return;
        }
        let before = db.tables.len();
        db.tables.retain(|t| self.matches(&t.name));
        debug!(
            kept = db.tables.len(),
            removed = before - db.tables.len(),
            "applied table filter"
        );
    }
}

fn parse_patterns(list: Option<&str>) -> Result<Vec<Pattern>, glob::PatternError> {
    list.map(|l| {
        l.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Pattern::new)
            .collect()
    })
    .unwrap_or_else(|| Ok(Vec::new()))
}
