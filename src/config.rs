//! YAML configuration for the render command.
//!
//! ```yaml
//! format: json
//! shape: flat
//! tables: "user*,order*"
//! exclude: "*_audit"
//! database_name: shop
//! ```

use crate::render::{Format, Shape};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Render settings read from a YAML file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub format: Option<Format>,
    pub shape: Option<Shape>,
    /// Comma-separated glob patterns of tables to keep
    pub tables: Option<String>,
    /// Comma-separated glob patterns of tables to drop
    pub exclude: Option<String>,
    pub database_name: Option<String>,
}

impl RenderConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: RenderConfig = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Fill unset fields from `other`; values already set here win
    pub fn or(self, other: RenderConfig) -> RenderConfig {
        RenderConfig {
            format: self.format.or(other.format),
            shape: self.shape.or(other.shape),
            tables: self.tables.or(other.tables),
            exclude: self.exclude.or(other.exclude),
            database_name: self.database_name.or(other.database_name),
        }
    }
}
