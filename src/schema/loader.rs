//! Schema file loading: JSON, YAML or SQL DDL, optionally compressed.

use super::{Database, SchemaBuilder};
use anyhow::{Context, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info};

/// Compression format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// Detect compression format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("bz2" | "bzip2") => Compression::Bzip2,
            Some("xz" | "lzma") => Compression::Xz,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Wrap a reader with the appropriate decompressor
    pub fn wrap_reader<'a>(&self, reader: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => reader,
            Compression::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
            Compression::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
            Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(reader)?),
        })
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Bzip2 => write!(f, "bzip2"),
            Compression::Xz => write!(f, "xz"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

/// Encoding of a schema file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// Normalized schema model as JSON
    Json,
    /// Normalized schema model as YAML
    Yaml,
    /// SQL DDL script (CREATE TABLE / ALTER TABLE / CREATE UNIQUE INDEX)
    Sql,
}

impl SchemaFormat {
    /// Detect the schema format from a path, looking past a compression suffix
    /// (`schema.sql.gz` is SQL). Unknown extensions are treated as SQL.
    pub fn from_path(path: &Path) -> Self {
        let inner = match Compression::from_path(path) {
            Compression::None => path.to_path_buf(),
            _ => path.with_extension(""),
        };

        match inner
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => SchemaFormat::Json,
            Some("yaml" | "yml") => SchemaFormat::Yaml,
            _ => SchemaFormat::Sql,
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaFormat::Json => write!(f, "json"),
            SchemaFormat::Yaml => write!(f, "yaml"),
            SchemaFormat::Sql => write!(f, "sql"),
        }
    }
}

/// Load a schema model from a file.
///
/// SQL scripts take their database name from the file stem (`shop.sql.gz` -> `shop`);
/// `name_override` replaces whatever name the file provides.
pub fn load_database(path: &Path, name_override: Option<&str>) -> Result<Database> {
    let compression = Compression::from_path(path);
    let format = SchemaFormat::from_path(path);
    debug!(path = %path.display(), %compression, %format, "loading schema");

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = compression.wrap_reader(Box::new(file))?;
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut db = match format {
        SchemaFormat::Json => serde_json::from_str::<Database>(&content)
            .with_context(|| format!("invalid JSON schema model in {}", path.display()))?,
        SchemaFormat::Yaml => serde_yaml_ng::from_str::<Database>(&content)
            .with_context(|| format!("invalid YAML schema model in {}", path.display()))?,
        SchemaFormat::Sql => {
            let mut builder = SchemaBuilder::new(default_database_name(path));
            builder.parse_script(&content);
            builder.build()
        }
    };

    if let Some(name) = name_override {
        db.name = name.to_string();
    }

    info!(database = %db.name, tables = db.len(), "schema loaded");
    Ok(db)
}

/// File stem with every extension removed (`dumps/shop.sql.gz` -> `shop`)
fn default_database_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .filter(|n| !n.is_empty())
        .unwrap_or("database")
        .to_string()
}
