//! Schema command: export JSON Schemas.

use anyhow::{bail, Context, Result};
use dbtree::json_schema::{all_schemas, get_schema, schema_names};
use std::fs;
use std::path::PathBuf;

pub fn run(name: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let schemas = match name {
        Some(name) => match get_schema(&name) {
            Some(schema) => vec![(name, schema)],
            None => bail!(
                "unknown schema: {}. Valid options: {}",
                name,
                schema_names().join(", ")
            ),
        },
        None => all_schemas()
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    };

    match output {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            for (name, schema) in &schemas {
                let path = dir.join(format!("{}.schema.json", name));
                fs::write(&path, serde_json::to_string_pretty(schema)? + "\n")
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("Schema written to: {}", path.display());
            }
        }
        None if schemas.len() == 1 => {
            println!("{}", serde_json::to_string_pretty(&schemas[0].1)?);
        }
        None => {
            let mut map = serde_json::Map::new();
            for (name, schema) in schemas {
                map.insert(name, serde_json::to_value(schema)?);
            }
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }

    Ok(())
}
