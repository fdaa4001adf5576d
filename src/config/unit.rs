//! Configuration units: one YAML document per advancement tree

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};

use super::io::write_atomic;

/// File extensions recognized as configuration units
pub const UNIT_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// One configuration unit as read from disk
#[derive(Debug, Clone)]
pub struct ConfigUnit {
    /// Identifier the tree label is derived from (the file stem)
    pub id: String,
    /// Source file, if the unit came from disk
    pub path: Option<PathBuf>,
    /// Parsed document root
    pub document: Mapping,
}

impl ConfigUnit {
    /// Build a unit from YAML text (used for embedded and test units)
    pub fn from_yaml(id: &str, content: &str) -> Result<Self> {
        Ok(Self {
            id: id.to_string(),
            path: None,
            document: parse_document(content)
                .with_context(|| format!("Failed to parse configuration unit '{}'", id))?,
        })
    }

    /// Read a unit file. The identifier is the file stem.
    pub fn read(path: &Path) -> Result<Self> {
        let id = unit_id(path)
            .with_context(|| format!("Not a configuration unit: {}", path.display()))?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration unit: {}", path.display()))?;
        let document = parse_document(&content)
            .with_context(|| format!("Failed to parse configuration unit: {}", path.display()))?;

        Ok(Self {
            id,
            path: Some(path.to_path_buf()),
            document,
        })
    }

    /// Persist a (normalized) document back to this unit's file.
    /// Units without a backing file are left alone.
    pub fn save(&self, document: &Mapping) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = serde_yaml::to_string(document)
            .with_context(|| format!("Failed to serialize configuration unit '{}'", self.id))?;
        write_atomic(path, &content)
    }
}

/// File stem of a `.yml`/`.yaml` path, `None` for anything else
pub fn unit_id(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    if !UNIT_EXTENSIONS.contains(&extension) {
        return None;
    }
    path.file_stem()?.to_str().map(|s| s.to_string())
}

/// An empty file is an empty document; anything else must be a mapping.
fn parse_document(content: &str) -> Result<Mapping> {
    match serde_yaml::from_str::<Value>(content)? {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(map) => Ok(map),
        other => anyhow::bail!(
            "expected a mapping at the document root, found {}",
            value_kind(&other)
        ),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
