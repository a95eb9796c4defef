use super::MetadataError;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Sidecar description of a database: `{"keys": {<key>: {"values": {...}}}, "rows": n, ...}`.
///
/// Fields the library does not know about are kept, in their original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataDocument(Map<String, Value>);

/// Paths of the JSON and YAML sidecars of a database file.
///
/// Only the last extension is replaced: `LiF.v2.db` gets `LiF.v2.json`.
pub fn sidecar_paths(db_path: &Path) -> (PathBuf, PathBuf) {
    (db_path.with_extension("json"), db_path.with_extension("yaml"))
}

fn read_text(path: &Path) -> Result<String, MetadataError> {
    std::fs::read_to_string(path).map_err(|e| MetadataError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_text(path: &Path, content: &[u8]) -> Result<(), MetadataError> {
    std::fs::write(path, content).map_err(|e| MetadataError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

impl MetadataDocument {
    pub fn new() -> Self {
        let mut map = Map::new();
        map.insert("keys".to_string(), Value::Object(Map::new()));
        Self(map)
    }

    pub fn from_value(value: Value) -> Result<Self, MetadataError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(MetadataError::Malformed(
                "metadata document is not a mapping".into(),
            )),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn read_json(path: &Path) -> Result<Self, MetadataError> {
        let content = read_text(path)?;
        let value: Value = serde_json::from_str(&content).map_err(|e| MetadataError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn read_yaml(path: &Path) -> Result<Self, MetadataError> {
        let content = read_text(path)?;
        let value: Value = serde_yaml::from_str(&content).map_err(|e| MetadataError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    /// Writes pretty JSON with four-space indentation.
    pub fn write_json(&self, path: &Path) -> Result<(), MetadataError> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| MetadataError::Serialize(e.to_string()))?;
        buffer.push(b'\n');
        write_text(path, &buffer)
    }

    pub fn write_yaml(&self, path: &Path) -> Result<(), MetadataError> {
        let content =
            serde_yaml::to_string(&self.0).map_err(|e| MetadataError::Serialize(e.to_string()))?;
        write_text(path, content.as_bytes())
    }

    pub fn write_both(&self, json: &Path, yaml: &Path) -> Result<(), MetadataError> {
        self.write_json(json)?;
        self.write_yaml(yaml)
    }

    /// Described values of `key`, if the document has any.
    pub fn values(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0
            .get("keys")?
            .get(key)?
            .get("values")?
            .as_object()
    }

    /// `keys.<key>.values`, created when missing.
    pub fn values_mut(&mut self, key: &str) -> Result<&mut Map<String, Value>, MetadataError> {
        let malformed = |what: String| MetadataError::Malformed(what);
        let keys = self
            .0
            .entry("keys")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| malformed("'keys' is not a mapping".into()))?;
        let entry = keys
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| malformed(format!("'keys.{}' is not a mapping", key)))?;
        entry
            .entry("values")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| malformed(format!("'keys.{}.values' is not a mapping", key)))
    }

    pub fn rows(&self) -> Option<u64> {
        self.0.get("rows").and_then(Value::as_u64)
    }

    pub fn set_rows(&mut self, rows: usize) {
        self.0.insert("rows".to_string(), Value::from(rows as u64));
    }
}
