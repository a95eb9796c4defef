use crate::core::models::atoms::Atoms;
use crate::engine::calculator::CalculatorResults;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Column names that cannot be used as attribute keys.
pub const RESERVED_KEYS: &[&str] = &[
    "id",
    "unique_id",
    "ctime",
    "mtime",
    "user",
    "calculator",
    "calculator_parameters",
    "energy",
    "forces",
    "stress",
    "charges",
    "natoms",
    "formula",
    "data",
];

/// One value of a row's attribute bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl KeyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KeyValue::Int(i) => Some(*i as f64),
            KeyValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            KeyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric form used by the number index; booleans count as 0 and 1.
    pub(crate) fn as_number(&self) -> Option<f64> {
        match self {
            KeyValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            other => other.as_f64(),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Bool(b) => write!(f, "{}", b),
            KeyValue::Int(i) => write!(f, "{}", i),
            KeyValue::Float(x) => write!(f, "{}", x),
            KeyValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for KeyValue {
    fn from(value: bool) -> Self {
        KeyValue::Bool(value)
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::Int(value)
    }
}

impl From<f64> for KeyValue {
    fn from(value: f64) -> Self {
        KeyValue::Float(value)
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::Text(value)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Text(value.to_string())
    }
}

/// A database row: structure, reserved columns, attribute bag and data blob.
///
/// `id` is `None` until the row is written. `ctime` is in years since
/// 2000-01-01.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomsRow {
    pub id: Option<i64>,
    pub unique_id: String,
    pub ctime: f64,
    pub user: String,
    pub atoms: Atoms,
    pub calculator: Option<String>,
    pub calculator_parameters: Option<Value>,
    pub energy: Option<f64>,
    pub forces: Option<Vec<[f64; 3]>>,
    pub stress: Option<[f64; 6]>,
    pub charges: Option<Vec<f64>>,
    pub key_value_pairs: BTreeMap<String, KeyValue>,
    pub data: Map<String, Value>,
}

impl AtomsRow {
    pub fn new(atoms: Atoms, user: impl Into<String>, ctime: f64) -> Self {
        Self {
            id: None,
            unique_id: Uuid::new_v4().simple().to_string(),
            ctime,
            user: user.into(),
            atoms,
            calculator: None,
            calculator_parameters: None,
            energy: None,
            forces: None,
            stress: None,
            charges: None,
            key_value_pairs: BTreeMap::new(),
            data: Map::new(),
        }
    }

    /// Copies the calculator results that belong in reserved columns.
    pub fn with_results(mut self, results: &CalculatorResults) -> Self {
        self.energy = results.energy();
        self.forces = results
            .forces()
            .map(|f| f.iter().map(|v| [v.x, v.y, v.z]).collect());
        self.stress = results.stress();
        self.charges = results.charges().map(<[f64]>::to_vec);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<KeyValue>) {
        self.key_value_pairs.insert(key.into(), value.into());
    }

    /// Sets `key` only when a value is present.
    pub fn set_optional<V: Into<KeyValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&KeyValue> {
        self.key_value_pairs.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(KeyValue::as_str)
    }

    pub fn formula(&self) -> String {
        self.atoms.formula()
    }

    pub fn natoms(&self) -> usize {
        self.atoms.len()
    }
}
