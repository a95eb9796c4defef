//! Interface to completed simulation jobs.
//!
//! The job runner itself is external. Everything the rest of the crate needs
//! from a finished job goes through the [`JobResult`] trait; [`snapshot`]
//! provides a serializable implementation for jobs exported to JSON or YAML.

pub mod snapshot;

use crate::core::models::atoms::{Atoms, AtomsError};
use crate::core::settings::Settings;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job does not provide {0}")]
    NotAvailable(&'static str),

    #[error("Section '{section}' not found in file '{file}'")]
    SectionNotFound { file: String, section: String },

    #[error("Key '{key}' not found in section '{section}'")]
    MissingKey { section: String, key: String },

    #[error("Key '{key}' in section '{section}' is not {expected}")]
    WrongType {
        section: String,
        key: String,
        expected: &'static str,
    },

    #[error("Invalid structure: {0}")]
    Structure(#[from] AtomsError),

    #[error("I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse job file '{path}': {message}", path = path.display())]
    Parse { path: PathBuf, message: String },
}

/// One value stored in a section of an engine result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
}

/// A named group of values read from an engine result file (e.g. `History` of `ams`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(skip)]
    name: String,
    #[serde(flatten)]
    values: BTreeMap<String, SectionValue>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: SectionValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub(crate) fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn value(&self, key: &str) -> Result<&SectionValue, JobError> {
        self.values.get(key).ok_or_else(|| JobError::MissingKey {
            section: self.name.clone(),
            key: key.to_string(),
        })
    }

    fn wrong_type(&self, key: &str, expected: &'static str) -> JobError {
        JobError::WrongType {
            section: self.name.clone(),
            key: key.to_string(),
            expected,
        }
    }

    pub fn float(&self, key: &str) -> Result<f64, JobError> {
        match self.value(key)? {
            SectionValue::Float(x) => Ok(*x),
            SectionValue::Int(i) => Ok(*i as f64),
            SectionValue::Floats(v) if v.len() == 1 => Ok(v[0]),
            _ => Err(self.wrong_type(key, "a number")),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64, JobError> {
        match self.value(key)? {
            SectionValue::Int(i) => Ok(*i),
            SectionValue::Ints(v) if v.len() == 1 => Ok(v[0]),
            _ => Err(self.wrong_type(key, "an integer")),
        }
    }

    pub fn floats(&self, key: &str) -> Result<Vec<f64>, JobError> {
        match self.value(key)? {
            SectionValue::Floats(v) => Ok(v.clone()),
            SectionValue::Ints(v) => Ok(v.iter().map(|i| *i as f64).collect()),
            SectionValue::Float(x) => Ok(vec![*x]),
            SectionValue::Int(i) => Ok(vec![*i as f64]),
            _ => Err(self.wrong_type(key, "a numeric array")),
        }
    }
}

/// A completed (or attempted) simulation job.
///
/// Physical quantities are returned in the engine's atomic units: energies in
/// Hartree, gradients in Hartree/Bohr, stress in Hartree/Bohr^D for D periodic
/// dimensions.
pub trait JobResult {
    fn name(&self) -> &str;

    /// Directory holding the job's files (log, result files).
    fn path(&self) -> &Path;

    fn settings(&self) -> &Settings;

    /// Whether the engine reported a successful termination.
    fn ok(&self) -> bool;

    fn engine_names(&self) -> Vec<String>;

    fn input_atoms(&self) -> Result<Atoms, JobError>;

    /// Final structure of the job.
    fn atoms(&self) -> Result<Atoms, JobError>;

    fn energy(&self) -> Result<f64, JobError>;

    fn gradients(&self) -> Result<Vec<Vector3<f64>>, JobError>;

    fn stress_tensor(&self) -> Result<Matrix3<f64>, JobError>;

    fn charges(&self) -> Result<Vec<f64>, JobError>;

    fn read_section(&self, file: &str, section: &str) -> Result<Section, JobError>;

    fn timings(&self) -> Result<BTreeMap<String, f64>, JobError>;

    fn input(&self) -> Result<String, JobError>;

    fn runscript(&self) -> Result<String, JobError>;

    /// Result file of the engine, used to restart a following calculation.
    fn engine_file(&self) -> Option<PathBuf> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Section {
        Section::new("History")
            .with("nEntries", SectionValue::Int(2))
            .with("Energy(1)", SectionValue::Float(-1.5))
            .with("Energies", SectionValue::Floats(vec![0.1, 0.2]))
            .with("Label", SectionValue::Text("x".into()))
    }

    #[test]
    fn typed_accessors_convert_compatible_values() {
        let s = history();
        assert_eq!(s.int("nEntries").unwrap(), 2);
        assert_eq!(s.float("nEntries").unwrap(), 2.0);
        assert_eq!(s.float("Energy(1)").unwrap(), -1.5);
        assert_eq!(s.floats("Energies").unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn missing_key_reports_section_and_key() {
        let err = history().float("Energy(3)").unwrap_err();
        assert!(matches!(
            err,
            JobError::MissingKey { ref section, ref key } if section == "History" && key == "Energy(3)"
        ));
    }

    #[test]
    fn wrong_type_is_reported() {
        assert!(matches!(
            history().float("Label"),
            Err(JobError::WrongType { .. })
        ));
        assert!(matches!(
            history().int("Energy(1)"),
            Err(JobError::WrongType { .. })
        ));
    }

    #[test]
    fn section_deserializes_from_flat_map() {
        let s: Section =
            serde_json::from_str(r#"{"nEntries": 1, "Energy(1)": -0.5, "Total DOS": [1, 2]}"#)
                .unwrap();
        assert_eq!(s.int("nEntries").unwrap(), 1);
        assert_eq!(s.floats("Total DOS").unwrap(), vec![1.0, 2.0]);
    }
}
