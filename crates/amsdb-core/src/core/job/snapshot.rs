use super::{JobError, JobResult, Section};
use crate::core::models::atoms::Atoms;
use crate::core::settings::Settings;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A job result exported to a document.
///
/// `sections` is keyed by result file (`ams`, `band`, ...) and then by section
/// name. When `path` is left empty, [`JobSnapshot::load`] points it at the
/// directory holding the document so the job log is looked up next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSnapshot {
    pub name: String,
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub engines: Vec<String>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub input_atoms: Option<Atoms>,
    #[serde(default)]
    pub atoms: Option<Atoms>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub gradients: Option<Vec<[f64; 3]>>,
    #[serde(default)]
    pub stress_tensor: Option<[[f64; 3]; 3]>,
    #[serde(default)]
    pub charges: Option<Vec<f64>>,
    #[serde(default)]
    pub sections: BTreeMap<String, BTreeMap<String, Section>>,
    #[serde(default)]
    pub timings: BTreeMap<String, f64>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub runscript: Option<String>,
}

impl JobSnapshot {
    /// Loads a snapshot from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self, JobError> {
        debug!("Loading job snapshot from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| JobError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parse_error = |message: String| JobError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let mut snapshot: JobSnapshot = match extension.as_deref() {
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?
            }
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?
            }
            other => {
                return Err(parse_error(format!(
                    "unsupported extension {:?}, expected json, yaml or yml",
                    other.unwrap_or("")
                )));
            }
        };
        if snapshot.path.as_os_str().is_empty() {
            snapshot.path = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
        }
        Ok(snapshot)
    }
}

impl JobResult for JobSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn ok(&self) -> bool {
        self.ok
    }

    fn engine_names(&self) -> Vec<String> {
        self.engines.clone()
    }

    fn input_atoms(&self) -> Result<Atoms, JobError> {
        self.input_atoms
            .clone()
            .ok_or(JobError::NotAvailable("an input structure"))
    }

    fn atoms(&self) -> Result<Atoms, JobError> {
        self.atoms
            .clone()
            .ok_or(JobError::NotAvailable("a final structure"))
    }

    fn energy(&self) -> Result<f64, JobError> {
        self.energy.ok_or(JobError::NotAvailable("an energy"))
    }

    fn gradients(&self) -> Result<Vec<Vector3<f64>>, JobError> {
        self.gradients
            .as_ref()
            .map(|g| g.iter().map(|v| Vector3::new(v[0], v[1], v[2])).collect())
            .ok_or(JobError::NotAvailable("gradients"))
    }

    fn stress_tensor(&self) -> Result<Matrix3<f64>, JobError> {
        self.stress_tensor
            .map(|r| {
                Matrix3::new(
                    r[0][0], r[0][1], r[0][2], r[1][0], r[1][1], r[1][2], r[2][0], r[2][1],
                    r[2][2],
                )
            })
            .ok_or(JobError::NotAvailable("a stress tensor"))
    }

    fn charges(&self) -> Result<Vec<f64>, JobError> {
        self.charges
            .clone()
            .ok_or(JobError::NotAvailable("atomic charges"))
    }

    fn read_section(&self, file: &str, section: &str) -> Result<Section, JobError> {
        self.sections
            .get(file)
            .and_then(|sections| sections.get(section))
            .map(|s| s.clone().named(section))
            .ok_or_else(|| JobError::SectionNotFound {
                file: file.to_string(),
                section: section.to_string(),
            })
    }

    fn timings(&self) -> Result<BTreeMap<String, f64>, JobError> {
        Ok(self.timings.clone())
    }

    fn input(&self) -> Result<String, JobError> {
        self.input
            .clone()
            .ok_or(JobError::NotAvailable("an input script"))
    }

    fn runscript(&self) -> Result<String, JobError> {
        self.runscript
            .clone()
            .ok_or(JobError::NotAvailable("a run script"))
    }

    fn engine_file(&self) -> Option<PathBuf> {
        self.engines
            .first()
            .map(|engine| self.path.join(format!("{}.rkf", engine)))
    }
}
