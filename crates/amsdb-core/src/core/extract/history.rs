use super::{ExtractionError, absent_section};
use crate::core::job::{JobError, JobResult, Section};
use crate::core::units;
use serde_json::{Value, json};
use tracing::{debug, warn};

pub const HISTORY_FILE: &str = "ams";

/// Per-step series of a geometry optimization, converted to eV and Angstrom.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySeries {
    pub energy: Vec<f64>,
    pub max_force: Vec<f64>,
    pub rms_force: Vec<f64>,
    pub max_step: Vec<f64>,
    pub rms_step: Vec<f64>,
    pub max_stress_per_atom: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptimizationHistory {
    Available(HistorySeries),
    Unavailable,
}

const SERIES_NAMES: [&str; 6] = [
    "Energy [eV]",
    "Max force [eV/A]",
    "RMS force [eV/A]",
    "Max step [A]",
    "RMS step [A]",
    "Max stress per atom [eV/A^3]",
];

impl OptimizationHistory {
    pub fn is_available(&self) -> bool {
        matches!(self, OptimizationHistory::Available(_))
    }

    /// Data-blob form: one entry per series, all `null` when unavailable.
    pub fn to_data(&self) -> Value {
        let mut map = serde_json::Map::new();
        match self {
            OptimizationHistory::Available(s) => {
                let series = [
                    &s.energy,
                    &s.max_force,
                    &s.rms_force,
                    &s.max_step,
                    &s.rms_step,
                    &s.max_stress_per_atom,
                ];
                for (name, values) in SERIES_NAMES.iter().zip(series) {
                    map.insert(name.to_string(), json!(values));
                }
            }
            OptimizationHistory::Unavailable => {
                for name in SERIES_NAMES {
                    map.insert(name.to_string(), Value::Null);
                }
            }
        }
        Value::Object(map)
    }
}

fn read_series(section: &Section) -> Result<HistorySeries, ExtractionError> {
    let entries = section.int("nEntries")?.max(0) as usize;
    let energy_k = units::factor("hartree", "eV")?;
    let force_k = units::factor("hartree/bohr", "eV/angstrom")?;
    let length_k = units::factor("bohr", "angstrom")?;
    let stress_k = units::factor("hartree/bohr^3", "eV/angstrom^3")?;

    let column = |key: &str, k: f64| -> Result<Vec<f64>, JobError> {
        (1..=entries)
            .map(|i| section.float(&format!("{}({})", key, i)).map(|v| v * k))
            .collect()
    };

    Ok(HistorySeries {
        energy: column("Energy", energy_k)?,
        max_force: column("maxGrad", force_k)?,
        rms_force: column("rmsGrad", force_k)?,
        max_step: column("maxStep", length_k)?,
        rms_step: column("rmsStep", length_k)?,
        max_stress_per_atom: column("MaxStressEnergyPerAtom", stress_k)?,
    })
}

/// Reads the optimization history of a job.
///
/// A missing section or any missing entry makes the whole history unavailable.
/// An entry of the wrong type is an error.
pub fn history(job: &dyn JobResult) -> Result<OptimizationHistory, ExtractionError> {
    let section = match job.read_section(HISTORY_FILE, "History") {
        Ok(section) => section,
        Err(e) if absent_section(&e) => {
            debug!("Job '{}' has no optimization history", job.name());
            return Ok(OptimizationHistory::Unavailable);
        }
        Err(e) => return Err(e.into()),
    };
    match read_series(&section) {
        Ok(series) => Ok(OptimizationHistory::Available(series)),
        Err(ExtractionError::Job(e @ JobError::MissingKey { .. })) => {
            warn!(
                "Incomplete optimization history for job '{}' ({}), ignoring it",
                job.name(),
                e
            );
            Ok(OptimizationHistory::Unavailable)
        }
        Err(e) => Err(e),
    }
}
