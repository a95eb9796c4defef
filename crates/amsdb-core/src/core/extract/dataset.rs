use super::ExtractionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Which split of a fitting dataset a job belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetUsage {
    Training,
    Test,
    #[default]
    None,
}

impl DatasetUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetUsage::Training => "training",
            DatasetUsage::Test => "test",
            DatasetUsage::None => "none",
        }
    }
}

impl fmt::Display for DatasetUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetUsage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "training" => Ok(DatasetUsage::Training),
            "test" => Ok(DatasetUsage::Test),
            "none" => Ok(DatasetUsage::None),
            other => Err(format!("unknown dataset usage '{}'", other)),
        }
    }
}

/// Classifies a job by plain substring search in the manifest texts.
pub fn classify(job_name: &str, full_manifest: &str, training_manifest: &str) -> DatasetUsage {
    match (
        full_manifest.contains(job_name),
        training_manifest.contains(job_name),
    ) {
        (true, true) => DatasetUsage::Training,
        (true, false) => DatasetUsage::Test,
        (false, _) => DatasetUsage::None,
    }
}

fn read_manifest(path: &Path) -> Result<String, ExtractionError> {
    std::fs::read_to_string(path).map_err(|e| ExtractionError::Manifest {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn dataset_usage(
    job_name: &str,
    full_manifest: &Path,
    training_manifest: &Path,
) -> Result<DatasetUsage, ExtractionError> {
    let full = read_manifest(full_manifest)?;
    let training = read_manifest(training_manifest)?;
    let usage = classify(job_name, &full, &training);
    debug!("Job '{}' classified as '{}'", job_name, usage);
    Ok(usage)
}
