//! Extraction of stored quantities from a finished job.
//!
//! Expected absences (no log, no band structure, no optimization history, no
//! recognizable space group) are reported as sentinel values, never as errors.

pub mod dataset;
pub mod electronic;
pub mod history;
pub mod naming;
pub mod runtime;
pub mod space_group;

use crate::core::job::JobError;
use crate::core::units::UnitError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Unit conversion error: {0}")]
    Unit(#[from] UnitError),

    #[error("No band edges around the Fermi energy ({fermi_energy:.3} eV)")]
    BandEdges { fermi_energy: f64 },

    #[error("Failed to read dataset manifest '{path}': {source}", path = path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn absent_section(error: &JobError) -> bool {
    matches!(
        error,
        JobError::SectionNotFound { .. } | JobError::NotAvailable(_)
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::job::Section;
    use crate::core::job::snapshot::JobSnapshot;
    use std::collections::BTreeMap;

    pub fn job_with_sections(sections: Vec<(&str, Section)>) -> JobSnapshot {
        let mut files: BTreeMap<String, BTreeMap<String, Section>> = BTreeMap::new();
        for (file, section) in sections {
            files
                .entry(file.to_string())
                .or_default()
                .insert(section.name().to_string(), section);
        }
        JobSnapshot {
            name: "GO-1-LiF_Fm-3m_-4.1_1x1x1".to_string(),
            path: Default::default(),
            ok: true,
            engines: vec!["band".to_string()],
            settings: Default::default(),
            input_atoms: None,
            atoms: None,
            energy: None,
            gradients: None,
            stress_tensor: None,
            charges: None,
            sections: files,
            timings: Default::default(),
            input: None,
            runscript: None,
        }
    }
}
