use super::{ExtractionError, absent_section};
use crate::core::job::JobResult;
use crate::core::units;
use serde_json::{Value, json};
use tracing::debug;

pub const BAND_FILE: &str = "band";

/// Band edges of a periodic calculation, all in eV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandInfo {
    pub fermi_energy: f64,
    pub homo_energy: f64,
    pub lumo_energy: f64,
    pub band_gap: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensityOfStates {
    /// Energies in eV.
    pub energy: Vec<f64>,
    /// Total density of states in 1/eV.
    pub total: Vec<f64>,
}

impl DensityOfStates {
    pub fn to_data(&self) -> Value {
        json!({
            "Energy [eV]": self.energy,
            "Total DOS [1/eV]": self.total,
        })
    }
}

/// Reads Fermi level, band gap and band edges from the `BandStructure` section.
///
/// Returns `None` when the job has no band structure (non-periodic engines).
pub fn band_info(job: &dyn JobResult) -> Result<Option<BandInfo>, ExtractionError> {
    let section = match job.read_section(BAND_FILE, "BandStructure") {
        Ok(section) => section,
        Err(e) if absent_section(&e) => {
            debug!("Job '{}' has no band structure", job.name());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let k = units::factor("au", "eV")?;
    let fermi_energy = section.float("FermiEnergy")? * k;
    let band_gap = section.float("BandGap")? * k;
    let mut bands: Vec<f64> = section
        .floats("bandsEnergyRange")?
        .into_iter()
        .map(|e| e * k)
        .collect();
    bands.sort_by(f64::total_cmp);

    let homo_index = bands
        .iter()
        .rposition(|e| *e < fermi_energy)
        .ok_or(ExtractionError::BandEdges { fermi_energy })?;
    let lumo_energy = *bands
        .get(homo_index + 1)
        .ok_or(ExtractionError::BandEdges { fermi_energy })?;

    Ok(Some(BandInfo {
        fermi_energy,
        homo_energy: bands[homo_index],
        lumo_energy,
        band_gap,
    }))
}

pub fn density_of_states(
    job: &dyn JobResult,
) -> Result<Option<DensityOfStates>, ExtractionError> {
    let section = match job.read_section(BAND_FILE, "DOS") {
        Ok(section) => section,
        Err(e) if absent_section(&e) => {
            debug!("Job '{}' has no density of states", job.name());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let k = units::factor("au", "eV")?;
    Ok(Some(DensityOfStates {
        energy: section.floats("Energies")?.iter().map(|e| e * k).collect(),
        total: section.floats("Total DOS")?.iter().map(|d| d / k).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extract::test_support::job_with_sections;
    use crate::core::job::{Section, SectionValue};
    use crate::core::units::HARTREE;

    fn band_section(bands: Vec<f64>) -> Section {
        Section::new("BandStructure")
            .with("FermiEnergy", SectionValue::Float(-0.2))
            .with("BandGap", SectionValue::Float(0.3))
            .with("bandsEnergyRange", SectionValue::Floats(bands))
    }

    #[test]
    fn band_info_converts_and_locates_edges() {
        let job = job_with_sections(vec![(
            "band",
            band_section(vec![0.1, -0.5, -0.25, 0.2]),
        )]);
        let info = band_info(&job).unwrap().unwrap();
        assert!((info.fermi_energy - (-0.2 * HARTREE)).abs() < 1e-9);
        assert!((info.band_gap - 0.3 * HARTREE).abs() < 1e-9);
        assert!((info.homo_energy - (-0.25 * HARTREE)).abs() < 1e-9);
        assert!((info.lumo_energy - 0.1 * HARTREE).abs() < 1e-9);
        assert!(info.homo_energy < info.fermi_energy);
        assert!(info.lumo_energy > info.fermi_energy);
    }

    #[test]
    fn band_info_without_states_above_fermi_is_an_error() {
        let job = job_with_sections(vec![("band", band_section(vec![-0.5, -0.3]))]);
        assert!(matches!(
            band_info(&job),
            Err(ExtractionError::BandEdges { .. })
        ));
    }

    #[test]
    fn band_info_is_none_without_band_section() {
        let job = job_with_sections(vec![]);
        assert_eq!(band_info(&job).unwrap(), None);
    }

    #[test]
    fn dos_energies_scale_up_and_densities_scale_down() {
        let dos = Section::new("DOS")
            .with("Energies", SectionValue::Floats(vec![-1.0, 0.0, 1.0]))
            .with("Total DOS", SectionValue::Floats(vec![HARTREE, 0.0, 2.0 * HARTREE]));
        let job = job_with_sections(vec![("band", dos)]);

        let dos = density_of_states(&job).unwrap().unwrap();
        assert_eq!(dos.energy, vec![-HARTREE, 0.0, HARTREE]);
        assert!((dos.total[0] - 1.0).abs() < 1e-12);
        assert!((dos.total[2] - 2.0).abs() < 1e-12);

        let data = dos.to_data();
        assert_eq!(data["Energy [eV]"].as_array().unwrap().len(), 3);
        assert!(data.get("Total DOS [1/eV]").is_some());
    }

    #[test]
    fn dos_is_none_without_section() {
        let job = job_with_sections(vec![]);
        assert_eq!(density_of_states(&job).unwrap(), None);
    }
}
