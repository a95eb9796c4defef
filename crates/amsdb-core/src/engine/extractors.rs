use super::error::CalculatorError;
use crate::core::job::{JobError, JobResult};
use crate::core::models::atoms::Atoms;
use crate::core::settings::{Settings, is_enabled};
use crate::core::units::{self, BOHR, HARTREE};
use nalgebra::Vector3;
use serde_json::Value;
use std::fmt;

/// A calculated property in laboratory units (eV, Angstrom).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Scalar(f64),
    PerAtom(Vec<f64>),
    Vectors(Vec<Vector3<f64>>),
    /// Voigt order `xx yy zz yz xz xy`.
    Voigt([f64; 6]),
}

/// Turns one property of a job result into a [`PropertyValue`].
///
/// `enable` switches the engine flag the property needs; `is_enabled` tells
/// whether a set of settings produces the property at all.
pub trait PropertyExtractor: fmt::Debug {
    fn name(&self) -> &str;

    fn extract(&self, result: &dyn JobResult, atoms: &Atoms)
    -> Result<PropertyValue, CalculatorError>;

    fn enable(&self, _settings: &mut Settings) {}

    fn is_enabled(&self, _settings: &Settings) -> bool {
        true
    }
}

fn extraction_error(property: &str) -> impl FnOnce(JobError) -> CalculatorError + '_ {
    move |source| CalculatorError::Extraction {
        property: property.to_string(),
        source,
    }
}

const GRADIENTS_FLAG: [&str; 4] = ["input", "ams", "Properties", "Gradients"];
const STRESS_FLAG: [&str; 4] = ["input", "ams", "Properties", "StressTensor"];

#[derive(Debug, Default)]
pub struct EnergyExtractor;

impl PropertyExtractor for EnergyExtractor {
    fn name(&self) -> &str {
        "energy"
    }

    fn extract(
        &self,
        result: &dyn JobResult,
        _atoms: &Atoms,
    ) -> Result<PropertyValue, CalculatorError> {
        let energy = result.energy().map_err(extraction_error(self.name()))?;
        Ok(PropertyValue::Scalar(units::convert(energy, "hartree", "eV")?))
    }
}

#[derive(Debug, Default)]
pub struct ForceExtractor;

impl PropertyExtractor for ForceExtractor {
    fn name(&self) -> &str {
        "forces"
    }

    fn extract(
        &self,
        result: &dyn JobResult,
        _atoms: &Atoms,
    ) -> Result<PropertyValue, CalculatorError> {
        let k = units::factor("hartree/bohr", "eV/angstrom")?;
        let gradients = result.gradients().map_err(extraction_error(self.name()))?;
        Ok(PropertyValue::Vectors(
            gradients.into_iter().map(|g| -g * k).collect(),
        ))
    }

    fn enable(&self, settings: &mut Settings) {
        settings.set(&GRADIENTS_FLAG, Value::from("Yes"));
    }

    fn is_enabled(&self, settings: &Settings) -> bool {
        is_enabled(settings.get(&GRADIENTS_FLAG))
    }
}

#[derive(Debug, Default)]
pub struct StressExtractor;

impl PropertyExtractor for StressExtractor {
    fn name(&self) -> &str {
        "stress"
    }

    /// Only the components along periodic directions are kept: a chain has `xx`,
    /// a slab adds `yy` and `xy`, a bulk system has all six.
    fn extract(
        &self,
        result: &dyn JobResult,
        atoms: &Atoms,
    ) -> Result<PropertyValue, CalculatorError> {
        let d = atoms.periodic_dimensions();
        let st = result.stress_tensor().map_err(extraction_error(self.name()))?
            * (HARTREE / BOHR.powi(d as i32));
        let mut voigt = [0.0; 6];
        if d >= 1 {
            voigt[0] = st[(0, 0)];
        }
        if d >= 2 {
            voigt[1] = st[(1, 1)];
            voigt[5] = st[(0, 1)];
        }
        if d >= 3 {
            voigt[2] = st[(2, 2)];
            voigt[3] = st[(1, 2)];
            voigt[4] = st[(0, 2)];
        }
        Ok(PropertyValue::Voigt(voigt))
    }

    fn enable(&self, settings: &mut Settings) {
        settings.set(&STRESS_FLAG, Value::from("Yes"));
    }

    fn is_enabled(&self, settings: &Settings) -> bool {
        is_enabled(settings.get(&STRESS_FLAG))
    }
}

#[derive(Debug, Default)]
pub struct ChargeExtractor;

impl PropertyExtractor for ChargeExtractor {
    fn name(&self) -> &str {
        "charges"
    }

    fn extract(
        &self,
        result: &dyn JobResult,
        _atoms: &Atoms,
    ) -> Result<PropertyValue, CalculatorError> {
        let charges = result.charges().map_err(extraction_error(self.name()))?;
        Ok(PropertyValue::PerAtom(charges))
    }
}

pub fn default_extractors() -> Vec<Box<dyn PropertyExtractor>> {
    vec![
        Box::new(EnergyExtractor),
        Box::new(ForceExtractor),
        Box::new(StressExtractor),
        Box::new(ChargeExtractor),
    ]
}
