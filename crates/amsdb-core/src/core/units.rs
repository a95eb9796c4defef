//! Fixed unit conversion table.
//!
//! Every unit belongs to one physical quantity and carries its size expressed
//! in the reference unit of that quantity (eV, Angstrom, eV/Angstrom and
//! eV/Angstrom^3). Constants follow CODATA 2018, the values used by the AMS
//! tooling the job results come from.

use phf::{Map, phf_map};
use thiserror::Error;

/// Hartree energy in eV.
pub const HARTREE: f64 = 27.211386245988;
/// Bohr radius in Angstrom.
pub const BOHR: f64 = 0.529177210903;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Energy,
    Length,
    Force,
    EnergyDensity,
}

static UNITS: Map<&'static str, (Quantity, f64)> = phf_map! {
    "eV" => (Quantity::Energy, 1.0),
    "au" => (Quantity::Energy, HARTREE),
    "hartree" => (Quantity::Energy, HARTREE),
    "Ha" => (Quantity::Energy, HARTREE),
    "kcal/mol" => (Quantity::Energy, 0.0433641043),
    "kJ/mol" => (Quantity::Energy, 0.0103642688),
    "A" => (Quantity::Length, 1.0),
    "angstrom" => (Quantity::Length, 1.0),
    "bohr" => (Quantity::Length, BOHR),
    "nm" => (Quantity::Length, 10.0),
    "pm" => (Quantity::Length, 0.01),
    "eV/angstrom" => (Quantity::Force, 1.0),
    "eV/A" => (Quantity::Force, 1.0),
    "hartree/bohr" => (Quantity::Force, HARTREE / BOHR),
    "eV/angstrom^3" => (Quantity::EnergyDensity, 1.0),
    "eV/A^3" => (Quantity::EnergyDensity, 1.0),
    "hartree/bohr^3" => (Quantity::EnergyDensity, HARTREE / (BOHR * BOHR * BOHR)),
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitError {
    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),
    #[error("Cannot convert '{from}' ({from_quantity:?}) to '{to}' ({to_quantity:?})")]
    IncompatibleUnits {
        from: String,
        to: String,
        from_quantity: Quantity,
        to_quantity: Quantity,
    },
}

fn lookup(unit: &str) -> Result<(Quantity, f64), UnitError> {
    UNITS
        .get(unit)
        .copied()
        .ok_or_else(|| UnitError::UnknownUnit(unit.to_string()))
}

/// Multiplicative factor turning a value in `from` into a value in `to`.
pub fn factor(from: &str, to: &str) -> Result<f64, UnitError> {
    let (from_quantity, from_size) = lookup(from)?;
    let (to_quantity, to_size) = lookup(to)?;
    if from_quantity != to_quantity {
        return Err(UnitError::IncompatibleUnits {
            from: from.to_string(),
            to: to.to_string(),
            from_quantity,
            to_quantity,
        });
    }
    Ok(from_size / to_size)
}

pub fn convert(value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    Ok(value * factor(from, to)?)
}

pub fn convert_all(values: &[f64], from: &str, to: &str) -> Result<Vec<f64>, UnitError> {
    let k = factor(from, to)?;
    Ok(values.iter().map(|v| v * k).collect())
}
