use super::elements::{is_element, is_metal};
use nalgebra::{Matrix3, Point3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AtomsError {
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("Got {symbols} symbols but {positions} positions")]
    LengthMismatch { symbols: usize, positions: usize },
}

/// A chemical structure: element symbols, Cartesian positions and periodicity.
///
/// Positions and cell vectors are in Angstrom. The cell is stored row-wise,
/// one lattice vector per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AtomsRecord", into = "AtomsRecord")]
pub struct Atoms {
    symbols: Vec<String>,
    positions: Vec<Point3<f64>>,
    cell: Option<Matrix3<f64>>,
    pbc: [bool; 3],
}

impl Atoms {
    /// Creates a non-periodic structure.
    ///
    /// # Errors
    ///
    /// Returns an error if a symbol is not a chemical element or the number of
    /// symbols and positions differ.
    pub fn new(symbols: Vec<String>, positions: Vec<Point3<f64>>) -> Result<Self, AtomsError> {
        if symbols.len() != positions.len() {
            return Err(AtomsError::LengthMismatch {
                symbols: symbols.len(),
                positions: positions.len(),
            });
        }
        if let Some(bad) = symbols.iter().find(|s| !is_element(s)) {
            return Err(AtomsError::UnknownElement(bad.clone()));
        }
        Ok(Self {
            symbols,
            positions,
            cell: None,
            pbc: [false; 3],
        })
    }

    pub fn with_cell(mut self, cell: Matrix3<f64>, pbc: [bool; 3]) -> Self {
        self.cell = Some(cell);
        self.pbc = pbc;
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn cell(&self) -> Option<&Matrix3<f64>> {
        self.cell.as_ref()
    }

    pub fn pbc(&self) -> [bool; 3] {
        self.pbc
    }

    /// Number of periodic directions (0 for a molecule, 3 for a bulk crystal).
    pub fn periodic_dimensions(&self) -> usize {
        self.pbc.iter().filter(|p| **p).count()
    }

    /// Chemical formula with metals first, each group in alphabetical order.
    ///
    /// `["F", "Li", "F", "Li"]` gives `Li2F2`.
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for symbol in &self.symbols {
            *counts.entry(symbol.as_str()).or_default() += 1;
        }
        let (metals, others): (Vec<_>, Vec<_>) =
            counts.into_iter().partition(|(symbol, _)| is_metal(symbol));

        metals
            .into_iter()
            .chain(others)
            .map(|(symbol, n)| {
                if n == 1 {
                    symbol.to_string()
                } else {
                    format!("{}{}", symbol, n)
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AtomsRecord {
    symbols: Vec<String>,
    positions: Vec<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cell: Option<[[f64; 3]; 3]>,
    #[serde(default)]
    pbc: [bool; 3],
}

impl TryFrom<AtomsRecord> for Atoms {
    type Error = AtomsError;

    fn try_from(record: AtomsRecord) -> Result<Self, Self::Error> {
        let positions = record
            .positions
            .iter()
            .map(|p| Point3::new(p[0], p[1], p[2]))
            .collect();
        let atoms = Atoms::new(record.symbols, positions)?;
        Ok(match record.cell {
            Some(rows) => {
                let cell = Matrix3::from_row_slice(&[
                    rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2],
                    rows[2][0], rows[2][1], rows[2][2],
                ]);
                atoms.with_cell(cell, record.pbc)
            }
            None => Atoms {
                pbc: record.pbc,
                ..atoms
            },
        })
    }
}

impl From<Atoms> for AtomsRecord {
    fn from(atoms: Atoms) -> Self {
        let cell = atoms.cell.map(|c| {
            [
                [c[(0, 0)], c[(0, 1)], c[(0, 2)]],
                [c[(1, 0)], c[(1, 1)], c[(1, 2)]],
                [c[(2, 0)], c[(2, 1)], c[(2, 2)]],
            ]
        });
        Self {
            positions: atoms.positions.iter().map(|p| [p.x, p.y, p.z]).collect(),
            symbols: atoms.symbols,
            cell,
            pbc: atoms.pbc,
        }
    }
}
