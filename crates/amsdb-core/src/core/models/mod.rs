//! # Core Models Module
//!
//! Atomic structures as they are stored in the database.
//!
//! - [`atoms`] - Symbols, Cartesian positions, optional cell and periodicity
//! - [`elements`] - Element symbol table and the metal / non-metal split used for formulas
//!
//! ```ignore
//! use amsdb::core::models::atoms::Atoms;
//! use nalgebra::Point3;
//!
//! let atoms = Atoms::new(
//!     vec!["F".into(), "Li".into()],
//!     vec![Point3::origin(), Point3::new(2.0, 0.0, 0.0)],
//! )?;
//! assert_eq!(atoms.formula(), "LiF");
//! ```

pub mod atoms;
pub mod elements;
