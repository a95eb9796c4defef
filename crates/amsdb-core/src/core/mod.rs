//! # Core Module
//!
//! Stateless building blocks shared by every other layer of the library.
//!
//! ## Overview
//!
//! - **Structures** ([`models`]) - Atoms, cells and chemical formulas, with element tables
//! - **Units** ([`units`]) - Fixed conversion table between atomic and laboratory units
//! - **Settings** ([`settings`]) - Case-insensitive nested job configuration
//! - **Job interface** ([`job`]) - The [`job::JobResult`] trait through which finished jobs are read
//! - **Extraction** ([`extract`]) - Log scraping, band structure, optimization history,
//!   dataset membership and naming helpers
//!
//! Nothing in this module touches the database or prompts the user.

pub mod extract;
pub mod job;
pub mod models;
pub mod settings;
pub mod units;
