//! # Workflows Module
//!
//! High-level entry points that turn finished jobs into database rows.
//!
//! ## Overview
//!
//! A workflow runs every extraction a job needs, assembles the rows and writes
//! them in one go. Nothing is written when any extraction fails.
//!
//! - **Store Workflow** ([`store`]) - Store a job's final structure with its results
//!   and extracted attributes, optionally preceded by its input structure

pub mod store;
