//! # amsdb Core Library
//!
//! Pulls results out of completed AMS computational-chemistry jobs and stores
//! them as rows of an atoms database, with a metadata document describing the
//! values used across the database.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless models (`Atoms`, `Settings`), the
//!   unit table, the [`core::job::JobResult`] interface to finished jobs and the
//!   extraction functions that read logs, sections and job names.
//!
//! - **[`engine`]: The Adapter.** The stateful calculator that drives an external
//!   engine session, the property extractors shared with the store workflow,
//!   request configuration and progress reporting.
//!
//! - **[`db`]: Storage.** The append-only row model, the [`db::AtomsDatabase`]
//!   trait and its SQLite implementation, plus the row report.
//!
//! - **[`metadata`]: Curation.** The JSON/YAML sidecar document and the
//!   reconciliation pass that asks for a description of every new value.
//!
//! - **[`workflows`]: The Public API.** Ties the layers together to store a job
//!   in a single call.

pub mod core;
pub mod db;
pub mod engine;
pub mod metadata;
pub mod workflows;
