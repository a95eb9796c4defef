//! Atoms database: row model, storage and row reports.
//!
//! Rows are append-only. Ids are assigned on write, increase monotonically and
//! never change.

pub mod report;
pub mod row;
pub mod schema;
pub mod sqlite;

use row::AtomsRow;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to (de)serialize a row column: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No row with id {0}")]
    NotFound(i64),

    #[error("Key '{0}' is reserved for a database column")]
    ReservedKey(String),

    #[error("I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Storage backend for atoms rows.
pub trait AtomsDatabase {
    /// Appends a row and returns its id.
    fn write(&mut self, row: AtomsRow) -> Result<i64, DbError>;

    fn get(&self, id: i64) -> Result<AtomsRow, DbError>;

    fn count(&self) -> Result<usize, DbError>;

    fn last_id(&self) -> Result<Option<i64>, DbError>;

    /// Sorted distinct values of a key across all rows, rendered as text.
    ///
    /// `user`, `calculator` and `formula` read the row columns of that name.
    fn distinct_values(&self, key: &str) -> Result<Vec<String>, DbError>;

    /// File backing the database, `None` when it lives in memory.
    fn path(&self) -> Option<&Path>;
}
