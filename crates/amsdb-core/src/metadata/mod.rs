//! Metadata sidecars describing the values stored in a database.
//!
//! A database `X.db` carries `X.json` and `X.yaml` next to it. Both hold the
//! same document: a title, a free description, a `keys` map explaining every
//! value used in the reconciled attributes, and the row count.

pub mod document;
pub mod prompt;
pub mod reconcile;

use crate::db::DbError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse metadata file '{path}': {message}", path = path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize metadata: {0}")]
    Serialize(String),

    #[error("Malformed metadata document: {0}")]
    Malformed(String),

    #[error("A description is mandatory for value '{value}' of key '{key}'")]
    MandatoryDescription { key: String, value: String },

    #[error("Key '{0}' is not described in the metadata")]
    UnsupportedKey(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("The database has no file path to place metadata next to")]
    NoDatabasePath,
}
