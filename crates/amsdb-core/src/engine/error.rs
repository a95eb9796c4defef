use thiserror::Error;

use crate::core::job::JobError;
use crate::core::units::UnitError;

#[derive(Debug, Error)]
pub enum CalculatorError {
    #[error("No atoms object was set")]
    NoAtoms,

    #[error("No extractor known for property '{0}'")]
    NotImplemented(String),

    #[error("Failed to extract '{property}': {source}")]
    Extraction {
        property: String,
        #[source]
        source: JobError,
    },

    #[error("Unit conversion error: {0}")]
    Unit(#[from] UnitError),

    #[error("Engine session failed: {0}")]
    Session(String),
}
