//! Error types for ctsim.

use thiserror::Error;

/// Result type alias for ctsim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for ctsim operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Energy or material counts disagree between arrays.
    #[error("shape mismatch: {what} expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A raw reading cannot be log-linearised.
    #[error("non-finite attenuation at angle {angle}, sample {sample} (raw reading {value})")]
    NumericDegeneracy {
        angle: usize,
        sample: usize,
        value: f64,
    },

    /// Material name not present in the table.
    #[error("unknown material: {0}")]
    UnknownMaterial(String),
}
