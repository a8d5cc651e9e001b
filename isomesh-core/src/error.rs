//! Error types for isomesh

use thiserror::Error;

/// Main error type for isomesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scalar field returned non-finite value {value} at ({x}, {y}, {z})")]
    FieldEvaluation { x: f64, y: f64, z: f64, value: f64 },

    #[error("Build cancelled by a newer request")]
    Cancelled,

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

/// Result type alias for isomesh operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error only reports that a newer build superseded this one
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
