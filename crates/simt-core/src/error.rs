//! Error types for simt-reduce
//!
//! Provides a unified error type for all simt-reduce crates. The reduction
//! itself has no recoverable failure states; every variant here comes from a
//! precondition check before launch or from a collaborator (scratch
//! allocation, thread pool construction).

use thiserror::Error;

/// Core error type for launch preparation and collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Memory allocation or workspace error
    #[error("Memory error: {0}")]
    Memory(String),

    /// Threading or scheduling error
    #[error("Execution error: {0}")]
    Execution(String),

    /// Feature not available
    #[error("Feature not available: {0}")]
    FeatureNotAvailable(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for a parameter that must be a power of two
    pub fn not_power_of_two(name: &str, value: usize) -> Self {
        Self::InvalidParameter(format!("{name} must be a power of two, got {value}"))
    }

    /// Create an error for a parameter outside its inclusive range
    pub fn out_of_range(name: &str, value: usize, min: usize, max: usize) -> Self {
        Self::InvalidParameter(format!(
            "{name} must be in [{min}, {max}], got {value}"
        ))
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }
}
