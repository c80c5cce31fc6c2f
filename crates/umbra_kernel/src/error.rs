//! Recoverable kernel errors.
//!
//! Contract violations (reading an empty intersection, sampling an object
//! without surface sampling) are assertions, not variants of this enum.

use thiserror::Error;

/// Errors reported by scene objects and their constructors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// The object cannot answer this query. Callers must not treat this as zero.
    #[error("{operation} is not supported by {object}")]
    NotSupported {
        object: &'static str,
        operation: &'static str,
    },

    #[error("surface sampling is required but not supported: {0}")]
    MissingSurfaceSampling(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl KernelError {
    pub fn not_supported(object: &'static str, operation: &'static str) -> Self {
        Self::NotSupported { object, operation }
    }
}

pub type KernelResult<T> = Result<T, KernelError>;
