//! Crate-level error type
//!
//! Every fallible operation in the crate returns [`MorResult`]. Each
//! [`MorError`] variant belongs to exactly one [`ErrorKind`], so callers can
//! react to a whole class of failures (e.g. skip visualization when it is
//! unsupported) without matching on individual variants.

use thiserror::Error;

/// Broad failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid construction or reconfiguration request
    Configuration,

    /// Dimensional or linearity mismatch between operators and spaces
    InvariantViolation,

    /// The requested capability was not configured or is not implemented
    Unsupported,

    /// Failure inside an inverse solve or a time integration
    NumericalSolve,

    /// A parameter is missing or has the wrong shape
    ParameterValidation,

    /// File output failed
    Io,
}

#[derive(Debug, Error)]
pub enum MorError {
    #[error("special operator '{name}' collides with an existing attribute")]
    AttributeCollision { name: String },

    #[error("special operator '{name}' given both directly and in the operator map with different values")]
    DuplicateSpecialOperator { name: String },

    #[error("required operator '{name}' was not provided")]
    MissingOperator { name: String },

    #[error("'{field}' cannot be overridden: {reason}")]
    InvalidOverride { field: &'static str, reason: String },

    #[error("'{first}' and '{second}' cannot be overridden together")]
    ConflictingOverrides {
        first: &'static str,
        second: &'static str,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("space mismatch in {context}: expected {expected}, found {found}")]
    SpaceMismatch {
        context: String,
        expected: String,
        found: String,
    },

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("operator '{operator}' cannot be assembled into a matrix")]
    NotAssemblable { operator: String },

    #[error("numerical solve failed: {0}")]
    NumericalSolve(String),

    #[error("parameter '{name}' is missing")]
    ParameterMissing { name: String },

    #[error("parameter '{name}' has shape {found:?}, expected {expected:?}")]
    ParameterShape {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("parameter '{name}' is declared with shapes {first:?} and {second:?}")]
    ParameterTypeConflict {
        name: String,
        first: Vec<usize>,
        second: Vec<usize>,
    },

    #[error("parameter '{name}' = {value} lies outside the parameter space")]
    ParameterOutOfRange { name: String, value: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("plotting failed: {0}")]
    Plot(String),
}

impl MorError {
    /// Failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MorError::AttributeCollision { .. }
            | MorError::DuplicateSpecialOperator { .. }
            | MorError::MissingOperator { .. }
            | MorError::InvalidOverride { .. }
            | MorError::ConflictingOverrides { .. }
            | MorError::Configuration(_) => ErrorKind::Configuration,

            MorError::InvariantViolation(_) | MorError::SpaceMismatch { .. } => {
                ErrorKind::InvariantViolation
            }

            MorError::Unsupported(_) | MorError::NotAssemblable { .. } => ErrorKind::Unsupported,

            MorError::NumericalSolve(_) => ErrorKind::NumericalSolve,

            MorError::ParameterMissing { .. }
            | MorError::ParameterShape { .. }
            | MorError::ParameterTypeConflict { .. }
            | MorError::ParameterOutOfRange { .. } => ErrorKind::ParameterValidation,

            MorError::Io(_) | MorError::Plot(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn space_mismatch(
        context: impl Into<String>,
        expected: impl std::fmt::Display,
        found: impl std::fmt::Display,
    ) -> Self {
        MorError::SpaceMismatch {
            context: context.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

pub type MorResult<T> = Result<T, MorError>;
