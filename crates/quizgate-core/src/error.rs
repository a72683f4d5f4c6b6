//! Validation error types.
//!
//! Unknown schema names are a programmer error at the call site; violations
//! are a property of the data. Both travel through one enum so callers can
//! use `?`, but they are classified without string matching.

use thiserror::Error;

use crate::validator::Violations;

/// Errors returned by [`crate::validator::validate`] and friends.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The requested schema is not registered.
    #[error("unknown schema: {0}")]
    SchemaNotFound(String),

    /// The input broke one or more constraints.
    #[error("{n} violation(s):\n{0}", n = .0.len())]
    Invalid(Violations),
}

impl ValidationError {
    /// Returns `true` if the caller asked for a schema that does not exist.
    pub fn is_schema_not_found(&self) -> bool {
        matches!(self, ValidationError::SchemaNotFound(_))
    }

    /// The violations, if the input itself was at fault.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            ValidationError::Invalid(v) => Some(v),
            ValidationError::SchemaNotFound(_) => None,
        }
    }

    /// Take ownership of the violations, if any.
    pub fn into_violations(self) -> Option<Violations> {
        match self {
            ValidationError::Invalid(v) => Some(v),
            ValidationError::SchemaNotFound(_) => None,
        }
    }
}
