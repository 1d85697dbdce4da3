//! Parameter error types
//!
//! Error codes:
//! - PARAM_SCHEMA_MISMATCH (REJECT)
//! - PARAM_TYPE_COERCION (REJECT)
//! - PARAM_ENUM_MEMBERSHIP (REJECT)
//! - PARAM_MULTI_VALUE_NOT_ALLOWED (REJECT)
//! - PARAM_UNKNOWN_TYPE (REJECT)
//! - PARAM_SCHEMA_DUPLICATE_NAME / PARAM_SCHEMA_MALFORMED (FATAL, schema construction)

use thiserror::Error;

use crate::dropdown::DropdownError;
use crate::error::Severity;

/// Result type for schema construction
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for validating a single value
pub type ValidationResult<T> = Result<T, ValidationFailure>;

/// Why a single supplied value was rejected.
///
/// These are collected across an `apply` call and reported together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No definition exists for the supplied name
    #[error("No definition found for parameter: '{name}'")]
    SchemaMismatch { name: String },

    /// The value cannot be read as the declared type
    #[error("Expected {expected}, got {value}")]
    TypeCoercion { expected: String, value: String },

    /// One or more values are not among the allowed options
    #[error("Got invalid values for enum: {}", .invalid.join(", "))]
    EnumMembership { invalid: Vec<String> },

    /// A list was supplied for a definition without multi-value options
    #[error("Multi values not allowed, got {value}")]
    MultiValueNotAllowed { value: String },

    /// The definition's type is not one this crate knows
    #[error("Unknown parameter type: '{type_name}'")]
    UnknownParameterType { type_name: String },
}

impl ValidationError {
    /// Creates a type coercion error describing the rejected value
    pub fn type_coercion(expected: impl Into<String>, value: &serde_json::Value) -> Self {
        ValidationError::TypeCoercion {
            expected: expected.into(),
            value: value.to_string(),
        }
    }

    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::SchemaMismatch { .. } => "PARAM_SCHEMA_MISMATCH",
            ValidationError::TypeCoercion { .. } => "PARAM_TYPE_COERCION",
            ValidationError::EnumMembership { .. } => "PARAM_ENUM_MEMBERSHIP",
            ValidationError::MultiValueNotAllowed { .. } => "PARAM_MULTI_VALUE_NOT_ALLOWED",
            ValidationError::UnknownParameterType { .. } => "PARAM_UNKNOWN_TYPE",
        }
    }

    /// Validation errors only ever reject the value
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

/// Outcome of a failed validation: either the value is bad, or the
/// definition points at something that cannot be resolved at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// The value was rejected; collected with the other failures of the call
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    /// Allowed values could not be loaded; aborts the call immediately
    #[error(transparent)]
    Fatal(#[from] DropdownError),
}

/// Errors in the schema itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two definitions share a name
    #[error("Parameter '{name}' is defined more than once")]
    DuplicateName { name: String },

    /// The schema document could not be parsed
    #[error("Malformed parameter schema: {reason}")]
    Malformed { reason: String },
}

impl SchemaError {
    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::DuplicateName { .. } => "PARAM_SCHEMA_DUPLICATE_NAME",
            SchemaError::Malformed { .. } => "PARAM_SCHEMA_MALFORMED",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}
