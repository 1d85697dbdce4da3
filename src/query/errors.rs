//! Errors raised by `ParameterizedQuery::apply`
//!
//! Error codes:
//! - PARAM_INVALID_PARAMETERS (REJECT, aggregates every rejected value)
//! - PARAM_QUERY_* (FATAL, see `DropdownError`)

use std::fmt;

use thiserror::Error;

use crate::dropdown::DropdownError;
use crate::error::Severity;
use crate::parameters::ValidationError;

/// Every value of one `apply` call that did not fit its definition.
///
/// The message only names the parameters. The per-name reasons are kept for
/// diagnostics and are not part of `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidParameterError {
    failures: Vec<(String, ValidationError)>,
}

impl InvalidParameterError {
    /// Creates the aggregate from `(name, reason)` pairs in input order
    pub fn new(failures: Vec<(String, ValidationError)>) -> Self {
        Self { failures }
    }

    /// Names of the rejected parameters, in input order
    pub fn names(&self) -> Vec<&str> {
        self.failures.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Rejection reason per parameter
    pub fn failures(&self) -> &[(String, ValidationError)] {
        &self.failures
    }

    /// Returns the reason `name` was rejected
    pub fn failure(&self, name: &str) -> Option<&ValidationError> {
        self.failures
            .iter()
            .find(|(failed, _)| failed == name)
            .map(|(_, err)| err)
    }
}

impl fmt::Display for InvalidParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The following parameter values are incompatible with their definitions: {}",
            self.names().join(", ")
        )
    }
}

impl std::error::Error for InvalidParameterError {}

/// Error returned by `apply`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// At least one value was rejected; nothing was applied
    #[error(transparent)]
    InvalidParameters(#[from] InvalidParameterError),

    /// A dropdown could not be resolved; the call was aborted
    #[error(transparent)]
    Dropdown(#[from] DropdownError),
}

impl ParameterError {
    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ParameterError::InvalidParameters(_) => "PARAM_INVALID_PARAMETERS",
            ParameterError::Dropdown(err) => err.code(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ParameterError::InvalidParameters(_) => Severity::Reject,
            ParameterError::Dropdown(err) => err.severity(),
        }
    }

    /// Returns true if a dropdown referenced a query without a data source
    pub fn is_detached(&self) -> bool {
        matches!(self, ParameterError::Dropdown(err) if err.is_detached())
    }
}
