//! Shared error severity
//!
//! Every error in the crate is classified the same way:
//! - `Reject`: a bad value. Collected, reported together, state unchanged.
//! - `Fatal`: a broken reference or collaborator failure. Aborts at once.

use std::fmt;

/// Severity levels shared by all error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The supplied value was rejected
    Reject,
    /// The operation cannot proceed at all
    Fatal,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Reject => "REJECT",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
