//! Observable events
//!
//! Every log line emitted by the crate carries an `event` field naming one of
//! these variants, so logs can be filtered by event code.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Templates
    /// A query template was parsed
    TemplateParsed,

    // Parameter application
    /// One supplied value failed validation
    ParameterRejected,
    /// An `apply` call was rejected because at least one value was invalid
    ApplyRejected,
    /// An `apply` call was aborted by a fatal error
    ApplyAborted,
    /// An `apply` call merged its values and re-rendered the query
    ParametersApplied,

    // Dropdowns
    /// Dropdown options were loaded from a query result
    DropdownResolved,
    /// A dropdown referenced a query with no data source
    QueryDetached,

    // Command line
    /// Configuration loaded
    ConfigLoaded,
    /// Query result fixtures loaded
    ResultsLoaded,
    /// A command finished
    CommandComplete,
    /// A command failed
    CommandFailed,
}

impl Event {
    /// Returns the event code
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::TemplateParsed => "TEMPLATE_PARSED",

            Event::ParameterRejected => "PARAMETER_REJECTED",
            Event::ApplyRejected => "APPLY_REJECTED",
            Event::ApplyAborted => "APPLY_ABORTED",
            Event::ParametersApplied => "PARAMETERS_APPLIED",

            Event::DropdownResolved => "DROPDOWN_RESOLVED",
            Event::QueryDetached => "QUERY_DETACHED",

            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ResultsLoaded => "RESULTS_LOADED",
            Event::CommandComplete => "COMMAND_COMPLETE",
            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    /// Returns true for events that describe a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::ParameterRejected
                | Event::ApplyRejected
                | Event::ApplyAborted
                | Event::QueryDetached
                | Event::CommandFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
