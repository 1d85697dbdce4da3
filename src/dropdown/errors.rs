//! Dropdown lookup errors
//!
//! None of these are validation failures. They describe a schema that points
//! at a query whose results cannot be read, and they always abort `apply`.

use thiserror::Error;

use crate::error::Severity;

use super::source::QueryId;

/// Result type for dropdown operations
pub type DropdownResult<T> = Result<T, DropdownError>;

/// Errors raised while loading dropdown options from a query result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropdownError {
    /// The referenced query has no data source, so it can have no result
    #[error("This query is detached from any data source. Please select a different query.")]
    DetachedQuerySource { query_id: QueryId },

    /// The referenced query does not exist in the caller's org
    #[error("Query {query_id} not found")]
    UnknownQuery { query_id: QueryId },

    /// The referenced query has never produced a result
    #[error("Query {query_id} has no computed result")]
    NoResult { query_id: QueryId },

    /// The result set cannot be turned into options
    #[error("Result of query {query_id} is malformed: {reason}")]
    MalformedResult { query_id: QueryId, reason: String },

    /// A dropdown parameter definition without a `queryId`
    #[error("Parameter '{name}' does not reference a query")]
    MissingQueryId { name: String },

    /// No result source was bound to resolve dropdown options
    #[error("No query result source is available to resolve parameter '{name}'")]
    NoResultSource { name: String },

    /// The result store itself failed
    #[error("Query result store error: {0}")]
    Store(String),
}

impl DropdownError {
    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            DropdownError::DetachedQuerySource { .. } => "PARAM_QUERY_DETACHED",
            DropdownError::UnknownQuery { .. } => "PARAM_QUERY_UNKNOWN",
            DropdownError::NoResult { .. } => "PARAM_QUERY_NO_RESULT",
            DropdownError::MalformedResult { .. } => "PARAM_QUERY_MALFORMED_RESULT",
            DropdownError::MissingQueryId { .. } => "PARAM_QUERY_ID_MISSING",
            DropdownError::NoResultSource { .. } => "PARAM_QUERY_NO_SOURCE",
            DropdownError::Store(_) => "PARAM_QUERY_STORE",
        }
    }

    /// Dropdown errors are always fatal
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }

    /// Returns true if the referenced query is detached from its data source
    pub fn is_detached(&self) -> bool {
        matches!(self, DropdownError::DetachedQuerySource { .. })
    }

    /// Returns the query id this error refers to, if any
    pub fn query_id(&self) -> Option<QueryId> {
        match self {
            DropdownError::DetachedQuerySource { query_id }
            | DropdownError::UnknownQuery { query_id }
            | DropdownError::NoResult { query_id }
            | DropdownError::MalformedResult { query_id, .. } => Some(*query_id),
            _ => None,
        }
    }
}
