//! Dropdown option subsystem
//!
//! Dynamic-enum parameters draw their allowed values from the latest result
//! of another saved query. Lookups are point-in-time reads with no caching
//! and no retry.

mod errors;
mod resolver;
mod source;

pub use errors::{DropdownError, DropdownResult};
pub use resolver::{dropdown_values, stringify_value, DropdownOption};
pub use source::{
    QueryId, QueryLookup, QueryRecord, QueryResultData, QueryResultSource, ResultColumn,
    ResultStore,
};
