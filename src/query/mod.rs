//! Parameterized queries
//!
//! Binds a template to a parameter schema, validates applied values as a
//! batch and keeps the rendered text up to date.

mod errors;
mod parameterized;

pub use errors::{InvalidParameterError, ParameterError};
pub use parameterized::ParameterizedQuery;
