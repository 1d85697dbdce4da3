//! paramquery - parameterized query templates
//!
//! Validates parameter values against a typed schema, substitutes them into
//! a mustache-style query template and reports the placeholders still
//! unbound.
//!
//! ```no_run
//! use paramquery::parameters::{ParameterDefinition, ParameterSchema};
//! use paramquery::query::ParameterizedQuery;
//! use serde_json::json;
//!
//! let schema = ParameterSchema::new(vec![ParameterDefinition::number("id")])?;
//! let mut query = ParameterizedQuery::new("SELECT * FROM users WHERE id = {{id}}", schema)?;
//! if let serde_json::Value::Object(values) = json!({"id": 5}) {
//!     query.apply(values)?;
//! }
//! assert_eq!(query.text(), "SELECT * FROM users WHERE id = 5");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod dropdown;
pub mod error;
pub mod observability;
pub mod parameters;
pub mod query;
pub mod template;
