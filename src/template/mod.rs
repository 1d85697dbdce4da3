//! Query template subsystem
//!
//! Query text carries named placeholders in a logic-less mustache grammar.
//! This module parses that text once, lists the placeholders it mentions and
//! renders it against a parameter map.

mod errors;
mod extract;
mod parser;
mod render;

pub use errors::{TemplateError, TemplateResult};
pub use extract::placeholder_names;
pub use parser::{Node, Template, DEFAULT_CLOSE, DEFAULT_OPEN};
pub use render::{display_value, is_truthy, render};
