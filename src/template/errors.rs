//! Template error types
//!
//! Template errors are raised while parsing query text into its node tree.
//! They are structural: a template that fails to parse can never be rendered.

use thiserror::Error;

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors raised while parsing a query template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// An opening delimiter with no matching closing delimiter
    #[error("Unterminated tag starting at offset {offset}")]
    UnterminatedTag { offset: usize },

    /// A tag with no name, e.g. `{{ }}` or `{{#}}`
    #[error("Empty tag at offset {offset}")]
    EmptyTag { offset: usize },

    /// A section that is never closed
    #[error("Section '{name}' opened at offset {offset} is never closed")]
    UnclosedSection { name: String, offset: usize },

    /// A closing tag that does not match the innermost open section
    #[error("Closing tag '{found}' at offset {offset} does not match open section '{expected}'")]
    MismatchedSection {
        expected: String,
        found: String,
        offset: usize,
    },

    /// A closing tag with no open section at all
    #[error("Closing tag '{name}' at offset {offset} has no open section")]
    UnopenedSection { name: String, offset: usize },

    /// A malformed set-delimiter tag
    #[error("Invalid delimiter tag at offset {offset}: {reason}")]
    InvalidDelimiters { offset: usize, reason: String },
}

impl TemplateError {
    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            TemplateError::UnterminatedTag { .. } => "TEMPLATE_UNTERMINATED_TAG",
            TemplateError::EmptyTag { .. } => "TEMPLATE_EMPTY_TAG",
            TemplateError::UnclosedSection { .. } => "TEMPLATE_UNCLOSED_SECTION",
            TemplateError::MismatchedSection { .. } => "TEMPLATE_MISMATCHED_SECTION",
            TemplateError::UnopenedSection { .. } => "TEMPLATE_UNOPENED_SECTION",
            TemplateError::InvalidDelimiters { .. } => "TEMPLATE_INVALID_DELIMITERS",
        }
    }

    /// Returns the byte offset in the template source where parsing failed
    pub fn offset(&self) -> usize {
        match self {
            TemplateError::UnterminatedTag { offset }
            | TemplateError::EmptyTag { offset }
            | TemplateError::UnclosedSection { offset, .. }
            | TemplateError::MismatchedSection { offset, .. }
            | TemplateError::UnopenedSection { offset, .. }
            | TemplateError::InvalidDelimiters { offset, .. } => *offset,
        }
    }
}
