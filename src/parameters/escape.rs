//! Escape capabilities
//!
//! A data source may know how to make a value safe to splice into its query
//! language. The capability is handed to each query explicitly; nothing is
//! looked up from global state.

/// Escaping offered by a data source
pub trait EscapeCapability: Send + Sync {
    /// Whether `escape` actually transforms values
    fn supports_escape(&self) -> bool;

    /// Escapes one value
    fn escape(&self, value: &str) -> String;
}

/// SQL string literal escaping: doubles every single quote
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlQuoteEscaper;

impl EscapeCapability for SqlQuoteEscaper {
    fn supports_escape(&self) -> bool {
        true
    }

    fn escape(&self, value: &str) -> String {
        value.replace('\'', "''")
    }
}

/// A data source without escaping support
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEscape;

impl EscapeCapability for NoEscape {
    fn supports_escape(&self) -> bool {
        false
    }

    fn escape(&self, value: &str) -> String {
        value.to_string()
    }
}

/// Returns true when `escaper` will really transform values
pub fn escapes(escaper: Option<&dyn EscapeCapability>) -> bool {
    escaper.is_some_and(|e| e.supports_escape())
}
