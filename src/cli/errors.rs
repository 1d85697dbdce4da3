//! CLI-specific error types
//!
//! Library errors keep their own codes when they reach the command line.

use std::io;

use thiserror::Error;

use crate::dropdown::DropdownError;
use crate::error::Severity;
use crate::parameters::SchemaError;
use crate::query::ParameterError;
use crate::template::TemplateError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout, input files)
    IoError,
    /// Log subscriber could not be installed
    LoggingError,
    /// Error raised by the library, reported under its own code
    Library(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CLI_CONFIG_ERROR",
            Self::IoError => "CLI_IO_ERROR",
            Self::LoggingError => "CLI_LOGGING_ERROR",
            Self::Library(code) => *code,
        }
    }
}

/// CLI error
#[derive(Debug, Error)]
#[error("[{}] {}: {}", .severity, .code.code(), .message)]
pub struct CliError {
    code: CliErrorCode,
    severity: Severity,
    message: String,
}

impl CliError {
    /// Creates a fatal error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Fatal,
            message: message.into(),
        }
    }

    fn library(code: &'static str, severity: Severity, message: String) -> Self {
        Self {
            code: CliErrorCode::Library(code),
            severity,
            message,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn logging_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::LoggingError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<TemplateError> for CliError {
    fn from(e: TemplateError) -> Self {
        Self::library(e.code(), Severity::Fatal, e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::library(e.code(), e.severity(), e.to_string())
    }
}

impl From<ParameterError> for CliError {
    fn from(e: ParameterError) -> Self {
        Self::library(e.code(), e.severity(), e.to_string())
    }
}

impl From<DropdownError> for CliError {
    fn from(e: DropdownError) -> Self {
        Self::library(e.code(), e.severity(), e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
