//! JSON I/O handling for CLI
//!
//! - Input: one JSON object on stdin
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::{json, Map, Value};

use crate::error::Severity;

use super::errors::{CliError, CliResult};

/// Read a JSON object of parameter values from stdin
pub fn read_request() -> CliResult<Map<String, Value>> {
    read_request_from(io::stdin().lock())
}

/// Read a JSON object of parameter values from `reader`.
///
/// Empty input is an empty object.
pub fn read_request_from(mut reader: impl Read) -> CliResult<Map<String, Value>> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str(&input)? {
        Value::Object(values) => Ok(values),
        other => Err(CliError::io_error(format!(
            "Expected a JSON object of parameter values, got {}",
            other
        ))),
    }
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&mut io::stdout(), &json!({"status": "ok", "data": data}))
}

/// Write an error response to stdout
pub fn write_error(code: &str, severity: Severity, message: &str) -> CliResult<()> {
    write_line(
        &mut io::stdout(),
        &json!({
            "status": "error",
            "code": code,
            "severity": severity.as_str(),
            "message": message,
        }),
    )
}

fn write_line(out: &mut impl Write, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, response)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
