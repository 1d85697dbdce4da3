//! CLI module for paramquery
//!
//! Provides command-line interface for:
//! - render: Apply parameter values from stdin and print the query text
//! - inspect: List the template's placeholders and parameter schema
//! - dropdown: Print the options a query result offers

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_query, dropdown, inspect, render, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_request_from, write_error, write_response};
