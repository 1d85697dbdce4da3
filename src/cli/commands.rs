//! CLI command implementations
//!
//! Each command loads the configuration, installs logging and produces one
//! JSON document. `run_command` writes it as the `data` of an ok response,
//! or writes an error response and fails.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::dropdown::{dropdown_values, QueryId};
use crate::observability::Event;
use crate::query::ParameterizedQuery;
use crate::template::placeholder_names;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command and write its response
pub fn run_command(cmd: Command) -> CliResult<()> {
    let name = cmd.name();
    match execute(cmd) {
        Ok(data) => {
            info!(event = %Event::CommandComplete, command = name, "Command complete");
            write_response(data)
        }
        Err(e) => {
            error!(
                event = %Event::CommandFailed,
                command = name,
                code = e.code_str(),
                severity = %e.severity(),
                error = %e.message(),
                "Command failed"
            );
            write_error(e.code_str(), e.severity(), e.message())?;
            Err(e)
        }
    }
}

fn execute(cmd: Command) -> CliResult<Value> {
    let config = load_config(cmd.config_path(), |config| {
        config.logging().init().map_err(CliError::logging_error)
    })?;

    match cmd {
        Command::Render { .. } => render(&config, read_request()?),
        Command::Inspect { .. } => inspect(&config),
        Command::Dropdown { query_id, .. } => dropdown(&config, query_id),
    }
}

/// Loads the configuration and installs logging before logging anything
fn load_config(
    path: &Path,
    install_logging: impl FnOnce(&Config) -> CliResult<()>,
) -> CliResult<Config> {
    let config = Config::load(path)?;
    install_logging(&config)?;
    info!(event = %Event::ConfigLoaded, path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Builds the parameterized query described by `config`
pub fn build_query(config: &Config) -> CliResult<ParameterizedQuery> {
    let mut query = ParameterizedQuery::new(config.read_template()?, config.read_schema()?)?
        .with_escaper(config.escaper())
        .with_result_source(Arc::new(config.load_results()?));
    if let Some(org) = &config.org {
        query = query.with_org(org.clone());
    }
    Ok(query)
}

/// Applies `values` and describes the rendered query
pub fn render(config: &Config, values: Map<String, Value>) -> CliResult<Value> {
    let mut query = build_query(config)?;
    query.apply(values)?;

    Ok(json!({
        "text": query.text(),
        "missing_params": query.missing_params(),
        "is_safe": query.is_safe(),
    }))
}

/// Describes the template and schema without applying values
pub fn inspect(config: &Config) -> CliResult<Value> {
    let query = build_query(config)?;

    Ok(json!({
        "placeholders": placeholder_names(query.template()),
        "missing_params": query.missing_params(),
        "is_safe": query.is_safe(),
        "org": query.org(),
        "parameters": query.schema(),
    }))
}

/// Resolves the dropdown options of `query_id`
pub fn dropdown(config: &Config, query_id: QueryId) -> CliResult<Value> {
    let store = config.load_results()?;
    let options = dropdown_values(&store, query_id, config.org.as_deref())?;

    Ok(json!({
        "query_id": query_id,
        "options": options,
    }))
}
