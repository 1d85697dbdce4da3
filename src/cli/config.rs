//! Configuration file
//!
//! ```json
//! {
//!   "template_path": "query.sql",
//!   "schema_path": "schema.json",
//!   "results_path": "results.json",
//!   "org": "default",
//!   "escape": "sql",
//!   "log_level": "info",
//!   "log_format": "pretty"
//! }
//! ```
//!
//! Only `template_path` is required. Relative paths are resolved against the
//! directory holding the configuration file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dropdown::ResultStore;
use crate::observability::{Event, LogFormat, LoggingConfig};
use crate::parameters::{EscapeCapability, NoEscape, ParameterSchema, SqlQuoteEscaper};

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Query template (required)
    pub template_path: String,

    /// Parameter schema, a JSON array of definitions (optional, default: none)
    #[serde(default)]
    pub schema_path: Option<String>,

    /// Query result fixtures backing dropdown parameters (optional)
    #[serde(default)]
    pub results_path: Option<String>,

    /// Org scope for dropdown lookups (optional)
    #[serde(default)]
    pub org: Option<String>,

    /// Escaping offered by the data source: "none" or "sql" (default "none")
    #[serde(default = "default_escape")]
    pub escape: String,

    /// Log filter directive (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "json", "pretty" or "compact" (default "pretty")
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_escape() -> String {
    "none".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    LogFormat::default().as_str().to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.template_path.trim().is_empty() {
            return Err(CliError::config_error("template_path must not be empty"));
        }

        if !matches!(self.escape.as_str(), "none" | "sql") {
            return Err(CliError::config_error(format!(
                "Invalid escape: '{}'. Expected 'none' or 'sql'.",
                self.escape
            )));
        }

        self.log_format
            .parse::<LogFormat>()
            .map_err(|e| CliError::config_error(format!("Invalid log_format: {}", e)))?;

        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Reads the query template
    pub fn read_template(&self) -> CliResult<String> {
        let path = self.resolve(&self.template_path);
        fs::read_to_string(&path).map_err(|e| {
            CliError::io_error(format!("Failed to read template '{}': {}", path.display(), e))
        })
    }

    /// Reads the parameter schema, empty when none is configured
    pub fn read_schema(&self) -> CliResult<ParameterSchema> {
        let Some(schema_path) = &self.schema_path else {
            return Ok(ParameterSchema::empty());
        };

        let path = self.resolve(schema_path);
        let content = fs::read_to_string(&path).map_err(|e| {
            CliError::io_error(format!("Failed to read schema '{}': {}", path.display(), e))
        })?;
        Ok(ParameterSchema::from_json_str(&content)?)
    }

    /// Loads the result store, empty when no fixtures are configured
    pub fn load_results(&self) -> CliResult<ResultStore> {
        let mut store = ResultStore::new();
        if let Some(results_path) = &self.results_path {
            let path = self.resolve(results_path);
            let records = store.load_file(&path)?;
            debug!(
                event = %Event::ResultsLoaded,
                path = %path.display(),
                records,
                "Loaded query results"
            );
        }
        Ok(store)
    }

    /// Returns the escape capability of the configured data source
    pub fn escaper(&self) -> Arc<dyn EscapeCapability> {
        match self.escape.as_str() {
            "sql" => Arc::new(SqlQuoteEscaper),
            _ => Arc::new(NoEscape),
        }
    }

    /// Logging settings, with environment overrides applied
    pub fn logging(&self) -> LoggingConfig {
        let format = self.log_format.parse().unwrap_or_default();
        LoggingConfig::new(self.log_level.clone(), format).with_env_overrides()
    }
}
