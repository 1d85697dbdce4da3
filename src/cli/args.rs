//! CLI argument definitions using clap
//!
//! Commands:
//! - paramquery render --config <path>
//! - paramquery inspect --config <path>
//! - paramquery dropdown --config <path> --query-id <id>

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::dropdown::QueryId;

/// paramquery - validate parameters and render query templates
#[derive(Parser, Debug)]
#[command(name = "paramquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply parameter values read from stdin and print the rendered query
    Render {
        /// Path to configuration file
        #[arg(long, default_value = "./paramquery.json")]
        config: PathBuf,
    },

    /// Print the template's placeholders without applying values
    Inspect {
        /// Path to configuration file
        #[arg(long, default_value = "./paramquery.json")]
        config: PathBuf,
    },

    /// Print the dropdown options produced by a query's latest result
    Dropdown {
        /// Path to configuration file
        #[arg(long, default_value = "./paramquery.json")]
        config: PathBuf,

        /// Query whose result supplies the options
        #[arg(long)]
        query_id: QueryId,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

impl Command {
    /// Path of the configuration file the command reads
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Render { config }
            | Command::Inspect { config }
            | Command::Dropdown { config, .. } => config,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Render { .. } => "render",
            Command::Inspect { .. } => "inspect",
            Command::Dropdown { .. } => "dropdown",
        }
    }
}
