//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Test suite inspection tool
#[derive(Parser, Debug)]
#[command(name = "suite-inspector")]
#[command(version)]
#[command(about = "Export, retry and parallel-eligibility tooling for test suite trees")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export leaf tests and their inherited properties
    Export(ExportArgs),

    /// Build a query re-selecting the failed tests of a run
    Retry(RetryArgs),

    /// List located fixtures
    Fixtures(FixturesArgs),

    /// Decide whether a test may run in parallel with its siblings
    Parallel(ParallelArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for export command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Suite definition (YAML or JSON)
    pub suite: PathBuf,

    /// Property key to export; repeat for more columns
    #[arg(short, long = "key")]
    pub keys: Vec<String>,

    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Arguments for retry command
#[derive(Parser, Debug)]
pub struct RetryArgs {
    /// Result tree of a finished run (YAML or JSON)
    pub results: PathBuf,

    /// Write the query to this file (only when something failed)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Escape quotes for embedding in a shell argument
    #[arg(long)]
    pub escape_quotes: bool,

    /// Also print a run summary
    #[arg(short, long)]
    pub summary: bool,
}

/// Arguments for fixtures command
#[derive(Parser, Debug)]
pub struct FixturesArgs {
    /// Suite definition or result tree (YAML or JSON)
    pub tree: PathBuf,

    /// Output format (text, json, json-pretty)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Arguments for parallel command
#[derive(Parser, Debug)]
pub struct ParallelArgs {
    /// Suite definition (YAML or JSON)
    pub suite: PathBuf,

    /// Full name of the test
    pub test: String,

    /// Dispatch snapshot published by a running scheduler (YAML or JSON)
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// Output format (text, json, json-pretty)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./suite-inspector.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Show environment overrides instead
        #[arg(long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate; defaults to the first file found
        file: Option<PathBuf>,
    },
}
