use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The molsieve developers",
    version,
    about = "molsieve - screen molecule tables against substructure patterns, preserving input order.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of worker threads used when `--max-active` is not given.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a CSV table of molecules into matched and unmatched tables.
    Screen(ScreenArgs),
}

/// Arguments for the `screen` subcommand.
#[derive(Args, Debug)]
pub struct ScreenArgs {
    // --- Core Arguments ---
    /// Path to the input CSV table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the CSV table of rows matching at least one pattern.
    #[arg(long, required = true, value_name = "PATH")]
    pub matched: PathBuf,

    /// Path for the CSV table of all other rows.
    #[arg(long, required = true, value_name = "PATH")]
    pub unmatched: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Substructure pattern in SMILES syntax. Can be used multiple times and
    /// replaces the patterns of the config file.
    #[arg(short, long = "pattern", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    // --- Table Overrides ---
    /// Name of the column holding the molecule SMILES.
    #[arg(long, value_name = "NAME")]
    pub column: Option<String>,

    /// Name of the column identifying each row. Defaults to the row number.
    #[arg(long, value_name = "NAME")]
    pub key_column: Option<String>,

    // --- Output Overrides ---
    /// Append the per-pattern match counts to matched rows.
    #[arg(long)]
    pub counts: bool,

    /// Append the matched atom and bond indices (and counts) to matched rows.
    #[arg(long)]
    pub positions: bool,

    /// Write a TOML run summary to this path.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    // --- Processing Overrides ---
    /// Maximum number of rows in flight. Defaults to ten times `--max-active`.
    #[arg(long, value_name = "INT")]
    pub max_queue_size: Option<usize>,

    /// Maximum number of rows evaluated concurrently.
    #[arg(long, value_name = "INT")]
    pub max_active: Option<usize>,

    /// Maximum number of search steps per pattern and row. A row exceeding it
    /// is reported as an evaluation failure and written to the unmatched table.
    #[arg(long, value_name = "INT")]
    pub search_limit: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S processing.max-active=4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
