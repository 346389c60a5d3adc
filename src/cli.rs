//! CLI arguments and subcommands for topparse.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use topparse::SortOrder;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Output format for record listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// Version string shown by `--version`, with build metadata from vergen.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (git ",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    ")"
);

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "topparse",
    about = "Parse `top -b -n 1` snapshots and report on process memory",
    long_about = "Parse `top -b -n 1` snapshots and report on process memory.\n\n\
                  Reads a saved batch-mode top listing, skips the summary header and \
                  turns every process row into a record that can be walked by memory \
                  size, grouped by command or totalled.",
    version,
    long_version = LONG_VERSION,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (overrides config file)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Number of summary lines to skip before the process table
    #[arg(long)]
    pub header_lines: Option<usize>,

    /// Only accept commands made of word characters
    #[arg(long)]
    pub strict_commands: bool,
}

/// Subcommands for snapshot reports
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show record count, load counters and total memory
    Summary {
        /// Snapshot file
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List processes ordered by virtual memory size
    Walk {
        /// Snapshot file
        file: PathBuf,

        /// Sort direction (default from config, otherwise descending)
        #[arg(short = 'o', long, value_enum)]
        order: Option<SortOrder>,

        /// Show at most N processes
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List unique commands with process count and memory
    #[command(name = "commands")]
    UniqueCommands {
        /// Snapshot file
        file: PathBuf,
    },

    /// Walk processes grouped by command
    Groups {
        /// Snapshot file
        file: PathBuf,

        /// Sort direction inside each group
        #[arg(short = 'o', long, value_enum)]
        order: Option<SortOrder>,
    },

    /// List processes running exactly the given command
    Find {
        /// Snapshot file
        file: PathBuf,

        /// Command string (exact, case-sensitive)
        command: String,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List direct children of a parent process
    Children {
        /// Snapshot file
        file: PathBuf,

        /// Parent process id
        ppid: u32,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Generate a synthetic `top -b` snapshot file
    GenerateSnapshot {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long, default_value = "top-snapshot.txt")]
        output: PathBuf,

        /// Number of process rows
        #[arg(short = 'n', long, default_value_t = 40)]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}
