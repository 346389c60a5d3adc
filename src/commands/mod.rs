//! CLI command implementations for topparse.
//!
//! This module provides implementations for all CLI subcommands:
//! - `summary`: Snapshot totals and load counters
//! - `walk`: Memory-ordered, grouped, per-command and per-parent listings
//! - `unique`: Unique command listing
//! - `config`: Configuration file generation
//! - `generate`: Synthetic snapshot generation

pub mod config;
pub mod generate;
pub mod report;
pub mod summary;
pub mod unique;
pub mod walk;

// Re-export command functions
pub use config::command_config;
pub use generate::command_generate_snapshot;
pub use summary::command_summary;
pub use unique::command_unique;
pub use walk::{command_children, command_find, command_groups, command_walk};
