//! Walk-style listings: by memory, by command group, by command and by parent.

use std::path::Path;
use tracing::debug;

use topparse::{ProcessRecord, SortOrder};

use super::report::{format_bytes, load_snapshot, print_records, render_table};
use crate::cli::OutputFormat;
use crate::config::Config;

/// Lists all processes ordered by virtual memory size.
pub fn command_walk(
    file: &Path,
    order: Option<SortOrder>,
    limit: Option<usize>,
    format: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(file, config)?;
    let order = order.unwrap_or_else(|| config.sort_order());
    let limit = limit.or(config.walk_limit).unwrap_or(usize::MAX);
    debug!("Walking {} in {:?} order, limit {}", snapshot.name(), order, limit);

    let records: Vec<&ProcessRecord> = snapshot.walk(order).take(limit).collect();
    print_records(&records, format)
}

/// Walks processes grouped by command.
pub fn command_groups(
    file: &Path,
    order: Option<SortOrder>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(file, config)?;
    let order = order.unwrap_or_else(|| config.sort_order());

    for (command, records) in snapshot.walk_by_command(order) {
        let memory: u64 = records.iter().map(|r| r.vsz()).sum();
        println!(
            "\n🏷️  {} ({} processes, {})",
            command,
            records.len(),
            format_bytes(memory)
        );
        print!("{}", render_table(&records));
    }

    Ok(())
}

/// Lists processes whose command matches exactly.
pub fn command_find(
    file: &Path,
    command: &str,
    format: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(file, config)?;
    let records = snapshot.records_for_command(command);
    if records.is_empty() && format == OutputFormat::Table {
        println!("No processes running '{}' in {}", command, snapshot.name());
        return Ok(());
    }
    print_records(&records, format)
}

/// Lists direct children of a parent pid.
pub fn command_children(
    file: &Path,
    ppid: u32,
    format: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(file, config)?;
    if format == OutputFormat::Table {
        match snapshot.get(ppid) {
            Some(parent) => println!("👤 Parent {} ({})", ppid, parent.command()),
            None => println!("👤 Parent {} (not in snapshot)", ppid),
        }
    }
    print_records(&snapshot.children_of(ppid), format)
}
