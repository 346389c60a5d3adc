//! Summary command implementation.
//!
//! Prints snapshot totals and the counters gathered while loading.

use serde::Serialize;
use std::path::Path;

use topparse::{LoadSummary, ProcessCollection, BYTES_PER_MIB};

use super::report::{format_bytes, load_snapshot};
use crate::cli::OutputFormat;
use crate::config::Config;

/// Serializable view of a loaded snapshot.
#[derive(Debug, Serialize)]
pub struct SnapshotSummary {
    pub name: String,
    pub processes: usize,
    pub total_memory_bytes: u64,
    pub unique_commands: usize,
    pub load: LoadSummary,
}

impl SnapshotSummary {
    pub fn from_collection(snapshot: &ProcessCollection) -> Self {
        Self {
            name: snapshot.name().to_string(),
            processes: snapshot.len(),
            total_memory_bytes: snapshot.total_memory(),
            unique_commands: snapshot.unique_commands().len(),
            load: *snapshot.summary(),
        }
    }
}

/// Prints a summary of one snapshot.
pub fn command_summary(
    file: &Path,
    format: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(file, config)?;
    let summary = SnapshotSummary::from_collection(&snapshot);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&summary)?),
        OutputFormat::Table => {
            println!("📄 Snapshot: {}", summary.name);
            println!("================================================");
            println!("   📊 Processes:        {}", summary.processes);
            println!(
                "   📈 Total memory:     {} ({} MiB)",
                format_bytes(summary.total_memory_bytes),
                summary.total_memory_bytes / BYTES_PER_MIB
            );
            println!("   🔍 Unique commands:  {}", summary.unique_commands);
            println!("   📁 Lines after header: {}", summary.load.lines_read);
            println!("      ├─ Parsed:     {}", summary.load.parsed);
            println!("      ├─ Skipped:    {}", summary.load.skipped);
            println!("      ├─ Rejected:   {}", summary.load.rejected);
            println!("      └─ Duplicates: {}", summary.load.duplicates);
        }
    }

    Ok(())
}
