//! Unique commands listing.

use std::path::Path;

use super::report::{format_bytes, load_snapshot};
use crate::config::Config;

/// Lists each distinct command with its process count and summed memory.
pub fn command_unique(file: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(file, config)?;

    println!("🔍 Unique commands in {}", snapshot.name());
    println!("{}", "─".repeat(50));

    for (command, records) in snapshot.walk_by_command(config.sort_order()) {
        let memory: u64 = records.iter().map(|r| r.vsz()).sum();
        println!(
            "   ├─ {:<40} {:>4} × {:>12}",
            command,
            records.len(),
            format_bytes(memory)
        );
    }

    println!(
        "\n📋 Total: {} commands across {} processes",
        snapshot.unique_commands().len(),
        snapshot.len()
    );

    Ok(())
}
