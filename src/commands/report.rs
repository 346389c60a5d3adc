//! Shared output helpers for listing commands.

use std::path::Path;

use topparse::{ProcessCollection, ProcessRecord, SnapshotError};

use crate::cli::OutputFormat;
use crate::config::Config;

/// Loads a snapshot with the parse options of the effective config.
pub fn load_snapshot(file: &Path, config: &Config) -> Result<ProcessCollection, SnapshotError> {
    ProcessCollection::load_with(file, &config.parse_options())
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Renders records as an aligned table.
pub fn render_table(records: &[&ProcessRecord]) -> String {
    let mut out = format!(
        "{:>7} {:>7} {:<12} {:<4} {:>12} {:>5} {:>5} {}\n",
        "PID", "PPID", "USER", "STAT", "VSZ", "%VSZ", "%CPU", "COMMAND"
    );
    for rec in records {
        out.push_str(&format!(
            "{:>7} {:>7} {:<12} {:<4} {:>12} {:>4}% {:>4}% {}\n",
            rec.pid(),
            rec.ppid(),
            rec.user(),
            rec.stat(),
            format_bytes(rec.vsz()),
            rec.percent_vsz(),
            rec.percent_cpu(),
            rec.command()
        ));
    }
    out
}

/// Prints records in the requested format.
pub fn print_records(
    records: &[&ProcessRecord],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => print!("{}", render_table(records)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(records)?),
    }
    Ok(())
}
