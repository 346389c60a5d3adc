//! topparse library
//!
//! Parses the batch output of `top -b -n 1` into [`ProcessRecord`]s and offers
//! read-only queries over the resulting snapshot.
//!
//! # Usage
//!
//! ```no_run
//! use topparse::{ProcessCollection, SortOrder};
//!
//! let snapshot = ProcessCollection::load("/tmp/top.txt")?;
//! println!("{}: {} bytes", snapshot.name(), snapshot.total_memory());
//!
//! for rec in snapshot.walk(SortOrder::Descending).take(5) {
//!     println!("{:>7} {:>12} {}", rec.pid(), rec.vsz(), rec.command());
//! }
//!
//! for (command, records) in snapshot.walk_by_command(SortOrder::Descending) {
//!     println!("{command}: {} processes", records.len());
//! }
//! # Ok::<(), topparse::SnapshotError>(())
//! ```
//!
//! Rows that do not fit the column layout are skipped. Rows whose fields cannot be
//! converted are skipped with a warning. Only an unreadable source is an error.

pub mod error;
pub mod process;

// Re-export main types for convenience
pub use error::{RecordError, SnapshotError};
pub use process::{
    CommandRule, LoadSummary, ParseOptions, ProcessCollection, ProcessRecord, SortOrder,
    BYTES_PER_MIB, HEADER_LINES,
};
