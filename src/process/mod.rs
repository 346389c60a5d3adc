//! Process snapshot modules.
//!
//! This module provides:
//! - `record`: Row parsing for `top -b` process listings
//! - `collection`: Snapshot loading plus walk, grouping and total queries

pub mod collection;
pub mod record;

// Re-export commonly used types
pub use collection::{LoadSummary, ParseOptions, ProcessCollection, SortOrder, HEADER_LINES};
pub use record::{parse_vsz, CommandRule, ProcessRecord, BYTES_PER_MIB};
