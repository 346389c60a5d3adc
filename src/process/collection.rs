//! Snapshot loading and queries over the parsed process set.
//!
//! A [`ProcessCollection`] is built once from a `top -b -n 1` dump and then only
//! read. Every ordered view is recomputed from the pid map on each call.

use ahash::AHashMap as HashMap;
use ahash::AHashSet as HashSet;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::SnapshotError;
use crate::process::record::{CommandRule, ProcessRecord};

/// Number of summary lines `top -b` prints before the process table.
pub const HEADER_LINES: usize = 4;

/// Direction of a walk by virtual memory size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[value(alias = "asc")]
    Ascending,
    /// Largest consumers first.
    #[default]
    #[value(alias = "desc")]
    Descending,
}

/// Options controlling how a snapshot is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Lines dropped unconditionally before the table.
    pub header_lines: usize,
    pub command_rule: CommandRule,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            header_lines: HEADER_LINES,
            command_rule: CommandRule::default(),
        }
    }
}

/// Counters collected while loading a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Lines examined after the header.
    pub lines_read: usize,
    pub parsed: usize,
    /// Lines that did not fit the column layout.
    pub skipped: usize,
    /// Lines that fit the layout but carried an unconvertible field.
    pub rejected: usize,
    /// Records replaced by a later row with the same pid.
    pub duplicates: usize,
}

/// All process records parsed from one snapshot, keyed by pid.
#[derive(Debug)]
pub struct ProcessCollection {
    source: PathBuf,
    records: HashMap<u32, ProcessRecord>,
    summary: LoadSummary,
}

impl ProcessCollection {
    /// Loads a snapshot file with the default options.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        Self::load_with(path, &ParseOptions::default())
    }

    /// Loads a snapshot file.
    pub fn load_with(path: impl AsRef<Path>, opts: &ParseOptions) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path, BufReader::new(file), opts)
    }

    /// Builds a collection from any line source. `source` only names the snapshot.
    pub fn from_reader<R: BufRead>(
        source: impl Into<PathBuf>,
        reader: R,
        opts: &ParseOptions,
    ) -> Result<Self, SnapshotError> {
        let source = source.into();
        let mut records = HashMap::new();
        let mut summary = LoadSummary::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| SnapshotError::Read {
                path: source.clone(),
                source: e,
            })?;
            if idx < opts.header_lines {
                continue;
            }
            summary.lines_read += 1;

            match ProcessRecord::from_row(&line, opts.command_rule) {
                Ok(Some(rec)) => {
                    summary.parsed += 1;
                    if records.insert(rec.pid(), rec).is_some() {
                        summary.duplicates += 1;
                    }
                }
                Ok(None) => {
                    summary.skipped += 1;
                    debug!("Skipping line {} of {}: no match", idx + 1, source.display());
                }
                Err(e) => {
                    summary.rejected += 1;
                    warn!("Rejecting line {} of {}: {}", idx + 1, source.display(), e);
                }
            }
        }

        info!(
            "Loaded {} processes from {} ({} skipped, {} rejected, {} duplicates)",
            records.len(),
            source.display(),
            summary.skipped,
            summary.rejected,
            summary.duplicates
        );

        Ok(Self {
            source,
            records,
            summary,
        })
    }

    /// Final path component of the source, or the whole source if it has none.
    pub fn name(&self) -> &str {
        self.source
            .file_name()
            .and_then(|s| s.to_str())
            .or_else(|| self.source.to_str())
            .unwrap_or_default()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn summary(&self) -> &LoadSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessRecord> {
        self.records.get(&pid)
    }

    /// Sum of virtual memory size in bytes.
    pub fn total_memory(&self) -> u64 {
        self.records.values().map(ProcessRecord::vsz).sum()
    }

    /// All records ordered by virtual memory size. Equal sizes are ordered by pid.
    pub fn walk(&self, order: SortOrder) -> impl Iterator<Item = &ProcessRecord> + '_ {
        let mut sorted: Vec<&ProcessRecord> = self.records.values().collect();
        sorted.sort_by(|a, b| {
            let by_size = match order {
                SortOrder::Ascending => a.vsz().cmp(&b.vsz()),
                SortOrder::Descending => b.vsz().cmp(&a.vsz()),
            };
            by_size.then_with(|| a.pid().cmp(&b.pid()))
        });
        sorted.into_iter()
    }

    /// Distinct commands in the order the default walk first meets them.
    pub fn unique_commands(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.walk(SortOrder::default())
            .map(ProcessRecord::command)
            .filter(|cmd| seen.insert(*cmd))
            .collect()
    }

    /// One group per unique command, each holding its records in `order`.
    pub fn walk_by_command(&self, order: SortOrder) -> Vec<(&str, Vec<&ProcessRecord>)> {
        let mut groups: HashMap<&str, Vec<&ProcessRecord>> = HashMap::new();
        for rec in self.walk(order) {
            groups.entry(rec.command()).or_default().push(rec);
        }

        self.unique_commands()
            .into_iter()
            .map(|cmd| (cmd, groups.remove(cmd).unwrap_or_default()))
            .collect()
    }

    /// Records whose command equals `command` exactly.
    pub fn records_for_command(&self, command: &str) -> Vec<&ProcessRecord> {
        self.walk(SortOrder::default())
            .filter(|rec| rec.command() == command)
            .collect()
    }

    /// Records whose parent is `ppid`.
    pub fn children_of(&self, ppid: u32) -> Vec<&ProcessRecord> {
        self.walk(SortOrder::default())
            .filter(|rec| rec.ppid() == ppid)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "Mem: 1000K used, 2000K free\n\
                          CPU:  1% usr  2% sys\n\
                          Load average: 0.00 0.01 0.05\n\
                          \x20 PID  PPID USER     STAT   VSZ %VSZ %CPU COMMAND\n";

    fn collection(rows: &str) -> ProcessCollection {
        let text = format!("{HEADER}{rows}");
        ProcessCollection::from_reader("snap/top.txt", Cursor::new(text), &ParseOptions::default())
            .expect("in-memory read cannot fail")
    }

    fn pids<'a>(it: impl IntoIterator<Item = &'a ProcessRecord>) -> Vec<u32> {
        it.into_iter().map(ProcessRecord::pid).collect()
    }

    #[test]
    fn test_name_is_base_name() {
        assert_eq!(collection("").name(), "top.txt");
    }

    #[test]
    fn test_header_only_is_empty() {
        let c = collection("");
        assert!(c.is_empty());
        assert_eq!(c.total_memory(), 0);
        assert!(c.unique_commands().is_empty());
        assert_eq!(c.walk(SortOrder::Ascending).count(), 0);
        assert_eq!(c.summary().lines_read, 0);
    }

    #[test]
    fn test_header_rows_never_parsed() {
        // A valid row inside the header window is dropped with the header.
        let text = "  1 0 root S 100 0% 0% /sbin/init\nx\ny\nz\n  2 1 root S 200 0% 0% /bin/bash\n";
        let c = ProcessCollection::from_reader("t", Cursor::new(text), &ParseOptions::default())
            .unwrap();
        assert_eq!(c.len(), 1);
        assert!(c.get(1).is_none());
        assert!(c.get(2).is_some());
    }

    #[test]
    fn test_custom_header_lines() {
        let text = "  1 0 root S 100 0% 0% /sbin/init\n  2 1 root S 200 0% 0% /bin/bash\n";
        let opts = ParseOptions {
            header_lines: 0,
            ..ParseOptions::default()
        };
        let c = ProcessCollection::from_reader("t", Cursor::new(text), &opts).unwrap();
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_total_memory_single_record() {
        let c = collection("  10 1 root S 4096 0% 0% /bin/bash\n");
        assert_eq!(c.total_memory(), 4096);
    }

    #[test]
    fn test_walk_orders_and_ties() {
        let c = collection(
            "  30 1 root S 500 0% 0% /bin/aaaa\n\
             \x20 10 1 root S 500 0% 0% /bin/bbbb\n\
             \x20 20 1 root S 100 0% 0% /bin/cccc\n\
             \x20 40 1 root S 900 0% 0% /bin/dddd\n",
        );
        assert_eq!(pids(c.walk(SortOrder::Ascending)), vec![20, 10, 30, 40]);
        assert_eq!(pids(c.walk(SortOrder::Descending)), vec![40, 10, 30, 20]);
        assert_eq!(
            pids(c.walk(SortOrder::default())),
            pids(c.walk(SortOrder::Descending))
        );
    }

    #[test]
    fn test_unique_commands_first_seen_order() {
        let c = collection(
            "  1 0 root S 100 0% 0% /bin/bash\n\
             \x20 2 0 root S 300 0% 0% /usr/sbin/sshd\n\
             \x20 3 0 root S 200 0% 0% /bin/bash\n",
        );
        assert_eq!(c.unique_commands(), vec!["/usr/sbin/sshd", "/bin/bash"]);
        assert_eq!(c.unique_commands(), c.unique_commands());
    }

    #[test]
    fn test_walk_by_command_groups() {
        let c = collection(
            "  1 0 root S 100 0% 0% /bin/bash\n\
             \x20 2 0 root S 300 0% 0% /usr/sbin/sshd\n\
             \x20 3 0 root S 200 0% 0% /bin/bash\n",
        );
        let groups = c.walk_by_command(SortOrder::Ascending);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "/usr/sbin/sshd");
        assert_eq!(pids(groups[0].1.iter().copied()), vec![2]);
        assert_eq!(groups[1].0, "/bin/bash");
        assert_eq!(pids(groups[1].1.iter().copied()), vec![1, 3]);
    }

    #[test]
    fn test_records_for_command_exact() {
        let c = collection(
            "  1 0 root S 100 0% 0% /bin/bash\n\
             \x20 2 0 root S 300 0% 0% /bin/Bash\n",
        );
        assert_eq!(pids(c.records_for_command("/bin/bash")), vec![1]);
        assert!(c.records_for_command("/bin/zsh").is_empty());
        assert!(c.records_for_command("/bin/bas").is_empty());
    }

    #[test]
    fn test_children_of() {
        let c = collection(
            "  1 0 root S 100 0% 0% /sbin/init\n\
             \x20 2 1 root S 300 0% 0% /usr/sbin/sshd\n\
             \x20 3 2 root S 200 0% 0% /bin/bash\n\
             \x20 4 1 root S 400 0% 0% /sbin/udevd\n",
        );
        assert_eq!(pids(c.children_of(1)), vec![4, 2]);
        assert!(c.children_of(3).is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let c = collection(
            "  1 0 root S 100 0% 0% /sbin/init\n\
             \n\
             \x20 2 1 root S 12k 0% 0% /usr/sbin/sshd\n\
             \x20 1 0 root S 150 0% 0% /sbin/init2\n",
        );
        let s = c.summary();
        assert_eq!(s.lines_read, 4);
        assert_eq!(s.parsed, 2);
        assert_eq!(s.skipped, 1);
        assert_eq!(s.rejected, 1);
        assert_eq!(s.duplicates, 1);
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(1).map(ProcessRecord::command), Some("/sbin/init2"));
    }
}
