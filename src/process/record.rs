//! Row parser for `top -b -n 1` process listings.
//!
//! Each data row of a snapshot looks like
//!
//! ```text
//!   123     1 root     Ss+  10240   1%   2% /usr/bin/sleep
//! ```
//!
//! and is turned into a [`ProcessRecord`] by [`ProcessRecord::from_row`].

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Multiplier applied to `m`-suffixed size tokens.
pub const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Shared column prefix: pid, ppid, user, stat, vsz, %vsz and %cpu.
const COLUMNS: &str = r"^\s*(?P<pid>\d{1,7})\s+(?P<ppid>\d{1,7})\s+(?P<user>\w{1,30})\s+(?P<stat>\S.{0,2})\s+(?P<vsz>\w{1,7})\s+(?P<percent_vsz>\d{1,7})%\s+(?P<percent_cpu>\d{1,7})%\s+";

static RE_ROW_PERMISSIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{COLUMNS}(?P<command>[\w/:\-=;\[\].][\w/ :\-=;\[\].]{{3,}})"
    ))
    .expect("permissive row pattern is valid")
});

static RE_ROW_STRICT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{COLUMNS}(?P<command>\w+)")).expect("strict row pattern is valid")
});

/// Which characters the command column may contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandRule {
    /// Word characters plus path separators, spaces and `:-=;[].`, at least 4 long.
    #[default]
    Permissive,
    /// Word characters only.
    Strict,
}

impl CommandRule {
    fn pattern(self) -> &'static Regex {
        match self {
            CommandRule::Permissive => &RE_ROW_PERMISSIVE,
            CommandRule::Strict => &RE_ROW_STRICT,
        }
    }
}

/// One process row of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pid: u32,
    ppid: u32,
    user: String,
    stat: String,
    vsz: u64,
    percent_vsz: u32,
    percent_cpu: u32,
    command: String,
}

impl ProcessRecord {
    /// Parses a single row.
    ///
    /// Returns `Ok(None)` when the row does not fit the column layout (headings,
    /// blank lines, truncated rows). Returns an error only when the layout matches
    /// but a field cannot be converted to its numeric type.
    pub fn from_row(row: &str, rule: CommandRule) -> Result<Option<ProcessRecord>, RecordError> {
        let row = row.trim_end_matches(['\n', '\r']);
        let caps = match rule.pattern().captures(row) {
            Some(c) => c,
            None => return Ok(None),
        };

        let command = caps["command"].trim_end();
        if command.is_empty() {
            return Ok(None);
        }

        Ok(Some(ProcessRecord {
            pid: parse_field(&caps, "pid")?,
            ppid: parse_field(&caps, "ppid")?,
            user: caps["user"].to_string(),
            stat: caps["stat"].trim().to_string(),
            vsz: parse_vsz(&caps["vsz"])?,
            percent_vsz: parse_field(&caps, "percent_vsz")?,
            percent_cpu: parse_field(&caps, "percent_cpu")?,
            command: command.to_string(),
        }))
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn ppid(&self) -> u32 {
        self.ppid
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn stat(&self) -> &str {
        &self.stat
    }

    /// Virtual memory size in bytes.
    pub fn vsz(&self) -> u64 {
        self.vsz
    }

    pub fn percent_vsz(&self) -> u32 {
        self.percent_vsz
    }

    pub fn percent_cpu(&self) -> u32 {
        self.percent_cpu
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

fn parse_field<T: std::str::FromStr>(
    caps: &Captures<'_>,
    name: &'static str,
) -> Result<T, RecordError> {
    let raw = &caps[name];
    raw.parse().map_err(|_| RecordError::invalid(name, raw))
}

/// Normalizes a VSZ token to bytes.
///
/// `256m` is read as MiB; a bare number is already in bytes. Any other suffix is
/// rejected.
pub fn parse_vsz(token: &str) -> Result<u64, RecordError> {
    let invalid = || RecordError::invalid("vsz", token);
    match token.strip_suffix('m') {
        Some(mib) => {
            let mib: u64 = mib.parse().map_err(|_| invalid())?;
            mib.checked_mul(BYTES_PER_MIB).ok_or_else(invalid)
        }
        None => token.parse().map_err(|_| invalid()),
    }
}
