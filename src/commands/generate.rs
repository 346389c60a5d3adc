//! Generate snapshot command implementation.
//!
//! Writes a synthetic `top -b -n 1` listing for manual testing.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use topparse::HEADER_LINES;

/// Largest pid the row parser accepts (7 digits).
pub const MAX_PID: u32 = 9_999_999;
/// Widest gap between consecutive generated pids.
const MAX_PID_STEP: u32 = 49;
/// Row cap that keeps every generated pid within [`MAX_PID`].
pub const MAX_SNAPSHOT_ROWS: usize = (MAX_PID / MAX_PID_STEP) as usize;

const USERS: &[&str] = &["root", "daemon", "www_data", "postgres", "nobody", "app"];
const STATES: &[&str] = &["S", "R", "Ss", "S<", "Sl", "R+", "Ss+", "D", "Z"];
const COMMANDS: &[&str] = &[
    "/sbin/init",
    "/usr/sbin/sshd -D",
    "[kworker/0:1]",
    "/usr/bin/python3 -m http.server",
    "nginx: worker process",
    "/usr/lib/systemd/systemd-journald",
    "postgres: writer",
    "/bin/bash",
    "/usr/bin/dockerd -H fd://",
    "/usr/sbin/cron -f",
];

/// Generates a synthetic snapshot file.
pub fn command_generate_snapshot(
    output: PathBuf,
    count: usize,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!(
        "Generating snapshot: count={}, seed={:?}, output={}",
        count,
        seed,
        output.display()
    );

    if count > MAX_SNAPSHOT_ROWS {
        return Err(format!(
            "count {} exceeds maximum of {} rows per snapshot",
            count, MAX_SNAPSHOT_ROWS
        )
        .into());
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let content = render_snapshot(&mut rng, count, Utc::now());

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, &content)?;
        println!(
            "✅ Generated snapshot: {} processes in {}",
            count,
            output.display()
        );
    }

    Ok(())
}

/// Renders a header of [`HEADER_LINES`] lines followed by `count` process rows.
/// `count` is clamped to [`MAX_SNAPSHOT_ROWS`].
pub fn render_snapshot(rng: &mut impl Rng, count: usize, at: DateTime<Utc>) -> String {
    let count = count.min(MAX_SNAPSHOT_ROWS);
    let mut lines = vec![
        format!(
            "top - {} up {} days, load average: {:.2}, {:.2}, {:.2}",
            at.format("%H:%M:%S"),
            rng.gen_range(0..400),
            rng.gen_range(0.0..4.0),
            rng.gen_range(0.0..4.0),
            rng.gen_range(0.0..4.0)
        ),
        format!(
            "Mem: {}K used, {}K free, 0K shrd, {}K buff, {}K cached",
            rng.gen_range(100_000..8_000_000),
            rng.gen_range(100_000..8_000_000),
            rng.gen_range(1_000..100_000),
            rng.gen_range(1_000..1_000_000)
        ),
        format!(
            "CPU: {:>3}% usr {:>3}% sys {:>3}% idle",
            rng.gen_range(0..50),
            rng.gen_range(0..20),
            rng.gen_range(30..100)
        ),
        "  PID  PPID USER     STAT   VSZ %VSZ %CPU COMMAND".to_string(),
    ];
    debug_assert_eq!(lines.len(), HEADER_LINES);

    let mut pids: Vec<u32> = Vec::with_capacity(count);
    let mut next_pid: u32 = 1;
    for _ in 0..count {
        let pid = next_pid;
        next_pid += rng.gen_range(1..=MAX_PID_STEP);
        let ppid = if pids.is_empty() {
            0
        } else {
            pids[rng.gen_range(0..pids.len())]
        };
        pids.push(pid);

        let vsz = if rng.gen_bool(0.5) {
            rng.gen_range(1024..10_000_000u64).to_string()
        } else {
            format!("{}m", rng.gen_range(1..100_000u64))
        };

        lines.push(format!(
            "{:>5} {:>5} {:<8} {:<4} {:>7} {:>3}% {:>3}% {}",
            pid,
            ppid,
            USERS[rng.gen_range(0..USERS.len())],
            STATES[rng.gen_range(0..STATES.len())],
            vsz,
            rng.gen_range(0..20),
            rng.gen_range(0..50),
            COMMANDS[rng.gen_range(0..COMMANDS.len())]
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use topparse::{ParseOptions, ProcessCollection, SortOrder};

    #[test]
    fn test_generated_snapshot_parses_completely() {
        let mut rng = StdRng::seed_from_u64(7);
        let text = render_snapshot(&mut rng, 50, Utc::now());
        let snapshot =
            ProcessCollection::from_reader("generated", Cursor::new(text), &ParseOptions::default())
                .unwrap();

        assert_eq!(snapshot.len(), 50);
        assert_eq!(snapshot.summary().skipped, 0);
        assert_eq!(snapshot.summary().rejected, 0);
        assert!(snapshot.get(1).is_some());
        assert_eq!(snapshot.get(1).map(|r| r.ppid()), Some(0));
    }

    #[test]
    fn test_row_cap_keeps_pids_parseable() {
        let mut rng = StdRng::seed_from_u64(3);
        let text = render_snapshot(&mut rng, MAX_SNAPSHOT_ROWS + 10, Utc::now());
        let snapshot =
            ProcessCollection::from_reader("generated", Cursor::new(text), &ParseOptions::default())
                .unwrap();

        assert_eq!(snapshot.len(), MAX_SNAPSHOT_ROWS);
        assert_eq!(snapshot.summary().skipped, 0);
        assert!(snapshot.walk(SortOrder::Ascending).all(|r| r.pid() <= MAX_PID));
    }

    #[test]
    fn test_command_rejects_oversized_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        let result = command_generate_snapshot(path.clone(), MAX_SNAPSHOT_ROWS + 1, Some(1));
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_same_seed_same_snapshot() {
        let at = Utc::now();
        let a = render_snapshot(&mut StdRng::seed_from_u64(42), 10, at);
        let b = render_snapshot(&mut StdRng::seed_from_u64(42), 10, at);
        assert_eq!(a, b);
    }
}
