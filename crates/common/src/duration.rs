//! Log-based duration extraction
//!
//! Repository synchronization and onboarding are long-running, and their only
//! reliable completion record is textual log output. These helpers scan that
//! output and produce duration telemetry the runner pushes to the metrics
//! gateway.
//!
//! The reposync log format interleaves per-channel sections:
//!
//! ```text
//! Channel: sle-product-pool
//! Sync completed.
//! Total time: 0:14:22
//! ```

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};

static CHANNEL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Channel: (\S+)").expect("channel pattern"));
static TOTAL_TIME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Total time: (\d+):(\d{2}):(\d{2})").expect("total time pattern"));

/// An extracted duration, immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationRecord {
    /// What the duration belongs to: host, channel or product name.
    pub subject: String,
    pub seconds: u64,
    /// The log line the value was derived from.
    pub line: String,
}

/// Aggregate result of scanning a log for one or more channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub seconds: u64,
    /// Number of `Total time` lines that contributed.
    pub matches: usize,
}

/// Parse a `H:M:S` clock string into seconds.
pub fn hms_to_seconds(hms: &str) -> Option<u64> {
    let mut parts = hms.splitn(3, ':');
    let h: u64 = parts.next()?.trim().parse().ok()?;
    let m: u64 = parts.next()?.trim().parse().ok()?;
    let s: u64 = parts.next()?.trim().parse().ok()?;
    Some(h * 3600 + m * 60 + s)
}

/// Total synchronization time for `targets` from reposync log output.
///
/// The scan is strictly sequential: a `Channel:` line selects the current
/// channel and arms evaluation when that channel is in the target set; the
/// next `Total time:` line, while armed, records a value and disarms. For a
/// single requested channel the last-seen occurrence wins, so a re-synced
/// channel reports its most recent sync. For multi-channel aggregate queries
/// every matched occurrence contributes to the sum. Fails with
/// [`Error::DurationNotFound`] when nothing matched.
pub fn channel_sync_seconds(log: &str, targets: &[&str]) -> Result<SyncReport> {
    let wanted: HashSet<&str> = targets.iter().copied().collect();
    let mut evaluate = false;
    let mut found: Vec<u64> = Vec::new();

    for line in log.lines() {
        if let Some(cap) = CHANNEL_LINE.captures(line) {
            evaluate = wanted.contains(&cap[1]);
            continue;
        }
        if !evaluate {
            continue;
        }
        if let Some(cap) = TOTAL_TIME_LINE.captures(line) {
            let h: u64 = cap[1].parse().unwrap_or(0);
            let m: u64 = cap[2].parse().unwrap_or(0);
            let s: u64 = cap[3].parse().unwrap_or(0);
            found.push(h * 3600 + m * 60 + s);
            evaluate = false;
        }
    }

    if found.is_empty() {
        return Err(Error::DurationNotFound(targets.join(", ")));
    }
    if found.len() < targets.len() {
        warn!(
            requested = targets.len(),
            matches = found.len(),
            "fewer sync durations found than channels requested"
        );
    }
    let seconds = if targets.len() == 1 {
        found.last().copied().unwrap_or(0)
    } else {
        found.iter().sum()
    };
    Ok(SyncReport {
        seconds,
        matches: found.len(),
    })
}

/// Single-channel convenience over [`channel_sync_seconds`]; reports the
/// channel's most recent sync.
pub fn single_channel_sync(log: &str, channel: &str) -> Result<DurationRecord> {
    let report = channel_sync_seconds(log, &[channel])?;
    Ok(DurationRecord {
        subject: channel.to_string(),
        seconds: report.seconds,
        line: format!("last Total time of {} occurrence(s)", report.matches),
    })
}

/// Elapsed seconds between the first log line matching `start` and the first
/// matching `end`, using the leading `YYYY-MM-DD HH:MM:SS` timestamp on each.
///
/// Used for bootstrap and onboarding durations, where the product logs the
/// begin and end of the operation but no total.
pub fn elapsed_between_timestamps(log: &str, start: &Regex, end: &Regex) -> Result<Duration> {
    static STAMP: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2})").expect("timestamp"));

    let stamp_of = |pattern: &Regex| -> Option<NaiveDateTime> {
        log.lines()
            .find(|line| pattern.is_match(line))
            .and_then(|line| STAMP.captures(line))
            .and_then(|cap| {
                NaiveDateTime::parse_from_str(&cap[1].replace('T', " "), "%Y-%m-%d %H:%M:%S").ok()
            })
    };

    let begin = stamp_of(start)
        .ok_or_else(|| Error::DurationNotFound(format!("start marker /{start}/")))?;
    let finish =
        stamp_of(end).ok_or_else(|| Error::DurationNotFound(format!("end marker /{end}/")))?;

    let secs = (finish - begin).num_seconds();
    if secs < 0 {
        return Err(Error::DurationNotFound(format!(
            "end marker /{end}/ precedes start marker"
        )));
    }
    Ok(Duration::from_secs(secs as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const SYNC_LOG: &str = "\
Channel: sle-product-pool
Repo URL: https://updates.example.com/pool
Sync completed.
Total time: 01:02:03
Channel: sle-product-updates
Sync completed.
Total time: 0:00:10
Channel: debian-main
Sync completed.
Total time: 0:01:00
";

    #[test]
    fn single_channel_round_trip() {
        let report = channel_sync_seconds(SYNC_LOG, &["sle-product-pool"]).unwrap();
        assert_eq!(report.seconds, 3723);
        assert_eq!(report.matches, 1);
    }

    #[test]
    fn multi_channel_sum_counts_each_match() {
        let report =
            channel_sync_seconds(SYNC_LOG, &["sle-product-updates", "debian-main"]).unwrap();
        assert_eq!(report.seconds, 70);
        assert_eq!(report.matches, 2);
    }

    #[test]
    fn resynced_channel_reports_its_last_sync_for_single_queries() {
        let log = "Channel: a\nTotal time: 0:00:05\nChannel: a\nTotal time: 0:00:07\n";
        let report = channel_sync_seconds(log, &["a"]).unwrap();
        assert_eq!(report.seconds, 7);
        assert_eq!(report.matches, 2);

        let record = single_channel_sync(log, "a").unwrap();
        assert_eq!(record.seconds, 7);
    }

    #[test]
    fn aggregate_queries_sum_every_occurrence() {
        let log = "\
Channel: a
Total time: 0:00:05
Channel: b
Total time: 0:01:00
Channel: a
Total time: 0:00:07
";
        let report = channel_sync_seconds(log, &["a", "b"]).unwrap();
        assert_eq!(report.seconds, 72);
        assert_eq!(report.matches, 3);
    }

    #[test]
    fn missing_total_time_is_duration_not_found() {
        let log = "Channel: lonely\nSync started.\n";
        let err = channel_sync_seconds(log, &["lonely"]).unwrap_err();
        assert!(matches!(err, Error::DurationNotFound(_)));
    }

    #[test]
    fn total_time_outside_target_channel_does_not_count() {
        let report = channel_sync_seconds(SYNC_LOG, &["sle-product-updates"]).unwrap();
        assert_eq!(report.seconds, 10);
    }

    #[test_case("01:02:03", Some(3723))]
    #[test_case("0:00:00", Some(0))]
    #[test_case("10:00:59", Some(36059))]
    #[test_case("garbage", None)]
    fn hms_parsing(input: &str, expected: Option<u64>) {
        assert_eq!(hms_to_seconds(input), expected);
    }

    #[test]
    fn elapsed_between_timestamped_markers() {
        let log = "\
2026-08-25 10:00:00 Bootstrap of minion started
2026-08-25 10:00:30 Applying highstate
2026-08-25 10:02:05 Bootstrap of minion finished
";
        let start = Regex::new("Bootstrap of minion started").unwrap();
        let end = Regex::new("Bootstrap of minion finished").unwrap();
        let elapsed = elapsed_between_timestamps(log, &start, &end).unwrap();
        assert_eq!(elapsed, Duration::from_secs(125));
    }

    #[test]
    fn missing_end_marker_is_duration_not_found() {
        let log = "2026-08-25 10:00:00 Bootstrap of minion started\n";
        let start = Regex::new("started").unwrap();
        let end = Regex::new("finished").unwrap();
        assert!(elapsed_between_timestamps(log, &start, &end).is_err());
    }
}
