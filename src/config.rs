// src/config.rs
// =============================================================================
// Tunable settings shared by the scans.
//
// The CLI fills these in from flags (and a couple of environment variables,
// see cli.rs); library users can start from Settings::default() and change
// what they need.
// =============================================================================

use std::time::Duration;

/// Number of probes that run at the same time
pub const DEFAULT_WORKERS: usize = 10;
/// How long a single HEAD probe may take before the link counts as invalid
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
/// Bookmarks older than this are proposed by the age filter
pub const DEFAULT_RETENTION_DAYS: i64 = 180;
/// How many entries a confirmation prompt lists before "... and N more"
pub const DEFAULT_SUMMARY_LIMIT: usize = 10;

/// What the age filter does with an ADD_DATE it can't parse.
///
/// Links with no ADD_DATE at all are always left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnparseableDates {
    /// Leave the link alone
    #[default]
    Skip,
    /// Treat the link as expired
    Expire,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub workers: usize,
    pub probe_timeout: Duration,
    pub retention_days: i64,
    pub summary_limit: usize,
    pub unparseable_dates: UnparseableDates,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            probe_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retention_days: DEFAULT_RETENTION_DAYS,
            summary_limit: DEFAULT_SUMMARY_LIMIT,
            unparseable_dates: UnparseableDates::Skip,
        }
    }
}

impl Settings {
    // A pool with zero workers would never drain its queue.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}
