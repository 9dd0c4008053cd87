// src/checker/monitor.rs
// =============================================================================
// Shared run state for scans and removals.
//
// One Monitor is shared (behind an Arc) by everything that can touch the
// bookmark tree. It holds, under a single lock:
// - which operation is running right now (RunState)
// - the counters of the current/last validity run
// - the list of invalid links found so far
// - the cancellation token of the running check, if any
//
// Keeping all of it behind the same lock means "is something running?" and
// "start a run and reset the counters" can never race each other.
//
// Rust concepts:
// - RAII guards: RunGuard puts the state back to Idle when it is dropped,
//   even if the operation returns early with `?`
// - Arc<T>: shared ownership across tasks
// - Traits: StatusSink lets the caller decide where progress goes
// =============================================================================

use crate::bookmarks::LinkEntry;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// What the Monitor is busy with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    /// A validity run is probing links
    Checking,
    /// Duplicates are being grouped
    Resolving,
    /// Confirmed removals are being applied
    Removing,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Checking => "checking links",
            RunState::Resolving => "resolving duplicates",
            RunState::Removing => "removing bookmarks",
        };
        f.write_str(name)
    }
}

/// Progress counters of a validity run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub total: usize,
    pub checked: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl Counters {
    pub fn pending(&self) -> usize {
        self.total - self.checked
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Checked: {}  Valid: {}  Invalid: {}  Pending: {}",
            self.checked,
            self.valid,
            self.invalid,
            self.pending()
        )
    }
}

/// Outcome of probing one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub link: LinkEntry,
    pub valid: bool,
    pub reason: Option<String>,
}

/// A link that failed its probe, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidLink {
    #[serde(flatten)]
    pub link: LinkEntry,
    pub reason: String,
}

/// Sent to the reporter task after every probe.
#[derive(Debug, Clone)]
pub(crate) struct ProbeEvent {
    pub result: CheckResult,
    pub counters: Counters,
}

/// Where progress of a validity run goes. Fire-and-forget.
pub trait StatusSink: Send + Sync {
    fn status(&self, counters: Counters);
    fn log(&self, message: &str);
}

/// Default sink: progress lines through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatus;

impl StatusSink for TracingStatus {
    fn status(&self, counters: Counters) {
        tracing::debug!(
            checked = counters.checked,
            valid = counters.valid,
            invalid = counters.invalid,
            pending = counters.pending(),
            "status"
        );
    }

    fn log(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

#[derive(Debug)]
struct Inner {
    state: RunState,
    counters: Counters,
    invalid: Vec<InvalidLink>,
    cancel: Option<CancellationToken>,
}

#[derive(Debug)]
pub struct Monitor {
    inner: Mutex<Inner>,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: RunState::Idle,
                counters: Counters::default(),
                invalid: Vec::new(),
                cancel: None,
            }),
        }
    }

    pub fn state(&self) -> RunState {
        self.inner.lock().state
    }

    pub fn is_idle(&self) -> bool {
        self.state() == RunState::Idle
    }

    /// Counters of the running check, or of the last one once it finished.
    pub fn snapshot(&self) -> Counters {
        self.inner.lock().counters
    }

    pub fn invalid_links(&self) -> Vec<InvalidLink> {
        self.inner.lock().invalid.clone()
    }

    // Moves from Idle to `state`, or reports what is running instead.
    pub fn try_begin(self: &Arc<Self>, state: RunState) -> Result<RunGuard> {
        let mut inner = self.inner.lock();
        if inner.state != RunState::Idle {
            return Err(Error::Busy(inner.state));
        }
        inner.state = state;
        Ok(RunGuard {
            monitor: Arc::clone(self),
        })
    }

    // Starts a validity run: same transition as try_begin, plus resetting the
    // counters and the invalid list in the same critical section. A rejected
    // call leaves the running check's numbers alone.
    pub(crate) fn begin_check(
        self: &Arc<Self>,
        total: usize,
        cancel: CancellationToken,
    ) -> Result<RunGuard> {
        let mut inner = self.inner.lock();
        if inner.state != RunState::Idle {
            return Err(Error::Busy(inner.state));
        }
        inner.state = RunState::Checking;
        inner.counters = Counters {
            total,
            ..Counters::default()
        };
        inner.invalid.clear();
        inner.cancel = Some(cancel);
        Ok(RunGuard {
            monitor: Arc::clone(self),
        })
    }

    // Counts one finished probe.
    //
    // The event is queued while the lock is still held, so observers see the
    // counter snapshots in the order they were produced.
    pub(crate) fn record(&self, result: CheckResult, events: &UnboundedSender<ProbeEvent>) {
        let mut inner = self.inner.lock();
        inner.counters.checked += 1;
        if result.valid {
            inner.counters.valid += 1;
        } else {
            inner.counters.invalid += 1;
            inner.invalid.push(InvalidLink {
                link: result.link.clone(),
                reason: result.reason.clone().unwrap_or_default(),
            });
        }
        let counters = inner.counters;
        // The reporter only goes away after every worker has finished
        let _ = events.send(ProbeEvent { result, counters });
    }

    /// Asks a running check to stop dispatching. Returns false when no
    /// check is running or it was already asked to stop.
    pub fn cancel(&self) -> bool {
        match &self.inner.lock().cancel {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                true
            }
            _ => false,
        }
    }
}

/// Holds the Monitor in a non-idle state until dropped.
#[derive(Debug)]
pub struct RunGuard {
    monitor: Arc<Monitor>,
}

impl RunGuard {
    pub fn state(&self) -> RunState {
        self.monitor.state()
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut inner = self.monitor.inner.lock();
        inner.state = RunState::Idle;
        inner.cancel = None;
    }
}
