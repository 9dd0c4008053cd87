// src/checker/pool.rs
// =============================================================================
// The validity checker: probes every bookmark with a fixed pool of workers.
//
// How a run works:
// 1. Copy every link (with its folder path) out of the Document
// 2. Put the copies in one shared queue
// 3. Start N worker tasks; each one pops a link, probes it, records the
//    result in the Monitor, and goes back for the next one
// 4. A worker exits when the queue is empty (or the run was cancelled)
// 5. Waiting for every worker to exit is the "everything acknowledged"
//    barrier: a link that was popped is always recorded before its worker
//    can finish
//
// Progress events go through a channel to one reporter task, so log lines
// and status updates come out one at a time, never interleaved.
//
// Rust concepts:
// - tokio::spawn / JoinSet: run many tasks and wait for all of them
// - Arc<Mutex<...>>: a queue shared between tasks
// - tokio::time::timeout: give up on a future after a deadline
// =============================================================================

use super::http::{Probe, ProbeFailure, ProbeOutcome};
use super::monitor::{CheckResult, Counters, InvalidLink, Monitor, ProbeEvent, StatusSink};
use crate::bookmarks::{Document, LinkEntry};
use crate::config::Settings;
use crate::error::Result;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Summary of a finished (or cancelled) validity run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    #[serde(flatten)]
    pub counters: Counters,
    pub invalid_links: Vec<InvalidLink>,
    /// True when the run stopped before every link was probed
    pub cancelled: bool,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.invalid_links.is_empty()
    }
}

pub struct ValidityChecker {
    probe: Arc<dyn Probe>,
    monitor: Arc<Monitor>,
    settings: Settings,
}

impl ValidityChecker {
    pub fn new(probe: Arc<dyn Probe>, monitor: Arc<Monitor>, settings: Settings) -> Self {
        Self {
            probe,
            monitor,
            settings,
        }
    }

    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.monitor
    }

    pub async fn check(&self, doc: &Document, sink: Arc<dyn StatusSink>) -> Result<CheckReport> {
        self.check_with_cancel(doc, sink, CancellationToken::new())
            .await
    }

    // Probes every link of `doc`.
    //
    // Returns Error::Busy without touching the counters if another operation
    // holds the Monitor. Nothing is removed here; the report's invalid links
    // are only candidates.
    pub async fn check_with_cancel(
        &self,
        doc: &Document,
        sink: Arc<dyn StatusSink>,
        cancel: CancellationToken,
    ) -> Result<CheckReport> {
        let links = doc.snapshot_links();
        let guard = self.monitor.begin_check(links.len(), cancel.clone())?;

        tracing::info!(
            links = links.len(),
            workers = self.settings.worker_count(),
            "starting validity check"
        );
        sink.status(self.monitor.snapshot());

        self.run_pool(links, sink, cancel.clone()).await;

        let report = CheckReport {
            counters: self.monitor.snapshot(),
            invalid_links: self.monitor.invalid_links(),
            cancelled: cancel.is_cancelled(),
        };
        drop(guard);

        if report.cancelled {
            tracing::warn!(
                checked = report.counters.checked,
                total = report.counters.total,
                "validity check cancelled"
            );
        } else {
            tracing::info!(
                valid = report.counters.valid,
                invalid = report.counters.invalid,
                "check completed"
            );
        }

        Ok(report)
    }

    async fn run_pool(
        &self,
        links: Vec<LinkEntry>,
        sink: Arc<dyn StatusSink>,
        cancel: CancellationToken,
    ) {
        let queue = Arc::new(Mutex::new(VecDeque::from(links)));
        let (events, mut receiver) = mpsc::unbounded_channel::<ProbeEvent>();

        let reporter = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                sink.log(&progress_line(&event.result));
                sink.status(event.counters);
            }
        });

        let mut workers = JoinSet::new();
        for _ in 0..self.settings.worker_count() {
            workers.spawn(worker(
                Arc::clone(&queue),
                Arc::clone(&self.probe),
                Arc::clone(&self.monitor),
                events.clone(),
                cancel.clone(),
                self.settings.probe_timeout,
            ));
        }
        // Only the workers keep senders now; the reporter stops after the last one
        drop(events);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("probe worker failed: {}", e);
            }
        }

        if let Err(e) = reporter.await {
            tracing::error!("status reporter failed: {}", e);
        }
    }
}

async fn worker(
    queue: Arc<Mutex<VecDeque<LinkEntry>>>,
    probe: Arc<dyn Probe>,
    monitor: Arc<Monitor>,
    events: UnboundedSender<ProbeEvent>,
    cancel: CancellationToken,
    timeout: Duration,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let next = queue.lock().pop_front();
        let Some(link) = next else {
            break;
        };

        let outcome = match tokio::time::timeout(timeout, probe.probe(&link.url)).await {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::Failed(ProbeFailure::Timeout),
        };

        let result = CheckResult {
            valid: outcome.is_valid(),
            reason: outcome.failure_reason(),
            link,
        };
        monitor.record(result, &events);
    }
}

fn progress_line(result: &CheckResult) -> String {
    let location = result.link.location();
    let mut line = format!("checked {}", result.link.url);
    if !location.is_empty() {
        line.push_str(&format!(" (location: {})", location));
    }
    if let Some(reason) = &result.reason {
        line.push_str(&format!(" -> {}", reason));
    }
    line
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a queue + workers instead of spawning one task per link?
//    - The pool size caps how many requests are in flight at once
//    - With 1,000 bookmarks we still only open ~10 connections at a time
//
// 2. What is JoinSet?
//    - A collection of spawned tasks you can await one by one
//    - join_next() returns None once every task has finished
//
// 3. Why does the parking_lot lock never cross an .await?
//    - `queue.lock().pop_front()` takes the lock, pops, and drops the guard
//      in the same statement
//    - Holding a blocking lock across .await could stall other tasks
//
// 4. What is an unbounded channel?
//    - Senders never wait, the receiver gets messages in order
//    - The receiver's recv() returns None once every sender is dropped,
//      which is how the reporter knows the run is over
// -----------------------------------------------------------------------------
