// src/removal.rs
// =============================================================================
// Removing bookmarks, and asking before we do.
//
// Every scan (validity, duplicates, age) only *proposes* bookmarks to delete.
// Before anything is removed, a Decision is asked with a short summary; only
// a clear "yes" lets the RemovalCoordinator touch the tree.
//
// Decision implementations:
// - ConsolePrompt: asks on the terminal, anything but y/yes means no
// - AutoApprove / AutoReject: for scripts and CI (--yes / --no)
//
// Removal is idempotent: a bookmark that is already gone (for example it was
// also part of another duplicate group) is skipped, not reported as an error.
// =============================================================================

use crate::bookmarks::{Document, NodeId};
use crate::checker::{Monitor, RunState};
use crate::error::Result;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};

/// A yes/no question shown before a destructive step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub body: String,
}

impl Prompt {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Approves or rejects destructive operations.
pub trait Decision: Send + Sync {
    fn confirm(&self, prompt: &Prompt) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl Decision for AutoApprove {
    fn confirm(&self, prompt: &Prompt) -> bool {
        tracing::info!("auto-approved: {}", prompt.title);
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoReject;

impl Decision for AutoReject {
    fn confirm(&self, prompt: &Prompt) -> bool {
        tracing::info!("auto-rejected: {}", prompt.title);
        false
    }
}

/// Asks on stderr/stdin. No answer (EOF, read error) counts as "no".
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrompt;

impl Decision for ConsolePrompt {
    fn confirm(&self, prompt: &Prompt) -> bool {
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\n{}\n\n{} [y/N] ", prompt.title, prompt.body);
        let _ = stderr.flush();

        match off_runtime(read_answer) {
            Some(answer) => is_yes(&answer),
            None => false,
        }
    }
}

// None on EOF or a read error
fn read_answer() -> Option<String> {
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(answer),
    }
}

// Runs a blocking call without stalling the async runtime, so its other
// tasks (the Ctrl-C watcher in particular) keep running meanwhile.
// block_in_place needs the multi-thread runtime; anywhere else the call
// just runs inline.
fn off_runtime<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// Builds the body of a confirmation prompt:
//
//   <headline>
//
//   - <item>
//   - <item>
//
//   ... and 3 more
//
//   <question>
//
// Only the first `limit` items are listed.
pub fn summarize(headline: &str, items: &[String], limit: usize, question: &str) -> String {
    let mut body = format!("{}\n\n", headline);
    for item in items.iter().take(limit) {
        body.push_str(&format!("- {}\n", item));
    }
    if items.len() > limit {
        body.push_str(&format!("\n... and {} more\n", items.len() - limit));
    }
    body.push('\n');
    body.push_str(question);
    body
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    pub removed: usize,
    /// Candidates that were already detached
    pub skipped: usize,
}

/// Applies confirmed removals to a document.
pub struct RemovalCoordinator {
    monitor: Arc<Monitor>,
}

impl RemovalCoordinator {
    pub fn new(monitor: Arc<Monitor>) -> Self {
        Self { monitor }
    }

    // Detaches every candidate, in order.
    //
    // Refuses with Error::Busy while a check or another removal holds the
    // Monitor; the document is not touched in that case.
    pub fn apply(&self, doc: &mut Document, candidates: &[NodeId]) -> Result<RemovalOutcome> {
        let _guard = self.monitor.try_begin(RunState::Removing)?;
        let mut outcome = RemovalOutcome::default();

        for id in candidates {
            if doc.remove(*id) {
                outcome.removed += 1;
            } else {
                tracing::debug!("bookmark {} already removed, skipping", id);
                outcome.skipped += 1;
            }
        }

        tracing::info!(
            removed = outcome.removed,
            skipped = outcome.skipped,
            "removal finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::LinkNode;
    use crate::error::Error;

    fn doc_with_links(count: usize) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let top = doc.add_folder(doc.root(), None, vec![]);
        let ids = (0..count)
            .map(|n| {
                let link = LinkNode::new(format!("l{}", n), format!("https://{}.test", n));
                doc.add_link(top, link)
            })
            .collect();
        (doc, ids)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_blocking_answer_leaves_runtime_free() {
        // With a single worker, the spawned task can only run if the
        // blocking wait hands its thread back to the runtime
        let (tx, rx) = std::sync::mpsc::channel();
        tokio::spawn(async move {
            let _ = tx.send("y".to_string());
        });

        let answer = off_runtime(|| rx.recv().unwrap());
        assert!(is_yes(&answer));
    }

    #[tokio::test]
    async fn test_blocking_answer_on_current_thread_runtime() {
        assert_eq!(off_runtime(|| 7), 7);
    }

    #[test]
    fn test_blocking_answer_without_runtime() {
        assert_eq!(off_runtime(|| "no"), "no");
    }

    #[test]
    fn test_apply_twice_is_same_as_once() {
        let (mut doc, ids) = doc_with_links(4);
        let coordinator = RemovalCoordinator::new(Arc::new(Monitor::new()));
        let candidates = vec![ids[1], ids[3]];

        let first = coordinator.apply(&mut doc, &candidates).unwrap();
        let after_once = doc.clone();
        let second = coordinator.apply(&mut doc, &candidates).unwrap();

        assert_eq!(first, RemovalOutcome { removed: 2, skipped: 0 });
        assert_eq!(second, RemovalOutcome { removed: 0, skipped: 2 });
        assert_eq!(doc, after_once);
        assert_eq!(doc.links().count(), 2);
    }

    #[test]
    fn test_duplicate_candidates_are_skipped() {
        let (mut doc, ids) = doc_with_links(2);
        let coordinator = RemovalCoordinator::new(Arc::new(Monitor::new()));
        let outcome = coordinator.apply(&mut doc, &[ids[0], ids[0]]).unwrap();
        assert_eq!(outcome, RemovalOutcome { removed: 1, skipped: 1 });
    }

    #[test]
    fn test_refuses_while_checking() {
        let (mut doc, ids) = doc_with_links(2);
        let monitor = Arc::new(Monitor::new());
        let coordinator = RemovalCoordinator::new(monitor.clone());
        let before = doc.clone();

        let _running = monitor.try_begin(RunState::Checking).unwrap();
        let err = coordinator.apply(&mut doc, &ids).unwrap_err();

        assert!(matches!(err, Error::Busy(RunState::Checking)));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_summary_is_bounded() {
        let items: Vec<String> = (1..=12).map(|n| format!("Location: F{}", n)).collect();
        let body = summarize("found 12 invalid bookmarks:", &items, 10, "Delete them?");

        assert!(body.starts_with("found 12 invalid bookmarks:\n\n- Location: F1\n"));
        assert!(body.contains("- Location: F10\n"));
        assert!(!body.contains("F11"));
        assert!(body.contains("... and 2 more"));
        assert!(body.ends_with("Delete them?"));
    }

    #[test]
    fn test_summary_without_overflow() {
        let items = vec!["Location: Dev".to_string()];
        let body = summarize("found 1:", &items, 10, "Delete?");
        assert_eq!(body, "found 1:\n\n- Location: Dev\n\nDelete?");
    }

    #[test]
    fn test_policies_and_answers() {
        let prompt = Prompt::new("t", "b");
        assert!(AutoApprove.confirm(&prompt));
        assert!(!AutoReject.confirm(&prompt));
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("nope"));
    }
}
