// src/session.rs
// =============================================================================
// A Session is what a front end (our CLI, or anything else) drives:
//
//   load -> one scan (validity / duplicates / age) -> confirm -> remove -> save
//
// It owns the currently loaded Document and wires the pieces together:
// - the ValidityChecker for network probes
// - find_duplicates / expired_links for the in-memory scans
// - a Decision that must say "yes" before anything is deleted
// - the RemovalCoordinator that actually detaches bookmarks
//
// Failures to load or save never replace or modify the loaded Document.
// =============================================================================

use crate::age::expired_links;
use crate::bookmarks::{self, format_path, Document, DocumentStats, LinkEntry};
use crate::checker::{CheckReport, Monitor, Probe, RunState, StatusSink, ValidityChecker};
use crate::config::Settings;
use crate::duplicates::{find_duplicates, DuplicateGroup};
use crate::error::{Error, Result};
use crate::removal::{summarize, Decision, Prompt, RemovalCoordinator, RemovalOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub report: CheckReport,
    /// None when there was nothing to remove or the removal was declined
    pub removal: Option<RemovalOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateOutcome {
    pub groups: Vec<DuplicateGroup>,
    /// Number of groups whose removal was approved
    pub accepted: usize,
    pub removal: RemovalOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeOutcome {
    pub expired: Vec<LinkEntry>,
    pub removal: Option<RemovalOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved(DocumentStats),
    /// A structural warning was raised and not confirmed
    Declined,
}

pub struct Session {
    document: Option<Document>,
    source: Option<PathBuf>,
    monitor: Arc<Monitor>,
    checker: ValidityChecker,
    remover: RemovalCoordinator,
    decision: Arc<dyn Decision>,
    settings: Settings,
}

impl Session {
    pub fn new(probe: Arc<dyn Probe>, decision: Arc<dyn Decision>, settings: Settings) -> Self {
        let monitor = Arc::new(Monitor::new());
        Self {
            document: None,
            source: None,
            checker: ValidityChecker::new(probe, Arc::clone(&monitor), settings.clone()),
            remover: RemovalCoordinator::new(Arc::clone(&monitor)),
            monitor,
            decision,
            settings,
        }
    }

    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.monitor
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.monitor.state() {
            RunState::Idle => Ok(()),
            state => Err(Error::Busy(state)),
        }
    }

    // Loads a bookmark export. On error the previously loaded document (if
    // any) stays in place.
    pub fn load(&mut self, path: &Path) -> Result<DocumentStats> {
        self.ensure_idle()?;
        let doc = bookmarks::load_file(path)?;
        let stats = doc.stats();

        tracing::info!(
            folders = stats.headings,
            links = stats.links,
            "loaded bookmarks file {}",
            path.display()
        );
        self.document = Some(doc);
        self.source = Some(path.to_path_buf());
        Ok(stats)
    }

    /// Replaces the loaded document with one built in memory.
    pub fn set_document(&mut self, doc: Document) -> Result<()> {
        self.ensure_idle()?;
        self.document = Some(doc);
        self.source = None;
        Ok(())
    }

    pub async fn check_validity(&mut self, sink: Arc<dyn StatusSink>) -> Result<CheckOutcome> {
        self.check_validity_with_cancel(sink, CancellationToken::new())
            .await
    }

    // Probes every bookmark, then offers to delete the invalid ones.
    //
    // A cancelled run still reports what it found, but never offers removal:
    // the invalid list would be incomplete.
    pub async fn check_validity_with_cancel(
        &mut self,
        sink: Arc<dyn StatusSink>,
        cancel: CancellationToken,
    ) -> Result<CheckOutcome> {
        let doc = self.document.as_ref().ok_or(Error::NoDocument)?;
        let report = self.checker.check_with_cancel(doc, sink, cancel).await?;

        if report.invalid_links.is_empty() || report.cancelled {
            return Ok(CheckOutcome {
                report,
                removal: None,
            });
        }

        let items: Vec<String> = report
            .invalid_links
            .iter()
            .map(|invalid| describe(&invalid.link))
            .collect();
        let prompt = Prompt::new(
            "Invalid Bookmarks",
            summarize(
                &format!(
                    "Check completed, found {} invalid bookmarks:",
                    report.invalid_links.len()
                ),
                &items,
                self.settings.summary_limit,
                "Delete these invalid bookmarks?",
            ),
        );
        let candidates: Vec<_> = report.invalid_links.iter().map(|i| i.link.id).collect();
        let removal = self.confirm_and_remove(&prompt, &candidates)?;

        Ok(CheckOutcome { report, removal })
    }

    // Groups duplicates and asks about each group separately. For an
    // approved group every member but the first is removed.
    pub fn resolve_duplicates(&mut self) -> Result<DuplicateOutcome> {
        let groups = {
            let doc = self.document.as_ref().ok_or(Error::NoDocument)?;
            let _guard = self.monitor.try_begin(RunState::Resolving)?;
            find_duplicates(doc)
        };

        if groups.is_empty() {
            tracing::info!("no duplicate bookmarks found");
        } else {
            tracing::info!("found {} duplicate bookmarks", groups.len());
        }

        let mut accepted = 0;
        let mut removal = RemovalOutcome::default();

        for group in &groups {
            let items: Vec<String> = group.members.iter().map(describe).collect();
            let prompt = Prompt::new(
                "Duplicate Bookmarks",
                summarize(
                    &format!(
                        "Bookmark '{}' ({}) appears {} times:",
                        group.key.text,
                        group.key.url,
                        group.members.len()
                    ),
                    &items,
                    self.settings.summary_limit,
                    "Delete duplicates? The first one is kept.",
                ),
            );

            if let Some(outcome) = self.confirm_and_remove(&prompt, &group.discard_ids())? {
                accepted += 1;
                removal.removed += outcome.removed;
                removal.skipped += outcome.skipped;
            }
        }

        Ok(DuplicateOutcome {
            groups,
            accepted,
            removal,
        })
    }

    // Offers to delete bookmarks older than the retention window.
    pub fn remove_expired(&mut self, now: DateTime<Utc>) -> Result<AgeOutcome> {
        self.ensure_idle()?;
        let doc = self.document.as_ref().ok_or(Error::NoDocument)?;
        let expired = expired_links(doc, now, &self.settings);

        if expired.is_empty() {
            tracing::info!(
                "no bookmarks older than {} days found",
                self.settings.retention_days
            );
            return Ok(AgeOutcome {
                expired,
                removal: None,
            });
        }

        let items: Vec<String> = expired.iter().map(describe).collect();
        let prompt = Prompt::new(
            "Old Bookmarks",
            summarize(
                &format!(
                    "Found {} bookmarks older than {} days:",
                    expired.len(),
                    self.settings.retention_days
                ),
                &items,
                self.settings.summary_limit,
                "Delete these bookmarks?",
            ),
        );
        let candidates: Vec<_> = expired.iter().map(|e| e.id).collect();
        let removal = self.confirm_and_remove(&prompt, &candidates)?;

        Ok(AgeOutcome { expired, removal })
    }

    fn confirm_and_remove(
        &mut self,
        prompt: &Prompt,
        candidates: &[bookmarks::NodeId],
    ) -> Result<Option<RemovalOutcome>> {
        if !self.decision.confirm(prompt) {
            tracing::info!("{}: kept everything", prompt.title);
            return Ok(None);
        }
        let doc = self.document.as_mut().ok_or(Error::NoDocument)?;
        self.remover.apply(doc, candidates).map(Some)
    }

    // Writes the loaded document to `path`.
    //
    // A document without folder headings or folder blocks is suspicious; the
    // Decision is asked before writing it.
    pub fn save(&self, path: &Path) -> Result<SaveOutcome> {
        self.ensure_idle()?;
        let doc = self.document.as_ref().ok_or(Error::NoDocument)?;

        if let Some(warning) = doc.structure_warning() {
            tracing::warn!("{}", warning);
            let prompt = Prompt::new("Warning", format!("{}. Save anyway?", warning));
            if !self.decision.confirm(&prompt) {
                return Ok(SaveOutcome::Declined);
            }
        }

        bookmarks::save_file(doc, path)?;
        let stats = doc.stats();
        tracing::info!(
            folders = stats.headings,
            bookmarks = stats.links,
            "bookmarks file saved to {}",
            path.display()
        );
        Ok(SaveOutcome::Saved(stats))
    }
}

fn describe(entry: &LinkEntry) -> String {
    let location = format_path(&entry.path);
    if location.is_empty() {
        format!("Location: (top level) {}", entry.url)
    } else {
        format!("Location: {} {}", location, entry.url)
    }
}
