// Integration tests: drive a Session the way the CLI does, with a fake probe
// instead of the network.

use async_trait::async_trait;
use bookmark_guardian::bookmarks::{self, parse_document};
use bookmark_guardian::checker::{Counters, StatusSink};
use bookmark_guardian::{
    AutoApprove, AutoReject, Decision, Error, Probe, ProbeOutcome, Prompt, SaveOutcome, Session,
    Settings,
};
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const EXPORT: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
    <DT><H3>Dev</H3>
    <DL><p>
        <DT><A HREF="http://x.test/404" ADD_DATE="1500000000">Repo</A>
        <DT><A HREF="http://x.test/ok" ADD_DATE="1716000000">Home</A>
    </DL><p>
    <DT><H3>Docs</H3>
    <DL><p>
        <DT><A HREF="http://x.test/404">Repo</A>
        <DT><A HREF="http://x.test/ok">Home</A>
    </DL><p>
    <DT><A HREF="http://x.test/fine">Top</A>
</DL><p>
"#;

// Answers from a fixed table; unknown URLs get 200
struct TableProbe {
    statuses: HashMap<&'static str, u16>,
}

#[async_trait]
impl Probe for TableProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        ProbeOutcome::Status(*self.statuses.get(url).unwrap_or(&200))
    }
}

fn probe() -> Arc<dyn Probe> {
    Arc::new(TableProbe {
        statuses: HashMap::from([("http://x.test/404", 404)]),
    })
}

// Remembers every prompt and answers from a script (missing answers = no)
struct Scripted {
    answers: Mutex<Vec<bool>>,
    prompts: Mutex<Vec<Prompt>>,
}

impl Scripted {
    fn new(answers: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().rev().copied().collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

impl Decision for Scripted {
    fn confirm(&self, prompt: &Prompt) -> bool {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.answers.lock().unwrap().pop().unwrap_or(false)
    }
}

struct Quiet;

impl StatusSink for Quiet {
    fn status(&self, _counters: Counters) {}
    fn log(&self, _message: &str) {}
}

fn session(decision: Arc<dyn Decision>) -> Session {
    let mut session = Session::new(probe(), decision, Settings::default());
    session
        .set_document(parse_document(EXPORT, "fixture").unwrap())
        .unwrap();
    session
}

fn link_paths(session: &Session) -> Vec<(String, String)> {
    let doc = session.document().unwrap();
    doc.links()
        .map(|(id, l)| (l.text.clone(), bookmarks::format_path(&doc.resolve_path(id))))
        .collect()
}

#[tokio::test]
async fn test_same_dead_link_in_two_folders() {
    let mut session = session(Arc::new(AutoReject));

    let outcome = session.check_validity(Arc::new(Quiet)).await.unwrap();
    let report = &outcome.report;
    assert_eq!(report.counters.total, 5);
    assert_eq!(report.counters.checked, 5);
    assert_eq!(report.counters.invalid, 2);
    assert_eq!(report.invalid_links.len(), 2);

    let mut paths: Vec<_> = report
        .invalid_links
        .iter()
        .map(|i| i.link.location())
        .collect();
    paths.sort();
    assert_eq!(paths, vec!["Dev", "Docs"]);
    assert!(report.invalid_links.iter().all(|i| i.reason == "HTTP 404"));
    assert!(outcome.removal.is_none());

    let duplicates = session.resolve_duplicates().unwrap();
    let repo = duplicates
        .groups
        .iter()
        .find(|g| g.key.text == "Repo")
        .unwrap();
    assert_eq!(repo.members.len(), 2);
    assert_eq!(repo.keep().location(), "Dev");
    assert_eq!(repo.discard()[0].location(), "Docs");
}

#[tokio::test]
async fn test_declined_check_keeps_everything() {
    let decision = Scripted::new(&[false]);
    let mut session = session(decision.clone());
    let before = link_paths(&session);

    let outcome = session.check_validity(Arc::new(Quiet)).await.unwrap();

    assert!(outcome.removal.is_none());
    assert_eq!(link_paths(&session), before);
    let prompts = decision.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].body.contains("found 2 invalid bookmarks"));
}

#[tokio::test]
async fn test_approved_check_removes_invalid_links() {
    let mut session = session(Arc::new(AutoApprove));

    let outcome = session.check_validity(Arc::new(Quiet)).await.unwrap();

    assert_eq!(outcome.removal.unwrap().removed, 2);
    assert_eq!(
        link_paths(&session),
        vec![
            ("Home".to_string(), "Dev".to_string()),
            ("Home".to_string(), "Docs".to_string()),
            ("Top".to_string(), String::new()),
        ]
    );
    assert!(session.monitor().is_idle());
}

#[test]
fn test_duplicate_groups_are_decided_one_by_one() {
    // Reject "Repo", accept "Home"
    let decision = Scripted::new(&[false, true]);
    let mut session = session(decision.clone());

    let outcome = session.resolve_duplicates().unwrap();

    assert_eq!(outcome.groups.len(), 2);
    assert_eq!(outcome.accepted, 1);
    assert_eq!(outcome.removal.removed, 1);
    let remaining: Vec<_> = link_paths(&session)
        .into_iter()
        .map(|(text, path)| format!("{}@{}", text, path))
        .collect();
    assert_eq!(remaining, vec!["Repo@Dev", "Home@Dev", "Repo@Docs", "Top@"]);
    assert!(decision.prompts.lock().unwrap()[0]
        .body
        .contains("'Repo' (http://x.test/404) appears 2 times"));
}

#[test]
fn test_age_filter_skips_undated_links() {
    let mut session = session(Arc::new(AutoApprove));
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let outcome = session.remove_expired(now).unwrap();

    let names: Vec<_> = outcome.expired.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(names, vec!["Repo"]);
    assert_eq!(outcome.expired[0].location(), "Dev");
    assert_eq!(outcome.removal.unwrap().removed, 1);
}

#[test]
fn test_failed_load_keeps_previous_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(Arc::new(AutoReject));
    let before = link_paths(&session);

    let missing = dir.path().join("missing.html");
    assert!(matches!(session.load(&missing), Err(Error::Load { .. })));

    let junk = dir.path().join("junk.html");
    std::fs::write(&junk, "<p>not bookmarks</p>").unwrap();
    assert!(matches!(session.load(&junk), Err(Error::Load { .. })));

    assert_eq!(link_paths(&session), before);
    assert_eq!(session.source(), None);
}

#[test]
fn test_save_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(Arc::new(AutoReject));
    let out = dir.path().join("saved.html");

    let saved = session.save(&out).unwrap();
    assert!(matches!(saved, SaveOutcome::Saved(stats) if stats.links == 5));

    let mut reloaded = Session::new(probe(), Arc::new(AutoReject), Settings::default());
    reloaded.load(&out).unwrap();
    assert_eq!(reloaded.source(), Some(out.as_path()));
    assert_eq!(link_paths(&reloaded), link_paths(&session));
}

#[test]
fn test_structural_warning_needs_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let flat = r#"<DT><A HREF="http://x.test/a">A</A>"#;
    let out = dir.path().join("flat.html");

    let decision = Scripted::new(&[false]);
    let mut declined = Session::new(probe(), decision.clone(), Settings::default());
    declined
        .set_document(parse_document(flat, "flat").unwrap())
        .unwrap();
    assert_eq!(declined.save(&out).unwrap(), SaveOutcome::Declined);
    assert!(!out.exists());
    assert!(decision.prompts.lock().unwrap()[0]
        .body
        .contains("might be corrupted"));

    let mut confirmed = Session::new(probe(), Arc::new(AutoApprove), Settings::default());
    confirmed
        .set_document(parse_document(flat, "flat").unwrap())
        .unwrap();
    assert!(matches!(confirmed.save(&out).unwrap(), SaveOutcome::Saved(_)));
    assert!(out.exists());
}

#[tokio::test]
async fn test_nothing_loaded() {
    let mut session = Session::new(probe(), Arc::new(AutoReject), Settings::default());
    assert!(matches!(
        session.check_validity(Arc::new(Quiet)).await,
        Err(Error::NoDocument)
    ));
    assert!(matches!(session.resolve_duplicates(), Err(Error::NoDocument)));
}
