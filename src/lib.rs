//! bookmark-guardian - broken, duplicate and stale bookmark finder
//!
//! Reads a browser bookmark export (Netscape bookmark file format) into an
//! in-memory folder tree and runs one of three scans over it:
//!
//! - [`checker`]: HEAD-probes every bookmark with a bounded worker pool
//! - [`duplicates`]: groups bookmarks with the same text and URL
//! - [`age`]: finds bookmarks older than a retention window
//!
//! Each scan only proposes bookmarks to delete. A [`removal::Decision`] has to
//! approve before the [`removal::RemovalCoordinator`] touches the tree, and
//! [`session::Session`] ties the whole load → scan → confirm → save flow
//! together.

pub mod age;
pub mod bookmarks;
pub mod checker;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod removal;
pub mod session;

pub use bookmarks::{Document, LinkEntry, LinkNode, NodeId};
pub use checker::{
    CheckReport, Counters, HttpProbe, Monitor, Probe, ProbeOutcome, RunState, StatusSink,
    TracingStatus, ValidityChecker,
};
pub use config::{Settings, UnparseableDates};
pub use duplicates::{find_duplicates, DuplicateGroup};
pub use error::{Error, Result};
pub use removal::{AutoApprove, AutoReject, ConsolePrompt, Decision, Prompt, RemovalCoordinator};
pub use session::{AgeOutcome, CheckOutcome, DuplicateOutcome, SaveOutcome, Session};
