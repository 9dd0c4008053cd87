// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every scan takes the bookmark file as a positional argument. Scans that can
// delete bookmarks share the RemovalArgs flags:
//   --output FILE   where to write the cleaned-up bookmarks (nothing is
//                   written without it)
//   --yes / --no    answer every confirmation without asking
// =============================================================================

use bookmark_guardian::config::{
    DEFAULT_RETENTION_DAYS, DEFAULT_SUMMARY_LIMIT, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};
use bookmark_guardian::{AutoApprove, AutoReject, ConsolePrompt, Decision};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "bookmark-guardian",
    version,
    about = "Find broken, duplicate and stale entries in browser bookmark exports",
    long_about = "bookmark-guardian reads a bookmarks.html export, checks every link, \
                  finds duplicates and old entries, and writes a cleaned-up copy. \
                  Nothing is deleted without confirmation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe every bookmark and offer to delete the ones that don't answer
    ///
    /// Example: bookmark-guardian check bookmarks.html --output cleaned.html
    Check {
        /// Bookmark export to scan
        file: PathBuf,

        #[command(flatten)]
        removal: RemovalArgs,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// Number of probes running at the same time
        #[arg(long, env = "BOOKMARK_GUARDIAN_WORKERS", default_value_t = DEFAULT_WORKERS)]
        workers: usize,

        /// Seconds a single probe may take
        #[arg(long, env = "BOOKMARK_GUARDIAN_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Find bookmarks with the same text and URL and offer to keep only the first
    Duplicates {
        /// Bookmark export to scan
        file: PathBuf,

        #[command(flatten)]
        removal: RemovalArgs,

        /// Output results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Offer to delete bookmarks older than a number of days
    Prune {
        /// Bookmark export to scan
        file: PathBuf,

        #[command(flatten)]
        removal: RemovalArgs,

        /// Retention window in days
        #[arg(long, default_value_t = DEFAULT_RETENTION_DAYS)]
        days: i64,

        /// Treat bookmarks whose ADD_DATE can't be parsed as expired
        #[arg(long)]
        expire_unparseable: bool,

        /// Output results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print folder and bookmark counts
    Stats {
        /// Bookmark export to read
        file: PathBuf,

        /// Output results in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RemovalArgs {
    /// Write the resulting bookmarks to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Approve every removal without asking
    #[arg(long, conflicts_with = "no")]
    pub yes: bool,

    /// Reject every removal without asking (report only)
    #[arg(long)]
    pub no: bool,

    /// How many entries a confirmation lists before "... and N more"
    #[arg(long, default_value_t = DEFAULT_SUMMARY_LIMIT)]
    pub summary_limit: usize,
}

impl RemovalArgs {
    pub fn decision(&self) -> Arc<dyn Decision> {
        if self.yes {
            Arc::new(AutoApprove)
        } else if self.no {
            Arc::new(AutoReject)
        } else {
            Arc::new(ConsolePrompt)
        }
    }
}
