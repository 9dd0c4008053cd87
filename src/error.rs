// src/error.rs
// =============================================================================
// Errors the library can return.
//
// Only setup-level problems show up here: a file that can't be read, a file
// that can't be written, or an operation started while another one is still
// running. A single bad bookmark (dead URL, timeout, removal of a node that's
// already gone) is never an error; it becomes data in a report instead.
// =============================================================================

use crate::checker::RunState;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The bookmark export could not be read or doesn't look like one
    #[error("failed to load bookmarks from {origin}: {reason}")]
    Load { origin: String, reason: String },

    /// The output file could not be written
    #[error("failed to save bookmarks to {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another scan or removal is still in progress
    #[error("operation in progress ({0}), please wait")]
    Busy(RunState),

    #[error("no bookmarks file loaded")]
    NoDocument,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
