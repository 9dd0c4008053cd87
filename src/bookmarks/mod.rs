// src/bookmarks/mod.rs
// =============================================================================
// This module holds the bookmark document and its file format.
//
// Submodules:
// - tree: the in-memory folder/link hierarchy and path lookups
// - parse: reads a Netscape bookmark export into a tree
// - render: writes a tree back out in the same format
// =============================================================================

mod parse;
mod render;
mod tree;

pub use parse::{load_file, parse_bytes, parse_document};
pub use render::{render_document, save_file};
pub use tree::{
    format_path, Document, DocumentStats, FolderNode, LinkEntry, LinkNode, Links, Node, NodeId,
    NodeKind, StructuralWarning,
};
