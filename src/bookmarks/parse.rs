// src/bookmarks/parse.rs
// =============================================================================
// This module reads browser bookmark exports (the "Netscape bookmark file"
// format every major browser writes) into a Document.
//
// The format looks like this:
//
//   <DL><p>
//       <DT><H3>Dev</H3>
//       <DL><p>
//           <DT><A HREF="https://..." ADD_DATE="1700000000">Repo</A>
//       </DL><p>
//   </DL><p>
//
// A folder's name is NOT stored on the <DL> block itself: it is the <H3>
// heading that comes right before the block. So while walking the children
// of an element we remember the last heading we saw and give it to the next
// <DL> we meet.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (it is built on html5ever, so the unclosed <DT>
//   and <p> tags of bookmark files are repaired the way a browser would)
// - Lets us walk elements and read their attributes
//
// Rust concepts:
// - Recursion: nested folders are handled by the function calling itself
// - Option::take(): hand the pending heading to exactly one block
// =============================================================================

use super::tree::{Document, LinkNode, NodeId};
use crate::error::{Error, Result};
use scraper::{ElementRef, Html};
use std::path::Path;

// Reads and parses a bookmark export from disk.
//
// Any failure (missing file, bad encoding, nothing that looks like bookmarks)
// comes back as Error::Load; the caller's current document is never touched.
pub fn load_file(path: &Path) -> Result<Document> {
    let origin = path.display().to_string();

    let bytes = std::fs::read(path).map_err(|e| Error::Load {
        origin: origin.clone(),
        reason: e.to_string(),
    })?;

    parse_bytes(&bytes, &origin)
}

// Parses an export held in memory. `origin` only appears in error messages.
pub fn parse_bytes(bytes: &[u8], origin: &str) -> Result<Document> {
    let html = std::str::from_utf8(bytes).map_err(|e| Error::Load {
        origin: origin.to_string(),
        reason: format!("not valid UTF-8: {}", e),
    })?;

    parse_document(html, origin)
}

pub fn parse_document(html: &str, origin: &str) -> Result<Document> {
    let parsed = Html::parse_document(html);
    let mut doc = Document::new();
    let root = doc.root();

    walk(&mut doc, parsed.root_element(), root);

    let stats = doc.stats();
    if stats.folders == 0 && stats.links == 0 {
        return Err(Error::Load {
            origin: origin.to_string(),
            reason: "no bookmark folders or links found".to_string(),
        });
    }

    tracing::debug!(
        folders = stats.folders,
        links = stats.links,
        "parsed bookmark export {}",
        origin
    );

    Ok(doc)
}

// Walks the children of `element`, adding what it finds to `folder`.
//
// Wrapper elements (<html>, <body>, <DT>, <p>, ...) are descended into with
// the same target folder, but each gets its own pending heading, because a
// heading only names the block that follows it inside the same parent.
fn walk(doc: &mut Document, element: ElementRef<'_>, folder: NodeId) {
    let mut pending_heading: Option<(String, Vec<(String, String)>)> = None;

    for child in element.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "h3" => {
                pending_heading = Some((collect_text(child).trim().to_string(), attributes(child)));
            }
            "dl" => {
                let (name, attrs) = match pending_heading.take() {
                    Some((name, attrs)) => (Some(name), attrs),
                    None => (None, Vec::new()),
                };
                let block = doc.add_folder(folder, name, attrs);
                walk(doc, child, block);
            }
            "a" => {
                doc.add_link(folder, read_link(child));
            }
            "title" => {
                doc.title = Some(collect_text(child).trim().to_string());
            }
            "h1" => {
                doc.heading = Some(collect_text(child).trim().to_string());
            }
            _ => walk(doc, child, folder),
        }
    }
}

fn read_link(element: ElementRef<'_>) -> LinkNode {
    let mut link = LinkNode {
        text: collect_text(element),
        ..LinkNode::default()
    };

    for (name, value) in element.value().attrs() {
        match name {
            "href" => link.url = value.to_string(),
            _ => {
                if name == "add_date" {
                    link.created = value.trim().parse::<i64>().ok();
                }
                link.attrs.push((name.to_string(), value.to_string()));
            }
        }
    }

    link
}

fn attributes(element: ElementRef<'_>) -> Vec<(String, String)> {
    element
        .value()
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn collect_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does ElementRef::wrap do?
//    - The DOM contains text and comment nodes as well as elements
//    - wrap() returns Some only for elements, so filter_map skips the rest
//
// 2. Why are tag names lowercase here?
//    - HTML is case-insensitive; html5ever lowercases names while parsing,
//      so <DL> in the file is "dl" in the tree
// -----------------------------------------------------------------------------
