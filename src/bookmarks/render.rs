// src/bookmarks/render.rs
// =============================================================================
// This module writes a Document back out in the Netscape bookmark format so
// browsers can import it again.
//
// Output shape:
//   <!DOCTYPE NETSCAPE-Bookmark-file-1>
//   <META ...>
//   <TITLE>Bookmarks</TITLE>
//   <H1>Bookmarks</H1>
//   <DL><p>
//       <DT><H3>Folder</H3>
//       <DL><p>
//           <DT><A HREF="...">Link</A>
//       </DL><p>
//   </DL><p>
//
// We don't try to reproduce the input byte-for-byte: headings, blocks, links
// and their attributes come back in the same order, which is all a browser
// needs.
//
// Saving goes through a temporary file next to the target and a rename, so
// a failed write never leaves a half-written bookmarks file behind.
// =============================================================================

use super::tree::{Document, NodeId, NodeKind};
use crate::error::{Error, Result};
use std::fmt::Write as _;
use std::path::Path;

const HEADER: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
<!-- This is an automatically generated file.\n     \
It will be read and overwritten.\n     \
DO NOT EDIT! -->\n\
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n";

pub fn render_document(doc: &Document) -> String {
    let mut out = String::from(HEADER);
    let title = doc.title.as_deref().unwrap_or("Bookmarks");
    let heading = doc.heading.as_deref().unwrap_or(title);

    let _ = writeln!(out, "<TITLE>{}</TITLE>", escape_text(title));
    let _ = writeln!(out, "<H1>{}</H1>", escape_text(heading));

    for child in doc.children(doc.root()) {
        render_node(doc, *child, 0, &mut out);
    }

    out
}

fn render_node(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = doc.node(id) else {
        return;
    };
    let indent = "    ".repeat(depth);

    match &node.kind {
        NodeKind::Folder(folder) => {
            if let Some(name) = &folder.name {
                let _ = writeln!(
                    out,
                    "{}<DT><H3{}>{}</H3>",
                    indent,
                    render_attrs(&folder.attrs),
                    escape_text(name)
                );
            }
            let _ = writeln!(out, "{}<DL><p>", indent);
            for child in &folder.children {
                render_node(doc, *child, depth + 1, out);
            }
            let _ = writeln!(out, "{}</DL><p>", indent);
        }
        NodeKind::Link(link) => {
            let _ = writeln!(
                out,
                "{}<DT><A HREF=\"{}\"{}>{}</A>",
                indent,
                escape_attr(&link.url),
                render_attrs(&link.attrs),
                escape_text(&link.text)
            );
        }
    }
}

fn render_attrs(attrs: &[(String, String)]) -> String {
    attrs.iter().fold(String::new(), |mut acc, (name, value)| {
        let _ = write!(acc, " {}=\"{}\"", name.to_ascii_uppercase(), escape_attr(value));
        acc
    })
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

// Writes the document to `path`.
//
// On any I/O failure the error names the target path and the temporary file
// is cleaned up; the in-memory document is only borrowed, never changed.
pub fn save_file(doc: &Document, path: &Path) -> Result<()> {
    let rendered = render_document(doc);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bookmarks.html".to_string());
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    let result = std::fs::write(&tmp, rendered).and_then(|_| std::fs::rename(&tmp, path));

    if let Err(source) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::Save {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
