// src/bookmarks/tree.rs
// =============================================================================
// The in-memory bookmark tree.
//
// Layout:
// - Every node (folder or link) lives in one Vec owned by the Document
// - Nodes point at each other with NodeId, a plain index into that Vec
// - A node's parent is an Option<NodeId>, used only for walking up to the
//   root when we need a bookmark's folder path
//
// Removing a node only unhooks it from its parent. Its slot in the Vec stays,
// so every NodeId handed out earlier keeps meaning the same node.
//
// Rust concepts:
// - Newtype pattern: NodeId wraps a usize so it can't be mixed up with counts
// - Enums with data: a node is either a Folder or a Link
// - Iterators: Links walks the tree lazily in document order
// =============================================================================

use serde::Serialize;
use std::fmt;

/// Stable handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One bookmark entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkNode {
    /// Text shown for the bookmark
    pub text: String,
    /// Target URL, exactly as exported (may be malformed or empty)
    pub url: String,
    /// ADD_DATE as epoch seconds, if present and parseable
    pub created: Option<i64>,
    /// Remaining attributes (lowercase names) in source order, ADD_DATE included
    pub attrs: Vec<(String, String)>,
}

impl LinkNode {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_created(mut self, epoch_secs: i64) -> Self {
        self.created = Some(epoch_secs);
        self.attrs.push(("add_date".to_string(), epoch_secs.to_string()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A grouping level. `name` is the heading that preceded the folder's block;
/// the top-level block of an export has none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderNode {
    pub name: Option<String>,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Folder(FolderNode),
    Link(LinkNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Back-reference for path lookups only; the parent's `children` owns the node
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

/// A link copied out of the tree together with its resolved folder path.
///
/// Workers and confirmation prompts use these so they never hold a borrow
/// of the Document while it might be mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEntry {
    pub id: NodeId,
    pub text: String,
    pub url: String,
    pub path: Vec<String>,
}

impl LinkEntry {
    pub fn location(&self) -> String {
        format_path(&self.path)
    }
}

/// Counts over the part of the tree still reachable from the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    /// Folder blocks, the root excluded
    pub folders: usize,
    /// Folder blocks that carry a heading
    pub headings: usize,
    pub links: usize,
}

/// Raised before saving a document that has lost its folder structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralWarning {
    pub headings: usize,
    pub folders: usize,
}

impl fmt::Display for StructuralWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bookmark folder structure might be corrupted ({} folder headings, {} folder blocks)",
            self.headings, self.folders
        )
    }
}

/// Joins folder names the way they are shown to the user: `Dev > Rust`.
pub fn format_path(path: &[String]) -> String {
    path.join(" > ")
}

const ROOT: NodeId = NodeId(0);

/// A whole bookmark export. Owns every node.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    /// <TITLE> of the export
    pub title: Option<String>,
    /// <H1> of the export
    pub heading: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                kind: NodeKind::Folder(FolderNode::default()),
            }],
            title: None,
            heading: None,
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    // Appends a folder block to `parent`. Adding under a link (or an unknown
    // id) still allocates the node but leaves it detached.
    pub fn add_folder(
        &mut self,
        parent: NodeId,
        name: Option<String>,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        self.push(
            parent,
            NodeKind::Folder(FolderNode {
                name,
                attrs,
                children: Vec::new(),
            }),
        )
    }

    pub fn add_link(&mut self, parent: NodeId, link: LinkNode) -> NodeId {
        self.push(parent, NodeKind::Link(link))
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let attached = match self.nodes.get_mut(parent.0).map(|n| &mut n.kind) {
            Some(NodeKind::Folder(folder)) => {
                folder.children.push(id);
                true
            }
            _ => false,
        };
        self.nodes.push(Node {
            parent: attached.then_some(parent),
            kind,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn link(&self, id: NodeId) -> Option<&LinkNode> {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Link(link)) => Some(link),
            _ => None,
        }
    }

    pub fn folder(&self, id: NodeId) -> Option<&FolderNode> {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Folder(folder)) => Some(folder),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.folder(id).map(|f| f.children.as_slice()).unwrap_or(&[])
    }

    // Folder names from the root down to (not including) `id`.
    //
    // Walks parent references at call time, nothing is cached, so removals
    // elsewhere in the tree never change the answer for a remaining node.
    pub fn resolve_path(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = self.parent(id);

        while let Some(folder_id) = current {
            if let Some(name) = self.folder(folder_id).and_then(|f| f.name.as_deref()) {
                path.push(name.to_string());
            }
            current = self.parent(folder_id);
        }

        path.reverse();
        path
    }

    /// Every reachable link, in document order. Each call starts a fresh walk.
    pub fn links(&self) -> Links<'_> {
        Links {
            doc: self,
            stack: self.children(ROOT).iter().rev().copied().collect(),
        }
    }

    /// Links copied out with their paths, ready to hand to other threads.
    pub fn snapshot_links(&self) -> Vec<LinkEntry> {
        self.links()
            .map(|(id, link)| LinkEntry {
                id,
                text: link.text.clone(),
                url: link.url.clone(),
                path: self.resolve_path(id),
            })
            .collect()
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == ROOT
    }

    // Detaches a node (and with it, its subtree) from the tree.
    //
    // Returns false without touching anything when the node is the root,
    // unknown, or no longer reachable from the root.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == ROOT || !self.is_attached(id) {
            return false;
        }
        let Some(parent) = self.parent(id) else {
            return false;
        };

        if let NodeKind::Folder(folder) = &mut self.nodes[parent.0].kind {
            folder.children.retain(|child| *child != id);
        }
        self.nodes[id.0].parent = None;
        true
    }

    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats::default();
        let mut stack: Vec<NodeId> = self.children(ROOT).to_vec();

        while let Some(id) = stack.pop() {
            match &self.nodes[id.0].kind {
                NodeKind::Folder(folder) => {
                    stats.folders += 1;
                    if folder.name.is_some() {
                        stats.headings += 1;
                    }
                    stack.extend(folder.children.iter().copied());
                }
                NodeKind::Link(_) => stats.links += 1,
            }
        }

        stats
    }

    pub fn structure_warning(&self) -> Option<StructuralWarning> {
        let stats = self.stats();
        (stats.headings == 0 || stats.folders == 0).then_some(StructuralWarning {
            headings: stats.headings,
            folders: stats.folders,
        })
    }
}

/// Lazy depth-first walk over a document's links.
pub struct Links<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Links<'a> {
    type Item = (NodeId, &'a LinkNode);

    fn next(&mut self) -> Option<Self::Item> {
        let doc = self.doc;
        while let Some(id) = self.stack.pop() {
            match &doc.nodes[id.0].kind {
                NodeKind::Folder(folder) => {
                    self.stack.extend(folder.children.iter().rev().copied());
                }
                NodeKind::Link(link) => return Some((id, link)),
            }
        }
        None
    }
}
