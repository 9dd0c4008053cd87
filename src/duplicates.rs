// src/duplicates.rs
// =============================================================================
// Finding duplicate bookmarks.
//
// Two bookmarks are duplicates when they have the same display text (ignoring
// surrounding whitespace) and exactly the same URL, no matter which folder
// they live in. URLs are compared as-is: no lowercasing, no trailing-slash
// cleanup.
//
// For every group we propose keeping the bookmark that comes first in the
// file and deleting the rest. Groups are handed out one by one so each can be
// accepted or rejected on its own.
//
// This is plain in-memory grouping, so it runs synchronously.
// =============================================================================

use crate::bookmarks::{Document, LinkEntry, NodeId};
use serde::Serialize;
use std::collections::HashMap;

/// Identity of a bookmark for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DuplicateKey {
    pub text: String,
    pub url: String,
}

/// Bookmarks sharing one key, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub key: DuplicateKey,
    pub members: Vec<LinkEntry>,
}

impl DuplicateGroup {
    /// The bookmark we propose to keep (first in document order).
    pub fn keep(&self) -> &LinkEntry {
        &self.members[0]
    }

    /// Everything after the first member.
    pub fn discard(&self) -> &[LinkEntry] {
        &self.members[1..]
    }

    pub fn discard_ids(&self) -> Vec<NodeId> {
        self.discard().iter().map(|m| m.id).collect()
    }
}

// Groups every link of `doc` by (trimmed text, URL) and returns the groups
// with more than one member, ordered by where each group first appears.
pub fn find_duplicates(doc: &Document) -> Vec<DuplicateGroup> {
    let mut index: HashMap<DuplicateKey, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for entry in doc.snapshot_links() {
        let key = DuplicateKey {
            text: entry.text.trim().to_string(),
            url: entry.url.clone(),
        };

        match index.get(&key) {
            Some(&slot) => groups[slot].members.push(entry),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    key,
                    members: vec![entry],
                });
            }
        }
    }

    groups.retain(|group| group.members.len() > 1);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::LinkNode;

    fn folders(names: &[&str]) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let top = doc.add_folder(doc.root(), None, vec![]);
        let ids = names
            .iter()
            .map(|name| doc.add_folder(top, Some(name.to_string()), vec![]))
            .collect();
        (doc, ids)
    }

    #[test]
    fn test_keep_first_in_document_order() {
        let (mut doc, f) = folders(&["A", "B", "C"]);
        for folder in &f {
            doc.add_link(*folder, LinkNode::new("Repo", "https://x.test"));
        }

        let groups = find_duplicates(&doc);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.keep().path, vec!["A"]);
        let discarded: Vec<_> = group.discard().iter().map(|m| m.path.clone()).collect();
        assert_eq!(discarded, vec![vec!["B".to_string()], vec!["C".to_string()]]);
    }

    #[test]
    fn test_text_is_trimmed_but_url_is_exact() {
        let (mut doc, f) = folders(&["A", "B"]);
        doc.add_link(f[0], LinkNode::new("  Repo ", "https://x.test/a"));
        doc.add_link(f[1], LinkNode::new("Repo", "https://x.test/a"));
        doc.add_link(f[0], LinkNode::new("Docs", "https://x.test/Docs"));
        doc.add_link(f[1], LinkNode::new("Docs", "https://x.test/docs"));
        doc.add_link(f[1], LinkNode::new("Slash", "https://x.test/s"));
        doc.add_link(f[1], LinkNode::new("Slash", "https://x.test/s/"));

        let groups = find_duplicates(&doc);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key.text, "Repo");
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn test_same_url_different_text_is_not_duplicate() {
        let (mut doc, f) = folders(&["A"]);
        doc.add_link(f[0], LinkNode::new("One", "https://x.test"));
        doc.add_link(f[0], LinkNode::new("Two", "https://x.test"));
        assert!(find_duplicates(&doc).is_empty());
    }

    #[test]
    fn test_groups_in_order_of_first_appearance() {
        let (mut doc, f) = folders(&["A", "B"]);
        doc.add_link(f[0], LinkNode::new("Second", "https://2.test"));
        doc.add_link(f[0], LinkNode::new("First", "https://1.test"));
        doc.add_link(f[1], LinkNode::new("First", "https://1.test"));
        doc.add_link(f[1], LinkNode::new("Second", "https://2.test"));

        let groups = find_duplicates(&doc);
        let keys: Vec<_> = groups.iter().map(|g| g.key.text.as_str()).collect();
        assert_eq!(keys, vec!["Second", "First"]);
        assert_eq!(groups[0].discard_ids().len(), 1);
    }
}
