//! Resolved filesystem node snapshots.

use chrono::{DateTime, Utc};

use crate::fs::path::{join_path, sanitize_name};
use crate::store::{NodeKind, StoreNode};

/// An immutable snapshot of one remote entry, produced fresh per query.
///
/// A node never carries its own full path remotely; the virtual path is
/// derived from the `parent_path` the resolver attached at construction
/// plus the sanitized name. That derivation is only valid for the
/// resolution that produced the node — mutation operations always hand
/// back freshly resolved snapshots.
#[derive(Debug, Clone)]
pub struct Node {
    /// Opaque stable identifier assigned by the backing store.
    pub id: String,
    /// Sanitized display name (separators and quoting characters replaced).
    pub name: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Content size in bytes (0 for directories).
    pub size: u64,
    /// Creation time; `None` when the projection did not request times.
    pub created_time: Option<DateTime<Utc>>,
    /// Last modification time; `None` when not requested.
    pub modified_time: Option<DateTime<Utc>>,
    /// Parent ids as reported by the store. The store allows several; this
    /// library only ever manages one logical parent and treats the rest as
    /// store-level noise it never writes.
    pub parents: Vec<String>,
    /// Path of this node's parent relative to the configured root, slash
    /// joined. `None` marks the configured root itself.
    parent_path: Option<String>,
    /// Content checksum when the projection requested it.
    pub(crate) md5_checksum: Option<String>,
}

impl Node {
    /// Build a node from a store record resolved beneath `parent_path`.
    pub(crate) fn from_store(record: StoreNode, parent_path: String) -> Self {
        Self::build(record, Some(parent_path))
    }

    /// Build the configured-root node. Its derived path is the empty
    /// string, so paths resolved beneath it come out root-relative.
    pub(crate) fn new_root(record: StoreNode) -> Self {
        Self::build(record, None)
    }

    fn build(record: StoreNode, parent_path: Option<String>) -> Self {
        Node {
            id: record.id,
            name: sanitize_name(&record.name),
            kind: record.kind,
            size: record.size,
            created_time: record.created_time.as_deref().map(|t| parse_time("created_time", t)),
            modified_time: record
                .modified_time
                .as_deref()
                .map(|t| parse_time("modified_time", t)),
            parents: record.parents,
            parent_path,
            md5_checksum: record.md5_checksum,
        }
    }

    /// Re-anchor this node as the configured root, clearing its derived
    /// path.
    pub(crate) fn into_root(mut self) -> Self {
        self.parent_path = None;
        self
    }

    /// Check if this node is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        !self.kind.is_directory()
    }

    /// Check if this node is the configured root.
    pub fn is_root(&self) -> bool {
        self.parent_path.is_none()
    }

    /// The single logical parent this library operates on. Extra parents
    /// are ignored.
    pub fn parent_id(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    /// Path of this node's parent relative to the configured root. Empty
    /// for direct children of the root and for the root itself.
    pub fn parent_path(&self) -> &str {
        self.parent_path.as_deref().unwrap_or("")
    }

    /// Full virtual path relative to the configured root. The root's own
    /// path is the empty string.
    pub fn path(&self) -> String {
        match &self.parent_path {
            None => String::new(),
            Some(parent) => join_path(parent, &self.name),
        }
    }
}

/// Timestamps arrive as RFC 3339 strings. A present but unparseable value
/// means the store integration is broken in a way the core cannot recover
/// from, so it is treated as a fatal assertion, not an error.
fn parse_time(field: &str, raw: &str) -> DateTime<Utc> {
    match raw.parse::<DateTime<Utc>>() {
        Ok(t) => t,
        Err(err) => panic!("unable to parse {field} (`{raw}'): {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, kind: NodeKind) -> StoreNode {
        StoreNode {
            id: "n1".to_string(),
            name: name.to_string(),
            kind,
            size: 11,
            created_time: Some("2026-08-04T10:00:00+00:00".to_string()),
            modified_time: None,
            parents: vec!["n0".to_string()],
            md5_checksum: None,
            trashed: false,
        }
    }

    #[test]
    fn test_path_derivation() {
        let node = Node::from_store(record("File1", NodeKind::File), "Folder1".to_string());
        assert_eq!(node.path(), "Folder1/File1");
        assert_eq!(node.parent_path(), "Folder1");

        let top = Node::from_store(record("Folder1", NodeKind::Directory), String::new());
        assert_eq!(top.path(), "Folder1");
    }

    #[test]
    fn test_root_path_is_empty() {
        let root = Node::new_root(record("root", NodeKind::Directory));
        assert!(root.is_root());
        assert_eq!(root.path(), "");
        assert_eq!(root.parent_path(), "");
    }

    #[test]
    fn test_name_is_sanitized() {
        let node = Node::from_store(record("a/b's", NodeKind::File), String::new());
        assert_eq!(node.name, "a-b-s");
        assert_eq!(node.path(), "a-b-s");
    }

    #[test]
    fn test_times_parse() {
        let node = Node::from_store(record("File1", NodeKind::File), String::new());
        assert!(node.created_time.is_some());
        assert!(node.modified_time.is_none());
    }

    #[test]
    #[should_panic(expected = "unable to parse created_time")]
    fn test_malformed_time_panics() {
        let mut rec = record("File1", NodeKind::File);
        rec.created_time = Some("not-a-date".to_string());
        let _ = Node::from_store(rec, String::new());
    }

    #[test]
    fn test_single_logical_parent() {
        let mut rec = record("File1", NodeKind::File);
        rec.parents = vec!["p1".to_string(), "p2".to_string()];
        let node = Node::from_store(rec, String::new());
        assert_eq!(node.parent_id(), Some("p1"));
    }
}
