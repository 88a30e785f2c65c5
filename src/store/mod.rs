//! Backing-store collaborator contract.
//!
//! The driver core never speaks a wire protocol. Everything it needs from
//! the remote side is expressed by [`ObjectStore`]: node lookup by
//! parent+name, node creation, partial-field update, deletion, flat trash
//! listing, and whole-object content download/upload. Authentication,
//! transport, pagination, and retry all live behind an implementation of
//! this trait.

pub mod memory;

use std::pin::Pin;

use async_trait::async_trait;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

use crate::error::Result;

pub use memory::MemoryStore;

/// Byte stream handed across the store boundary for downloads and uploads.
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

/// Node kind. Directories are a distinguished kind of node, not a separate
/// type, matching how the remote stores model them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Regular file
    #[default]
    File,
    /// Directory/folder
    Directory,
}

impl NodeKind {
    /// Check if this kind can have children.
    pub fn is_directory(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

bitflags! {
    /// Metadata projection for store calls.
    ///
    /// Each call states which fields of the returned records it needs;
    /// a store only has to populate those. Intermediate path segments are
    /// resolved with [`Fields::ID`] alone to keep per-segment round trips
    /// cheap, and only the final segment carries the caller's projection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Fields: u8 {
        const ID = 1 << 0;
        const NAME = 1 << 1;
        const KIND = 1 << 2;
        const SIZE = 1 << 3;
        const TIMES = 1 << 4;
        const PARENTS = 1 << 5;
        const CHECKSUM = 1 << 6;

        /// The standard projection for nodes handed back to callers.
        const METADATA = Self::ID.bits()
            | Self::NAME.bits()
            | Self::KIND.bits()
            | Self::SIZE.bits()
            | Self::TIMES.bits();
    }
}

/// Raw record describing one remote entry.
///
/// Fields beyond `id` are only meaningful when the corresponding
/// [`Fields`] bit was requested; stores may leave the rest at their
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreNode {
    /// Opaque stable identifier. Never reused, never changes.
    pub id: String,
    /// Display name as stored. Stores do not enforce uniqueness within a
    /// parent.
    #[serde(default)]
    pub name: String,
    /// Node kind.
    #[serde(default)]
    pub kind: NodeKind,
    /// Content size in bytes (0 for directories).
    #[serde(default)]
    pub size: u64,
    /// Creation time, RFC 3339.
    #[serde(default)]
    pub created_time: Option<String>,
    /// Last modification time, RFC 3339.
    #[serde(default)]
    pub modified_time: Option<String>,
    /// Parent node ids. Stores allow more than one.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Lowercase hex MD5 of the content, files only.
    #[serde(default)]
    pub md5_checksum: Option<String>,
    /// Soft-deletion flag.
    #[serde(default)]
    pub trashed: bool,
}

/// Partial update for [`ObjectStore::update`].
///
/// Unset fields are absent from the serialized form, so an update only
/// touches what it names. A move is expressed as `add_parents` +
/// `remove_parents` + `name` in one patch, which keeps the parent swap a
/// single store call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trashed: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub add_parents: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub remove_parents: Vec<String>,
}

impl Patch {
    /// Patch that renames a node in place.
    pub fn rename(name: impl Into<String>) -> Self {
        Patch {
            name: Some(name.into()),
            ..Patch::default()
        }
    }

    /// Patch that soft-deletes a node.
    pub fn trash() -> Self {
        Patch {
            trashed: Some(true),
            ..Patch::default()
        }
    }

    /// Patch that clears the soft-deletion flag.
    pub fn restore() -> Self {
        Patch {
            trashed: Some(false),
            ..Patch::default()
        }
    }

    /// Patch that moves a node under `new_parent` with `name`, dropping
    /// every parent in `old_parents`.
    pub fn reparent(
        name: impl Into<String>,
        new_parent: impl Into<String>,
        old_parents: Vec<String>,
    ) -> Self {
        Patch {
            name: Some(name.into()),
            trashed: None,
            add_parents: vec![new_parent.into()],
            remove_parents: old_parents,
        }
    }
}

/// The backing object store.
///
/// Contract notes, binding for every implementation:
///
/// - [`lookup`](Self::lookup) and [`list`](Self::list) exclude trashed
///   nodes; [`get`](Self::get) does not (it serves ancestor walks that must
///   see everything).
/// - `lookup` matches `name` verbatim against the stored name. The driver
///   sanitizes names before calling, so implementations never see a path
///   separator or a quoting character in `name`.
/// - `create` and `upload` do not enforce name uniqueness; colliding names
///   produce siblings.
/// - `delete` on a directory removes all descendants.
/// - The `fields` argument is a projection hint: only the requested fields
///   must be populated in returned records. Returning more is allowed.
/// - Errors are opaque to the core and surface unchanged as
///   [`DriveError::Store`](crate::error::DriveError::Store). Retry belongs
///   here, not in the core.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// The store's base node, the anchor for absolute resolution.
    async fn root(&self, fields: Fields) -> Result<StoreNode>;

    /// Fetch one node by id, trashed or not.
    async fn get(&self, id: &str, fields: Fields) -> Result<StoreNode>;

    /// Children of `parent_id` whose stored name equals `name`, excluding
    /// trashed nodes. May return zero, one, or several records.
    async fn lookup(&self, parent_id: &str, name: &str, fields: Fields) -> Result<Vec<StoreNode>>;

    /// Create an empty node under `parent_id`.
    async fn create(&self, parent_id: &str, name: &str, kind: NodeKind) -> Result<StoreNode>;

    /// Apply a partial update and return the patched record.
    async fn update(&self, id: &str, patch: Patch, fields: Fields) -> Result<StoreNode>;

    /// Delete a node; directories take their descendants with them.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Direct children of `parent_id`, excluding trashed nodes.
    async fn list(&self, parent_id: &str, fields: Fields) -> Result<Vec<StoreNode>>;

    /// Every explicitly trashed node in the store, flat, no path context.
    async fn list_trashed(&self, fields: Fields) -> Result<Vec<StoreNode>>;

    /// Stream the content of a file node.
    async fn download(&self, id: &str) -> Result<ByteStream>;

    /// Create a new file node under `parent_id` from a content stream.
    async fn upload(&self, parent_id: &str, name: &str, content: ByteStream)
        -> Result<StoreNode>;

    /// Replace the content of an existing file node in place.
    async fn replace(&self, id: &str, content: ByteStream) -> Result<StoreNode>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_serializes_only_named_fields() {
        let patch = Patch::rename("New");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "New" }));

        let patch = Patch::reparent("File1", "p2", vec!["p1".to_string()]);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "File1",
                "add_parents": ["p2"],
                "remove_parents": ["p1"],
            })
        );

        let json = serde_json::to_value(Patch::trash()).unwrap();
        assert_eq!(json, serde_json::json!({ "trashed": true }));
    }

    #[test]
    fn test_fields_metadata_projection() {
        assert!(Fields::METADATA.contains(Fields::ID | Fields::NAME | Fields::KIND));
        assert!(!Fields::METADATA.contains(Fields::CHECKSUM));
        assert!(!Fields::METADATA.contains(Fields::PARENTS));
    }

    #[test]
    fn test_node_kind() {
        assert!(NodeKind::Directory.is_directory());
        assert!(!NodeKind::File.is_directory());
    }
}
