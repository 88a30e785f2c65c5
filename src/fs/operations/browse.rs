//! Browsing: stat and directory listing.

use crate::driver::Driver;
use crate::error::{BoxError, DriveError, Result};
use crate::fs::node::Node;
use crate::store::{Fields, ObjectStore};

impl<S: ObjectStore> Driver<S> {
    /// Get information about a file or directory.
    ///
    /// The empty path (and `"/"`) stats the configured root.
    pub async fn stat(&self, path: &str) -> Result<Node> {
        self.resolve_from_root(path, Fields::METADATA).await
    }

    /// List the direct children of a directory, calling `visit` once per
    /// child.
    ///
    /// Children are fresh [`Node`] snapshots whose parent path is the
    /// resolved directory's full path. Listing is one level deep and
    /// unordered. An error returned by `visit` aborts the iteration and
    /// surfaces as [`DriveError::Callback`], distinguishable from store
    /// failures.
    pub async fn list<F>(&self, path: &str, mut visit: F) -> Result<()>
    where
        F: FnMut(Node) -> std::result::Result<(), BoxError>,
    {
        let dir = self
            .resolve_from_root(path, Fields::ID | Fields::NAME | Fields::KIND)
            .await?;
        if !dir.is_directory() {
            return Err(DriveError::NotADirectory(path.to_string()));
        }

        let dir_path = dir.path();
        let children = self.store().list(&dir.id, Fields::METADATA).await?;
        for child in children {
            visit(Node::from_store(child, dir_path.clone())).map_err(DriveError::Callback)?;
        }
        Ok(())
    }
}
