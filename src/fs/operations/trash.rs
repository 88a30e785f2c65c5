//! Soft deletion and trash listing.

use futures::FutureExt;
use futures::future::BoxFuture;
use log::debug;

use crate::driver::Driver;
use crate::error::{BoxError, DriveError, Result};
use crate::fs::node::Node;
use crate::fs::path::{join_path, sanitize_name};
use crate::store::{Fields, ObjectStore, Patch};

/// Ancestor chains longer than this are treated as outside the scope; the
/// walk must terminate even if a store reports a parent cycle.
const MAX_ANCESTOR_DEPTH: usize = 100;

impl<S: ObjectStore> Driver<S> {
    /// Move a file or directory to the trash.
    ///
    /// The node keeps existing remotely but disappears from resolution and
    /// listing; descendants become unreachable with it.
    pub async fn trash(&self, path: &str) -> Result<()> {
        let root = self.current_root().await;
        let node = self.resolve(&root, path, Fields::ID).await?;
        if node.id == root.id {
            return Err(DriveError::InvalidArgument("root cannot be trashed".to_string()));
        }
        debug!("trashing node {}", node.id);
        self.store().update(&node.id, Patch::trash(), Fields::ID).await?;
        Ok(())
    }

    /// Bring a trashed node back into the tree.
    ///
    /// Trashed nodes cannot be addressed by path (resolution skips them),
    /// so restore takes a node obtained from
    /// [`list_trash`](Self::list_trash). The node reappears under the
    /// parent it was trashed from.
    pub async fn restore(&self, node: &Node) -> Result<Node> {
        debug!("restoring node {}", node.id);
        let record = self
            .store()
            .update(&node.id, Patch::restore(), Fields::METADATA)
            .await?;
        Ok(Node::from_store(record, node.parent_path().to_string()))
    }

    /// List trashed nodes that descend from `scope_path`, calling `visit`
    /// once per node.
    ///
    /// The store's trash is a flat, global list with no path context, so
    /// each entry's parent chain is walked upward until the scope node is
    /// found or ruled out; that walk also reconstructs the path prefix
    /// between the scope and the entry. Trashed nodes outside the scope
    /// are silently skipped. An error returned by `visit` aborts the
    /// listing and surfaces as [`DriveError::Callback`].
    pub async fn list_trash<F>(&self, scope_path: &str, mut visit: F) -> Result<()>
    where
        F: FnMut(Node) -> std::result::Result<(), BoxError>,
    {
        let scope = self
            .resolve_from_root(scope_path, Fields::ID | Fields::NAME)
            .await?;
        let scope_full_path = scope.path();

        let trashed = self
            .store()
            .list_trashed(Fields::METADATA | Fields::PARENTS)
            .await?;
        for record in trashed {
            let prefix =
                is_in_root(self.store(), &scope.id, &record.parents, String::new(), 0).await?;
            if let Some(prefix) = prefix {
                let node = Node::from_store(record, join_path(&scope_full_path, &prefix));
                visit(node).map_err(DriveError::Callback)?;
            }
        }
        Ok(())
    }
}

/// Walk `parents` upward looking for `root_id`. On a hit, returns the
/// slash-joined names between the root and the node whose parents were
/// passed in (the accumulated `base`).
fn is_in_root<'a, S>(
    store: &'a S,
    root_id: &'a str,
    parents: &'a [String],
    base: String,
    depth: usize,
) -> BoxFuture<'a, Result<Option<String>>>
where
    S: ObjectStore,
{
    async move {
        if depth > MAX_ANCESTOR_DEPTH {
            return Ok(None);
        }
        for parent_id in parents {
            if parent_id == root_id {
                return Ok(Some(base.clone()));
            }
            let parent = store
                .get(parent_id, Fields::ID | Fields::NAME | Fields::PARENTS)
                .await?;
            let joined = join_path(&sanitize_name(&parent.name), &base);
            if let Some(found) =
                is_in_root(store, root_id, &parent.parents, joined, depth + 1).await?
            {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
    .boxed()
}
