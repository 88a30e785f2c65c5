//! Directory creation and node mutation operations.

use log::debug;

use crate::driver::Driver;
use crate::error::{DriveError, Result};
use crate::fs::node::Node;
use crate::fs::path::{join_parts, sanitize_name, split_path};
use crate::store::{Fields, NodeKind, ObjectStore, Patch};

impl<S: ObjectStore> Driver<S> {
    /// Create a directory at `path`, creating missing intermediate
    /// directories along the way.
    ///
    /// Existing segments are reused as-is, so creating an already existing
    /// path is a no-op that returns the existing leaf. The empty path
    /// returns the configured root.
    pub async fn make_directory(&self, path: &str) -> Result<Node> {
        self.make_directory_by_parts(&split_path(path)).await
    }

    pub(crate) async fn make_directory_by_parts(&self, parts: &[&str]) -> Result<Node> {
        let root = self.current_root().await;
        let mut current = (*root).clone();

        for (i, part) in parts.iter().enumerate() {
            let name = sanitize_name(part);
            let mut matches = self
                .store()
                .lookup(&current.id, &name, Fields::METADATA)
                .await?;

            current = match matches.len() {
                0 => {
                    if !current.is_directory() {
                        return Err(DriveError::CreateUnder {
                            what: "directory",
                            parent: join_parts(&parts[..i]),
                            name: current.name.clone(),
                        });
                    }
                    let created = self
                        .store()
                        .create(&current.id, &name, NodeKind::Directory)
                        .await?;
                    debug!("created directory `{}' as node {}", join_parts(&parts[..=i]), created.id);
                    Node::from_store(created, join_parts(&parts[..i]))
                }
                1 => Node::from_store(matches.remove(0), join_parts(&parts[..i])),
                _ => return Err(DriveError::MultipleEntries(join_parts(&parts[..=i]))),
            };
        }

        Ok(current)
    }

    /// Delete a file or directory. Deleting a directory deletes its
    /// descendants with it; that is a property of the backing store, not a
    /// recursive walk here.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let root = self.current_root().await;
        let node = self.resolve(&root, path, Fields::ID).await?;
        if node.id == root.id {
            return Err(DriveError::InvalidArgument("root cannot be deleted".to_string()));
        }
        self.store().delete(&node.id).await
    }

    /// Delete a directory and its descendants. Unlike [`delete`](Self::delete)
    /// this refuses to remove anything that is not a directory.
    pub async fn delete_directory(&self, path: &str) -> Result<()> {
        let root = self.current_root().await;
        let node = self.resolve(&root, path, Fields::ID | Fields::KIND).await?;
        if !node.is_directory() {
            return Err(DriveError::NotADirectory(path.to_string()));
        }
        if node.id == root.id {
            return Err(DriveError::InvalidArgument("root cannot be deleted".to_string()));
        }
        self.store().delete(&node.id).await
    }

    /// Rename a file or directory in place.
    ///
    /// `new_name` is a plain name, not a path: names containing a path
    /// separator are rejected instead of being truncated to their last
    /// segment. The quoting character is sanitized like everywhere else.
    pub async fn rename(&self, path: &str, new_name: &str) -> Result<Node> {
        let parts = split_path(new_name);
        let name = match parts.as_slice() {
            [] => {
                return Err(DriveError::InvalidArgument("new name cannot be empty".to_string()));
            }
            [name] => sanitize_name(name),
            _ => {
                return Err(DriveError::InvalidArgument(
                    "new name cannot contain a path separator".to_string(),
                ));
            }
        };

        let root = self.current_root().await;
        let node = self.resolve(&root, path, Fields::ID).await?;
        if node.id == root.id {
            return Err(DriveError::InvalidArgument("root cannot be renamed".to_string()));
        }

        let updated = self
            .store()
            .update(&node.id, Patch::rename(name), Fields::METADATA)
            .await?;
        Ok(Node::from_store(updated, node.parent_path().to_string()))
    }

    /// Move a file or directory to a new path, renaming it if the leaf
    /// name differs and creating missing destination directories.
    ///
    /// The parent swap and the rename land in a single store update, so a
    /// concurrent lister never observes the node with both or neither
    /// parent.
    pub async fn mv(&self, old_path: &str, new_path: &str) -> Result<Node> {
        let parts = split_path(new_path);
        if parts.is_empty() {
            return Err(DriveError::InvalidArgument("new path cannot be empty".to_string()));
        }

        let root = self.current_root().await;
        let source = self
            .resolve(&root, old_path, Fields::ID | Fields::PARENTS)
            .await?;
        if source.id == root.id {
            return Err(DriveError::InvalidArgument("root cannot be moved".to_string()));
        }

        let (dir_parts, leaf) = parts.split_at(parts.len() - 1);
        let parent = self.make_directory_by_parts(dir_parts).await?;
        if !parent.is_directory() {
            return Err(DriveError::CreateUnder {
                what: "file",
                parent: join_parts(dir_parts),
                name: parent.name.clone(),
            });
        }

        debug!("moving node {} under node {}", source.id, parent.id);
        let patch = Patch::reparent(sanitize_name(leaf[0]), parent.id, source.parents);
        let updated = self
            .store()
            .update(&source.id, patch, Fields::METADATA)
            .await?;
        Ok(Node::from_store(updated, join_parts(dir_parts)))
    }
}
