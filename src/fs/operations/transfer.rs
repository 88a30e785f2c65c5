//! Content transfer: download, upload, and content hashes.

use log::debug;
use tokio::io::AsyncRead;

use crate::driver::Driver;
use crate::error::{DriveError, Result};
use crate::fs::node::Node;
use crate::fs::path::{join_parts, sanitize_name, split_path};
use crate::store::{ByteStream, Fields, ObjectStore};

/// Content hashing method for [`Driver::get_hash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HashMethod {
    /// MD5 of the whole content, as reported by the store.
    Md5,
}

impl<S: ObjectStore> Driver<S> {
    /// Get a file node together with a stream of its content.
    pub async fn get(&self, path: &str) -> Result<(Node, ByteStream)> {
        let node = self.resolve_from_root(path, Fields::METADATA).await?;
        if node.is_directory() {
            return Err(DriveError::IsADirectory(path.to_string()));
        }
        let content = self.store().download(&node.id).await?;
        Ok((node, content))
    }

    /// Get a file node together with the raw digest of its content.
    ///
    /// The digest is whatever the store recorded for the node, decoded
    /// from its hex form; the content is not downloaded or re-hashed here.
    pub async fn get_hash(&self, path: &str, method: HashMethod) -> Result<(Node, Vec<u8>)> {
        match method {
            HashMethod::Md5 => {}
        }
        let node = self
            .resolve_from_root(path, Fields::METADATA | Fields::CHECKSUM)
            .await?;
        if node.is_directory() {
            return Err(DriveError::IsADirectory(path.to_string()));
        }
        let checksum = node.md5_checksum.clone().ok_or_else(|| {
            DriveError::InvalidResponse(format!("no checksum reported for `{path}'"))
        })?;
        let digest = hex::decode(&checksum).map_err(|err| {
            DriveError::InvalidResponse(format!("malformed checksum `{checksum}': {err}"))
        })?;
        Ok((node, digest))
    }

    /// Upload a file to `path`, creating missing directories along the
    /// way.
    ///
    /// Uploading to an existing leaf name creates a second object with
    /// that name rather than overwriting the first — the backing store
    /// does not enforce name uniqueness, and afterwards resolving the name
    /// fails as ambiguous. Callers that want to overwrite delete the old
    /// node first.
    pub async fn put<R>(&self, path: &str, content: R) -> Result<Node>
    where
        R: AsyncRead + Send + 'static,
    {
        let parts = split_path(path);
        if parts.is_empty() {
            return Err(DriveError::InvalidArgument("path cannot be empty".to_string()));
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

        debug!("uploading `{}' under node {}", join_parts(&parts), parent.id);
        let record = self
            .store()
            .upload(&parent.id, &sanitize_name(leaf[0]), Box::pin(content))
            .await?;
        Ok(Node::from_store(record, join_parts(dir_parts)))
    }
}
