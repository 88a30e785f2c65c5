//! Path resolution: slash-delimited paths to remote nodes.

use log::debug;

use crate::driver::Driver;
use crate::error::{DriveError, Result};
use crate::fs::node::Node;
use crate::fs::path::{join_parts, sanitize_name, split_path};
use crate::store::{Fields, ObjectStore};

impl<S: ObjectStore> Driver<S> {
    /// Resolve `path` relative to `start`, one lookup per segment.
    ///
    /// `fields` applies to the final segment only; intermediates fetch ids
    /// alone. The empty path returns `start` without touching the store.
    pub(crate) async fn resolve(&self, start: &Node, path: &str, fields: Fields) -> Result<Node> {
        self.resolve_parts(start, &split_path(path), fields).await
    }

    /// Resolve `path` relative to the configured root.
    pub(crate) async fn resolve_from_root(&self, path: &str, fields: Fields) -> Result<Node> {
        let root = self.current_root().await;
        self.resolve(&root, path, fields).await
    }

    pub(crate) async fn resolve_parts(
        &self,
        start: &Node,
        parts: &[&str],
        fields: Fields,
    ) -> Result<Node> {
        if parts.is_empty() {
            return Ok(start.clone());
        }

        let last = parts.len() - 1;
        let mut current_id = start.id.clone();
        for (i, part) in parts.iter().enumerate() {
            let segment_fields = if i == last { fields } else { Fields::ID };
            let mut matches = self
                .store()
                .lookup(&current_id, &sanitize_name(part), segment_fields)
                .await?;

            let record = match matches.len() {
                0 => return Err(DriveError::NotFound(join_parts(&parts[..=i]))),
                1 => matches.remove(0),
                _ => return Err(DriveError::MultipleEntries(join_parts(&parts[..=i]))),
            };

            if i == last {
                debug!("resolved `{}' to node {}", join_parts(parts), record.id);
                return Ok(Node::from_store(record, join_parts(&parts[..last])));
            }
            current_id = record.id;
        }

        unreachable!("non-empty segment walk returns at the last segment")
    }
}
