//! In-memory reference implementation of [`ObjectStore`].
//!
//! Backs the test suite, the demos, and the doctests. The graph lives in a
//! mutex-guarded map of flat records, like the remote stores it stands in
//! for: names are not unique within a parent, nodes carry parent id sets,
//! and the trash flag set on a node does not propagate to its descendants
//! (they stay in place and merely become unreachable through listing).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use md5::{Digest, Md5};
use tokio::io::AsyncReadExt;

use crate::error::{DriveError, Result};
use crate::store::{ByteStream, Fields, NodeKind, ObjectStore, Patch, StoreNode};

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    kind: NodeKind,
    parents: Vec<String>,
    created_time: String,
    modified_time: String,
    trashed: bool,
    content: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    nodes: HashMap<String, Entry>,
    next_id: u64,
}

/// In-memory [`ObjectStore`].
#[derive(Debug)]
pub struct MemoryStore {
    root_id: String,
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store containing only the root directory.
    pub fn new() -> Self {
        let mut state = State::default();
        let root_id = "n0".to_string();
        let now = Utc::now().to_rfc3339();
        state.nodes.insert(
            root_id.clone(),
            Entry {
                name: "root".to_string(),
                kind: NodeKind::Directory,
                parents: Vec::new(),
                created_time: now.clone(),
                modified_time: now,
                trashed: false,
                content: Vec::new(),
            },
        );
        state.next_id = 1;
        MemoryStore {
            root_id,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("memory store state poisoned")
    }

    fn record(id: &str, entry: &Entry) -> StoreNode {
        let md5_checksum = match entry.kind {
            NodeKind::File => {
                let mut hasher = Md5::new();
                hasher.update(&entry.content);
                Some(hex::encode(hasher.finalize()))
            }
            NodeKind::Directory => None,
        };
        StoreNode {
            id: id.to_string(),
            name: entry.name.clone(),
            kind: entry.kind,
            size: match entry.kind {
                NodeKind::File => entry.content.len() as u64,
                NodeKind::Directory => 0,
            },
            created_time: Some(entry.created_time.clone()),
            modified_time: Some(entry.modified_time.clone()),
            parents: entry.parents.clone(),
            md5_checksum,
            trashed: entry.trashed,
        }
    }

    fn missing(id: &str) -> DriveError {
        DriveError::store(format!("no such node: {id}"))
    }

    fn insert(&self, parent_id: &str, name: &str, kind: NodeKind, content: Vec<u8>) -> Result<StoreNode> {
        let mut state = self.lock();
        let parent = state.nodes.get(parent_id).ok_or_else(|| Self::missing(parent_id))?;
        if !parent.kind.is_directory() {
            return Err(DriveError::store(format!("{parent_id} is not a directory")));
        }
        let id = format!("n{}", state.next_id);
        state.next_id += 1;
        let now = Utc::now().to_rfc3339();
        let entry = Entry {
            name: name.to_string(),
            kind,
            parents: vec![parent_id.to_string()],
            created_time: now.clone(),
            modified_time: now,
            trashed: false,
            content,
        };
        let record = Self::record(&id, &entry);
        state.nodes.insert(id, entry);
        Ok(record)
    }

    async fn drain(content: ByteStream) -> Result<Vec<u8>> {
        let mut content = content;
        let mut buf = Vec::new();
        content
            .read_to_end(&mut buf)
            .await
            .map_err(DriveError::store)?;
        Ok(buf)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn root(&self, fields: Fields) -> Result<StoreNode> {
        self.get(&self.root_id, fields).await
    }

    async fn get(&self, id: &str, _fields: Fields) -> Result<StoreNode> {
        let state = self.lock();
        let entry = state.nodes.get(id).ok_or_else(|| Self::missing(id))?;
        Ok(Self::record(id, entry))
    }

    async fn lookup(&self, parent_id: &str, name: &str, _fields: Fields) -> Result<Vec<StoreNode>> {
        let state = self.lock();
        Ok(state
            .nodes
            .iter()
            .filter(|(_, e)| {
                !e.trashed && e.name == name && e.parents.iter().any(|p| p == parent_id)
            })
            .map(|(id, e)| Self::record(id, e))
            .collect())
    }

    async fn create(&self, parent_id: &str, name: &str, kind: NodeKind) -> Result<StoreNode> {
        self.insert(parent_id, name, kind, Vec::new())
    }

    async fn update(&self, id: &str, patch: Patch, _fields: Fields) -> Result<StoreNode> {
        let mut state = self.lock();
        let entry = state.nodes.get_mut(id).ok_or_else(|| Self::missing(id))?;
        if let Some(name) = patch.name {
            entry.name = name;
        }
        if let Some(trashed) = patch.trashed {
            entry.trashed = trashed;
        }
        entry
            .parents
            .retain(|p| !patch.remove_parents.iter().any(|r| r == p));
        for parent in patch.add_parents {
            if !entry.parents.contains(&parent) {
                entry.parents.push(parent);
            }
        }
        entry.modified_time = Utc::now().to_rfc3339();
        Ok(Self::record(id, entry))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        if !state.nodes.contains_key(id) {
            return Err(Self::missing(id));
        }
        // Remove the node and everything reachable below it.
        let mut doomed = vec![id.to_string()];
        let mut i = 0;
        while i < doomed.len() {
            let parent = doomed[i].clone();
            let children: Vec<String> = state
                .nodes
                .iter()
                .filter(|(_, e)| e.parents.iter().any(|p| p == &parent))
                .map(|(cid, _)| cid.clone())
                .collect();
            for child in children {
                if !doomed.contains(&child) {
                    doomed.push(child);
                }
            }
            i += 1;
        }
        for gone in doomed {
            state.nodes.remove(&gone);
        }
        Ok(())
    }

    async fn list(&self, parent_id: &str, _fields: Fields) -> Result<Vec<StoreNode>> {
        let state = self.lock();
        Ok(state
            .nodes
            .iter()
            .filter(|(_, e)| !e.trashed && e.parents.iter().any(|p| p == parent_id))
            .map(|(id, e)| Self::record(id, e))
            .collect())
    }

    async fn list_trashed(&self, _fields: Fields) -> Result<Vec<StoreNode>> {
        let state = self.lock();
        Ok(state
            .nodes
            .iter()
            .filter(|(_, e)| e.trashed)
            .map(|(id, e)| Self::record(id, e))
            .collect())
    }

    async fn download(&self, id: &str) -> Result<ByteStream> {
        let state = self.lock();
        let entry = state.nodes.get(id).ok_or_else(|| Self::missing(id))?;
        if entry.kind.is_directory() {
            return Err(DriveError::store(format!("{id} has no content")));
        }
        let content = entry.content.clone();
        Ok(Box::pin(std::io::Cursor::new(content)))
    }

    async fn upload(&self, parent_id: &str, name: &str, content: ByteStream) -> Result<StoreNode> {
        let buf = Self::drain(content).await?;
        self.insert(parent_id, name, NodeKind::File, buf)
    }

    async fn replace(&self, id: &str, content: ByteStream) -> Result<StoreNode> {
        let buf = Self::drain(content).await?;
        let mut state = self.lock();
        let entry = state.nodes.get_mut(id).ok_or_else(|| Self::missing(id))?;
        if entry.kind.is_directory() {
            return Err(DriveError::store(format!("{id} has no content")));
        }
        entry.content = buf;
        entry.modified_time = Utc::now().to_rfc3339();
        Ok(Self::record(id, entry))
    }
}
