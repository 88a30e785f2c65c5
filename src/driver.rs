//! Path-based driver facade over a backing object store.

use std::sync::Arc;

use log::info;
use tokio::sync::RwLock;

use crate::error::{DriveError, Result};
use crate::fs::node::Node;
use crate::store::{Fields, ObjectStore};

/// Path-based view over an [`ObjectStore`].
///
/// All paths are `/`-separated and resolved relative to a configured root
/// node; leading, trailing, and repeated separators are normalized away,
/// and the empty path denotes the root itself.
///
/// The driver is a cheap handle: cloning shares the store and the root
/// configuration. Operations may be issued concurrently from separate
/// tasks; each one is independently sequential and the driver adds no
/// cross-operation coordination beyond what the store itself offers.
///
/// # Example
///
/// ```
/// use drivepath::{Driver, MemoryStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> drivepath::Result<()> {
/// let driver = Driver::new(MemoryStore::new()).await?;
///
/// driver.put("Folder1/File1", std::io::Cursor::new(b"Hello World".to_vec())).await?;
/// let node = driver.stat("Folder1/File1").await?;
/// assert_eq!(node.path(), "Folder1/File1");
/// # Ok(())
/// # }
/// ```
pub struct Driver<S: ObjectStore> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    store: S,
    root: RwLock<Arc<Node>>,
}

impl<S: ObjectStore> Clone for Driver<S> {
    fn clone(&self) -> Self {
        Driver {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ObjectStore> Driver<S> {
    /// Create a driver rooted at the store's base node.
    pub async fn new(store: S) -> Result<Self> {
        Self::with_root(store, "").await
    }

    /// Create a driver rooted at `path`, resolved from the store's base
    /// node.
    pub async fn with_root(store: S, path: &str) -> Result<Self> {
        let base = Node::new_root(store.root(Fields::METADATA).await?);
        let driver = Driver {
            inner: Arc::new(Inner {
                store,
                root: RwLock::new(Arc::new(base.clone())),
            }),
        };
        driver.anchor_root(&base, path).await?;
        Ok(driver)
    }

    /// Change the configured root directory.
    ///
    /// `path` is resolved against the store's base node, not the current
    /// root, so it is always the absolute remote path. The target must be
    /// a directory. The root is replaced wholesale; operations already in
    /// flight keep the node they started with.
    pub async fn set_root(&self, path: &str) -> Result<Node> {
        let base = Node::new_root(self.inner.store.root(Fields::METADATA).await?);
        self.anchor_root(&base, path).await
    }

    /// Resolve `path` beneath `base` and install the result as the
    /// configured root.
    async fn anchor_root(&self, base: &Node, path: &str) -> Result<Node> {
        let node = self.resolve(base, path, Fields::METADATA).await?;
        if !node.is_directory() {
            return Err(DriveError::NotADirectory(path.to_string()));
        }
        let root = node.into_root();
        info!("root set to node {}", root.id);
        *self.inner.root.write().await = Arc::new(root.clone());
        Ok(root)
    }

    /// The currently configured root node.
    pub async fn root(&self) -> Node {
        (*self.current_root().await).clone()
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub(crate) async fn current_root(&self) -> Arc<Node> {
        Arc::clone(&*self.inner.root.read().await)
    }
}
