//! # drivepath
//!
//! Path/folder semantics over flat, multi-parent remote object stores.
//!
//! Remote object stores of the cloud-drive family keep a flat collection
//! of nodes linked by parent references: a node can have several parents,
//! names are not unique within a parent, and there is no native path
//! concept, no transactions, and no atomic create-if-missing. This crate
//! puts a conventional `"Folder1/Folder2/File"` view on top of such a
//! store.
//!
//! ## Features
//!
//! - **Path resolution**: slash-delimited paths walked one segment per
//!   store round trip, with duplicate names surfaced as a distinct
//!   ambiguity error instead of being silently picked.
//! - **Tree mutation**: directory creation on demand, rename, move
//!   (single-call parent swap), delete, trash/restore soft deletion, and
//!   trash listing with ancestor-path reconstruction.
//! - **Streaming handles**: incremental read/write over the store's
//!   whole-object download/upload, with the upload running as a background
//!   task fed through an in-process pipe.
//! - **Pluggable backing store**: everything remote sits behind the
//!   [`ObjectStore`] trait; [`MemoryStore`] ships as a complete in-memory
//!   reference implementation.
//!
//! Authentication, transport, pagination, and retry are the store
//! implementation's business, not this crate's.
//!
//! ## Example
//!
//! ```
//! use drivepath::{Driver, MemoryStore, OpenMode};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> drivepath::Result<()> {
//! let driver = Driver::new(MemoryStore::new()).await?;
//!
//! // Directories appear as needed.
//! driver.put("Pictures/Holidays/beach.jpg", std::io::Cursor::new(vec![0xFF, 0xD8])).await?;
//!
//! let node = driver.stat("Pictures/Holidays/beach.jpg").await?;
//! assert_eq!(node.path(), "Pictures/Holidays/beach.jpg");
//!
//! // Stream content back out through a handle.
//! let mut file = driver.open("Pictures/Holidays/beach.jpg", OpenMode::READ).await?;
//! let mut content = Vec::new();
//! file.read_to_end(&mut content).await?;
//! file.close().await?;
//! assert_eq!(content, vec![0xFF, 0xD8]);
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod error;
pub mod fs;
pub mod store;

// Re-export commonly used types
pub use driver::Driver;
pub use error::{BoxError, DriveError, Result};
pub use fs::{FileHandle, HashMethod, Node, OpenMode};
pub use store::{ByteStream, Fields, MemoryStore, NodeKind, ObjectStore, Patch, StoreNode};
