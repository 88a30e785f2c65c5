//! Streaming file handles over whole-object network transfers.
//!
//! The backing store only moves whole objects. Handles adapt that to an
//! incremental interface: a read handle pulls from the download stream as
//! the caller asks for bytes, and a write handle feeds a background upload
//! task through an in-process pipe so the caller never has to buffer the
//! object in memory.

use bitflags::bitflags;
use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

use crate::driver::Driver;
use crate::error::{DriveError, Result};
use crate::fs::node::Node;
use crate::store::{ByteStream, Fields, ObjectStore};

/// Pipe capacity between a write handle and its upload task. Writes past
/// this much unconsumed data block until the uploader catches up.
const PIPE_CAPACITY: usize = 64 * 1024;

bitflags! {
    /// Mode for [`Driver::open`].
    ///
    /// Exactly one of `READ` and `WRITE` must be set. `CREATE` only
    /// affects `WRITE`: a missing path becomes a new file on close.
    /// `READ | CREATE` on a missing path is still not found.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenMode: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const CREATE = 1 << 2;
    }
}

impl<S: ObjectStore + 'static> Driver<S> {
    /// Open a file handle on `path`.
    ///
    /// Directories are rejected for either mode before any content
    /// transfer is attempted. A write handle's upload does not start until
    /// the first write (or close); see [`FileHandle::close`] for the
    /// completion contract.
    pub async fn open(&self, path: &str, mode: OpenMode) -> Result<FileHandle<S>> {
        let rw = mode & (OpenMode::READ | OpenMode::WRITE);
        if rw != OpenMode::READ && rw != OpenMode::WRITE {
            return Err(DriveError::InvalidArgument(
                "open mode must be read-only or write-only".to_string(),
            ));
        }

        if mode.contains(OpenMode::READ) {
            let node = self.resolve_from_root(path, Fields::METADATA).await?;
            if node.is_directory() {
                return Err(DriveError::IsADirectory(path.to_string()));
            }
            return Ok(FileHandle {
                variant: Variant::Read(ReadFile {
                    driver: self.clone(),
                    node,
                    state: ReadState::Pending,
                }),
            });
        }

        let existing = match self.resolve_from_root(path, Fields::METADATA).await {
            Ok(node) => {
                if node.is_directory() {
                    return Err(DriveError::IsADirectory(path.to_string()));
                }
                Some(node)
            }
            Err(DriveError::NotFound(_)) if mode.contains(OpenMode::CREATE) => None,
            Err(err) => return Err(err),
        };

        Ok(FileHandle {
            variant: Variant::Write(WriteFile {
                driver: self.clone(),
                path: path.to_string(),
                existing,
                state: None,
            }),
        })
    }
}

/// A handle to remote file content, returned by [`Driver::open`].
pub struct FileHandle<S: ObjectStore + 'static> {
    variant: Variant<S>,
}

enum Variant<S: ObjectStore + 'static> {
    Read(ReadFile<S>),
    Write(WriteFile<S>),
}

impl<S: ObjectStore + 'static> FileHandle<S> {
    /// The node this handle was opened against, if it existed at open
    /// time.
    pub fn node(&self) -> Option<&Node> {
        match &self.variant {
            Variant::Read(f) => Some(&f.node),
            Variant::Write(f) => f.existing.as_ref(),
        }
    }

    /// Read into `buf`, returning the number of bytes read; 0 means end of
    /// stream. Fails immediately on write-only handles.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match &mut self.variant {
            Variant::Read(f) => f.read(buf).await,
            Variant::Write(_) => Err(DriveError::InvalidArgument(
                "file is open write-only".to_string(),
            )),
        }
    }

    /// Read the remaining content to the end of the stream.
    pub async fn read_to_end(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        let mut chunk = [0u8; 8 * 1024];
        let mut total = 0;
        loop {
            let n = self.read(&mut chunk).await?;
            if n == 0 {
                return Ok(total);
            }
            buf.extend_from_slice(&chunk[..n]);
            total += n;
        }
    }

    /// Write from `buf`, returning the number of bytes accepted. Blocks
    /// only on pipe back-pressure, never on the upload completing. Fails
    /// immediately on read-only handles without touching the network.
    pub async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match &mut self.variant {
            Variant::Read(_) => Err(DriveError::InvalidArgument(
                "file is open read-only".to_string(),
            )),
            Variant::Write(f) => f.write(buf).await,
        }
    }

    /// Write all of `buf`.
    pub async fn write_all(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            let n = self.write(buf).await?;
            buf = &buf[n..];
        }
        Ok(())
    }

    /// Close the handle.
    ///
    /// For a write handle this is the synchronization barrier for the
    /// whole operation: it signals end-of-stream to the uploader, waits
    /// for the background task, and surfaces any upload error — callers
    /// must check it. On success it returns the uploaded node. Closing
    /// without a prior write still performs the upload, producing an
    /// empty object.
    ///
    /// For a read handle it releases the download stream (acquiring it
    /// first if no read ever happened) and returns `None`.
    pub async fn close(self) -> Result<Option<Node>> {
        match self.variant {
            Variant::Read(f) => {
                f.close().await?;
                Ok(None)
            }
            Variant::Write(f) => f.close().await.map(Some),
        }
    }
}

impl<S: ObjectStore + 'static> std::fmt::Debug for FileHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.variant {
            Variant::Read(file) => f
                .debug_struct("FileHandle")
                .field("mode", &"read")
                .field("path", &file.node.path())
                .finish(),
            Variant::Write(file) => f
                .debug_struct("FileHandle")
                .field("mode", &"write")
                .field("path", &file.path)
                .finish(),
        }
    }
}

struct ReadFile<S: ObjectStore + 'static> {
    driver: Driver<S>,
    node: Node,
    state: ReadState,
}

/// One-shot acquisition guard for the download stream. A failed
/// acquisition is sticky; later reads report it instead of retrying.
enum ReadState {
    Pending,
    Open(ByteStream),
    Failed,
}

impl<S: ObjectStore + 'static> ReadFile<S> {
    /// Acquire the download stream, lazily and exactly once.
    async fn ensure_stream(&mut self) -> Result<()> {
        if matches!(self.state, ReadState::Pending) {
            match self.driver.store().download(&self.node.id).await {
                Ok(stream) => self.state = ReadState::Open(stream),
                Err(err) => {
                    self.state = ReadState::Failed;
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_stream().await?;
        match &mut self.state {
            ReadState::Open(stream) => stream.read(buf).await.map_err(DriveError::store),
            _ => Err(DriveError::store("download stream unavailable after failed acquisition")),
        }
    }

    async fn close(mut self) -> Result<()> {
        self.ensure_stream().await?;
        Ok(())
    }
}

struct WriteFile<S: ObjectStore + 'static> {
    driver: Driver<S>,
    path: String,
    /// Node the handle was opened against; `None` means create-on-write.
    existing: Option<Node>,
    state: Option<WriteState>,
}

struct WriteState {
    pipe: DuplexStream,
    task: JoinHandle<Result<Node>>,
}

impl<S: ObjectStore + 'static> WriteFile<S> {
    /// Start the background upload, lazily and exactly once per handle.
    /// The task consumes the far end of the pipe while the handle writes
    /// into the near end.
    fn spawn_upload(&self) -> WriteState {
        let (pipe, feed) = tokio::io::duplex(PIPE_CAPACITY);
        let driver = self.driver.clone();
        let task = match &self.existing {
            Some(node) => {
                let id = node.id.clone();
                let parent_path = node.parent_path().to_string();
                debug!("replacing content of node {id}");
                tokio::spawn(async move {
                    let record = driver.store().replace(&id, Box::pin(feed)).await?;
                    Ok(Node::from_store(record, parent_path))
                })
            }
            None => {
                let path = self.path.clone();
                debug!("uploading new file `{path}'");
                tokio::spawn(async move { driver.put(&path, feed).await })
            }
        };
        WriteState { pipe, task }
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.state.is_none() {
            self.state = Some(self.spawn_upload());
        }
        let Some(state) = self.state.as_mut() else {
            unreachable!("write state initialized above");
        };
        // A pipe error means the upload task is gone; the real cause
        // surfaces when close() joins it.
        state.pipe.write(buf).await.map_err(DriveError::store)
    }

    async fn close(mut self) -> Result<Node> {
        if self.state.is_none() {
            self.state = Some(self.spawn_upload());
        }
        let Some(WriteState { mut pipe, task }) = self.state.take() else {
            unreachable!("write state initialized above");
        };
        // End-of-stream for the uploader; a broken pipe here just means
        // the task already finished or failed, which the join reports.
        let _ = pipe.shutdown().await;
        drop(pipe);

        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => panic!("upload task failed to complete: {err}"),
        }
    }
}
