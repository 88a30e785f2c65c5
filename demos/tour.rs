//! Walkthrough of the path-based driver API over the in-memory store.
//!
//! Usage:
//!   cargo run --example tour

use tokio::io::AsyncReadExt;

use drivepath::{Driver, MemoryStore, OpenMode};

#[tokio::main]
async fn main() -> drivepath::Result<()> {
    env_logger::init();

    let driver = Driver::new(MemoryStore::new()).await?;

    // Directories are created on demand, the whole chain in one call.
    let dir = driver.make_directory("Pictures/Holidays/2026").await?;
    println!("created {}", dir.path());

    // Uploading creates missing directories too.
    driver
        .put(
            "Pictures/Holidays/2026/notes.txt",
            std::io::Cursor::new(b"beach day".to_vec()),
        )
        .await?;

    // Streaming write through a handle: the upload runs in the background
    // while we feed the pipe, and close() is the completion barrier.
    let mut file = driver
        .open("Pictures/inbox.txt", OpenMode::WRITE | OpenMode::CREATE)
        .await?;
    file.write_all(b"Hello World").await?;
    let node = file.close().await?.expect("uploaded node");
    println!("uploaded {} ({} bytes)", node.path(), node.size);

    // List a directory.
    println!("\nPictures/");
    driver
        .list("Pictures", |node| {
            let marker = if node.is_directory() { "/" } else { "" };
            println!("  {}{}", node.name, marker);
            Ok(())
        })
        .await?;

    // Read content back.
    let (node, mut stream) = driver.get("Pictures/inbox.txt").await?;
    let mut content = Vec::new();
    stream.read_to_end(&mut content).await.map_err(drivepath::DriveError::store)?;
    println!("\n{} contains {:?}", node.path(), String::from_utf8_lossy(&content));

    // Move it, then throw it away.
    let node = driver.mv("Pictures/inbox.txt", "Archive/2026/inbox.txt").await?;
    println!("moved to {}", node.path());

    driver.trash("Archive/2026/inbox.txt").await?;
    println!("\ntrash:");
    driver
        .list_trash("", |node| {
            println!("  {}", node.path());
            Ok(())
        })
        .await?;

    Ok(())
}
