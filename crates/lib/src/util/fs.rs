//! Filesystem helpers shared by stages.

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::debug;

/// Move a file, falling back to copy-and-delete across filesystems.
pub async fn move_file(from: &Path, to: &Path) -> io::Result<()> {
  match fs::rename(from, to).await {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
      debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
      fs::copy(from, to).await?;
      fs::remove_file(from).await
    }
    Err(e) => Err(e),
  }
}

/// Remove a file, treating "already gone" as success.
pub async fn remove_file_if_exists(path: &Path) -> io::Result<()> {
  match fs::remove_file(path).await {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    other => other,
  }
}
