//! Checksum sidecar listings.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::consts::{HASH_ALGORITHMS, HASHES_EXTENSION};
use crate::context::PipelineContext;
use crate::exec::Runner;
use crate::pipeline::types::{StageError, command_err, io_err};

/// `<archive>.hashes`, next to the archive.
pub fn sidecar_path(archive: &Path) -> PathBuf {
  let mut name = archive.as_os_str().to_os_string();
  name.push(".");
  name.push(HASHES_EXTENSION);
  PathBuf::from(name)
}

/// One listing line: algorithm, two spaces, the digest tool's own output.
pub fn hash_line(algorithm: &str, tool_output: &str) -> String {
  format!("{}  {}\n", algorithm, tool_output.trim())
}

/// Run every digest tool over `archive` and write the sidecar listing.
///
/// The tools run from the archive's directory so their output names the bare
/// file. The listing is written in one go once every tool has succeeded, so
/// it always holds one line per algorithm.
pub async fn write_hashes<R: Runner>(ctx: &PipelineContext, runner: &R, archive: &Path) -> Result<PathBuf, StageError> {
  let dir = archive.parent().unwrap_or(Path::new("."));
  let file_name: OsString = archive.file_name().map(ToOwned::to_owned).unwrap_or_default();

  let mut listing = String::new();
  for algorithm in HASH_ALGORITHMS {
    let tool = format!("{}sum", algorithm);
    let output = runner
      .run(&ctx.command_in(&tool, dir).arg(&file_name))
      .await
      .map_err(command_err(format!("{} {}", tool, file_name.to_string_lossy())))?;
    listing.push_str(&hash_line(algorithm, &output.stdout));
  }

  let hashes = sidecar_path(archive);
  fs::write(&hashes, listing)
    .await
    .map_err(io_err("write checksums to", &hashes))?;
  debug!(path = %hashes.display(), "checksums written");
  Ok(hashes)
}
