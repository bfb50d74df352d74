//! `.gclient` generation.

use std::io;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::consts::{SRC_DIR, TARGET_OS};
use crate::context::PipelineContext;
use crate::exec::Runner;
use crate::pipeline::types::{StageError, command_err, io_err};

/// Line restricting gclient to a single target platform.
pub fn target_os_line() -> String {
  format!("target_os = [ '{}' ]\n", TARGET_OS)
}

/// Pin the source checkout to the run's version and restrict `target_os`.
///
/// The platform line is appended on every call. gclient rewrites `.gclient`
/// on `config`, so this only accumulates when something else left the file
/// in place.
pub async fn run<R: Runner>(ctx: &PipelineContext, runner: &R) -> Result<(), StageError> {
  let pinned = format!("{}@{}", ctx.config().chromium_src_url, ctx.version());
  info!(url = %pinned, "configuring gclient");

  runner
    .run(&ctx.gclient().args(["config", "--name", SRC_DIR]).arg(&pinned))
    .await
    .map_err(command_err("gclient config"))?;

  let path = ctx.gclient_file();
  let line = target_os_line();

  let existing = match tokio::fs::read_to_string(&path).await {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
    Err(e) => {
      warn!(path = %path.display(), error = %e, "could not read gclient config");
      String::new()
    }
  };
  if existing.contains(line.trim_end()) {
    warn!(path = %path.display(), "target_os already restricted, appending again");
  }

  let mut file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(&path)
    .await
    .map_err(io_err("open gclient config", &path))?;
  file
    .write_all(line.as_bytes())
    .await
    .map_err(io_err("append to gclient config", &path))?;
  file.flush().await.map_err(io_err("flush gclient config", &path))?;

  Ok(())
}
