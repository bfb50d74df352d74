//! Interpreter check run before any side effect.

use std::path::Path;

use tracing::info;

use crate::context::PipelineContext;
use crate::exec::Runner;
use crate::pipeline::types::StageError;

const REQUIRED_PREFIX: &str = "Python 3";

/// Confirm the configured interpreter is Python 3.
pub async fn run<R: Runner>(ctx: &PipelineContext, runner: &R) -> Result<(), StageError> {
  let python = &ctx.config().python;
  let cwd = nearest_existing(ctx.work_dir());

  let output = runner
    .run(&ctx.command_in(python, cwd).arg("--version"))
    .await
    .map_err(|e| StageError::Environment(format!("could not run '{} --version': {}", python, e)))?;

  // Python 2 printed its version on stderr.
  let reported = if output.stdout.trim().is_empty() {
    output.stderr.trim()
  } else {
    output.stdout.trim()
  };

  if !reported.starts_with(REQUIRED_PREFIX) {
    return Err(StageError::Environment(format!(
      "'{}' reports '{}'; {} is required",
      python, reported, REQUIRED_PREFIX
    )));
  }

  info!(python = %python, version = %reported, "python interpreter found");
  Ok(())
}

/// The work directory may not exist yet; run from its closest existing ancestor.
fn nearest_existing(dir: &Path) -> &Path {
  dir.ancestors().find(|p| p.is_dir()).unwrap_or(dir)
}
