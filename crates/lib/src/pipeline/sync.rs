//! Shallow source checkout.

use tracing::info;

use crate::context::PipelineContext;
use crate::exec::Runner;
use crate::pipeline::types::{StageError, command_err};

/// Fetch the pinned tree without history and without upstream hooks.
///
/// Hooks are run selectively by the next stage instead.
pub async fn run<R: Runner>(ctx: &PipelineContext, runner: &R) -> Result<(), StageError> {
  info!(version = %ctx.version(), "syncing sources");
  runner
    .run(&ctx.gclient().args(["sync", "--nohooks", "--no-history"]).streamed())
    .await
    .map_err(command_err("gclient sync"))?;
  Ok(())
}
