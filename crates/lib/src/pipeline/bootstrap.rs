//! depot_tools checkout management.
//!
//! The checkout is reused across runs: an existing directory is updated in
//! place rather than cloned again. Once the checkout is usable its directory
//! goes on the context's search path so `gclient` resolves for every later
//! stage.

use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

use crate::consts::DEPOT_TOOLS_BRANCH;
use crate::context::PipelineContext;
use crate::exec::Runner;
use crate::pipeline::types::{StageError, command_err, io_err};

pub async fn run<R: Runner>(ctx: &mut PipelineContext, runner: &R) -> Result<(), StageError> {
  let work_dir = ctx.work_dir().to_path_buf();
  fs::create_dir_all(&work_dir)
    .await
    .map_err(io_err("create work directory", &work_dir))?;

  let checkout = ctx.depot_tools_dir();
  let exists = fs::try_exists(&checkout)
    .await
    .map_err(io_err("inspect depot_tools checkout", &checkout))?;

  if exists {
    update_checkout(ctx, runner, &checkout).await?;
  } else {
    let url = &ctx.config().depot_tools_url;
    info!(url = %url, path = %checkout.display(), "cloning depot_tools");
    runner
      .run(&ctx.git(&work_dir).arg("clone").arg(url).arg(&checkout).streamed())
      .await
      .map_err(command_err("clone depot_tools"))?;
  }

  debug!(path = %checkout.display(), "adding depot_tools to search path");
  ctx.prepend_search_path(checkout);
  Ok(())
}

async fn update_checkout<R: Runner>(ctx: &PipelineContext, runner: &R, checkout: &Path) -> Result<(), StageError> {
  let head = runner
    .run(&ctx.git(checkout).args(["rev-parse", "--abbrev-ref", "HEAD"]))
    .await
    .map_err(command_err("query depot_tools branch"))?;

  // `--abbrev-ref` prints the literal `HEAD` when detached.
  if head.stdout.trim() == "HEAD" {
    info!(branch = DEPOT_TOOLS_BRANCH, "depot_tools is detached, switching branch");
    runner
      .run(&ctx.git(checkout).args(["checkout", DEPOT_TOOLS_BRANCH]))
      .await
      .map_err(command_err(format!("switch depot_tools to {}", DEPOT_TOOLS_BRANCH)))?;
  } else {
    debug!(branch = %head.stdout.trim(), "depot_tools on branch");
  }

  info!(path = %checkout.display(), "updating depot_tools");
  runner
    .run(&ctx.git(checkout).arg("pull"))
    .await
    .map_err(command_err("update depot_tools"))?;
  Ok(())
}
