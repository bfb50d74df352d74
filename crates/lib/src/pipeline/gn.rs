//! Bundling GN's own sources into the Chromium tree.
//!
//! Distribution builds bootstrap GN from `src/tools/gn` instead of using the
//! prebuilt binary gclient would download. That needs the GN sources at the
//! revision Chromium pins in `DEPS`, plus the `last_commit_position.h` header
//! GN's generator derives from its git history, which the tarball cannot
//! carry.

use std::path::Path;

use tokio::fs;
use tracing::{debug, info, warn};

use crate::context::PipelineContext;
use crate::exec::Runner;
use crate::pipeline::types::{StageError, command_err, io_err};

const DEPS_GN_VAR: &str = "gn_version";
const GIT_REVISION_PREFIX: &str = "git_revision:";
const COMMIT_POSITION_HEADER: &str = "last_commit_position.h";

/// Extract the GN revision from the contents of a Chromium `DEPS` file.
///
/// Looks for `'gn_version': 'git_revision:<sha>'`.
pub fn parse_gn_revision(deps: &str) -> Option<String> {
  deps.lines().find_map(|line| {
    let line = line.trim();
    let rest = line
      .strip_prefix(&format!("'{}'", DEPS_GN_VAR))
      .or_else(|| line.strip_prefix(&format!("\"{}\"", DEPS_GN_VAR)))?;
    let value = rest
      .trim_start()
      .strip_prefix(':')?
      .trim()
      .trim_end_matches(',')
      .trim()
      .trim_matches(|c| c == '\'' || c == '"');
    value
      .strip_prefix(GIT_REVISION_PREFIX)
      .filter(|rev| !rev.is_empty())
      .map(str::to_string)
  })
}

async fn resolve_revision(ctx: &PipelineContext) -> Result<String, StageError> {
  if let Some(rev) = &ctx.config().gn_revision {
    return Ok(rev.clone());
  }

  let deps = ctx.src_dir().join("DEPS");
  let content = fs::read_to_string(&deps).await.map_err(io_err("read", &deps))?;
  parse_gn_revision(&content)
    .ok_or_else(|| StageError::GnRevision(format!("no '{}' entry in {}", DEPS_GN_VAR, deps.display())))
}

/// Fetch GN at the pinned revision and move it into `src/tools/gn`.
///
/// Work happens in a staging directory inside the work directory, so the
/// final moves are plain renames. The staging directory is removed whether
/// or not bundling succeeds.
pub async fn bundle<R: Runner>(ctx: &PipelineContext, runner: &R) -> Result<(), StageError> {
  let revision = resolve_revision(ctx).await?;
  info!(revision = %revision, "bundling GN sources");

  let staging = tempfile::Builder::new()
    .prefix(".gn-staging-")
    .tempdir_in(ctx.work_dir())
    .map_err(io_err("create staging directory in", ctx.work_dir()))?;
  let staging_path = staging.path().to_path_buf();

  let result = fetch_and_relocate(ctx, runner, &staging_path, &revision).await;

  let cleanup = staging
    .close()
    .map_err(io_err("remove staging directory", &staging_path));
  if let (Err(_), Err(e)) = (&result, &cleanup) {
    warn!(error = %e, "staging cleanup failed after bundling error");
  }

  result?;
  cleanup
}

async fn fetch_and_relocate<R: Runner>(
  ctx: &PipelineContext,
  runner: &R,
  staging: &Path,
  revision: &str,
) -> Result<(), StageError> {
  let checkout = staging.join("gn");

  runner
    .run(&ctx.git(staging).arg("clone").arg(&ctx.config().gn_url).arg(&checkout).streamed())
    .await
    .map_err(command_err("clone gn"))?;
  runner
    .run(&ctx.git(&checkout).args(["checkout", revision]))
    .await
    .map_err(command_err(format!("checkout gn {}", revision)))?;
  runner
    .run(&ctx.command_in(&ctx.config().python, &checkout).arg("build/gen.py"))
    .await
    .map_err(command_err("generate gn build files"))?;

  let dest = ctx.src_dir().join("tools").join("gn");
  if fs::try_exists(&dest).await.map_err(io_err("inspect", &dest))? {
    debug!(path = %dest.display(), "replacing existing gn directory");
    fs::remove_dir_all(&dest).await.map_err(io_err("remove", &dest))?;
  }
  fs::create_dir_all(&dest).await.map_err(io_err("create directory", &dest))?;

  let mut entries = fs::read_dir(&checkout).await.map_err(io_err("read directory", &checkout))?;
  while let Some(entry) = entries
    .next_entry()
    .await
    .map_err(io_err("read directory", &checkout))?
  {
    let name = entry.file_name();
    if name == ".git" || name == "out" {
      continue;
    }
    let target = dest.join(&name);
    fs::rename(entry.path(), &target)
      .await
      .map_err(io_err("move gn source into", &target))?;
  }

  let header = checkout.join("out").join(COMMIT_POSITION_HEADER);
  let bootstrap = dest.join("bootstrap");
  fs::create_dir_all(&bootstrap)
    .await
    .map_err(io_err("create directory", &bootstrap))?;
  fs::rename(&header, bootstrap.join(COMMIT_POSITION_HEADER))
    .await
    .map_err(io_err("move generated header", &header))?;

  info!(path = %dest.display(), "GN sources bundled");
  Ok(())
}
