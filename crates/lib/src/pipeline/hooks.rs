//! Post-checkout metadata generation.
//!
//! `gclient sync` runs with `--nohooks`, so the handful of hooks a release
//! tarball actually needs are replayed here in a fixed order. Any failure
//! aborts the run: a partially hooked tree must never be exported.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::consts::TARGET_OS;
use crate::context::PipelineContext;
use crate::exec::Runner;
use crate::pipeline::gn;
use crate::pipeline::types::{StageError, command_err, io_err};

const LASTCHANGE: &str = "src/build/util/lastchange.py";

/// A single post-checkout step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
  pub name: &'static str,
  pub action: HookAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
  /// Run the configured Python with these arguments from the work directory.
  Python(Vec<OsString>),
  /// Create an empty file, with parent directories.
  Touch(PathBuf),
}

fn python<I, S>(name: &'static str, args: I) -> Hook
where
  I: IntoIterator<Item = S>,
  S: Into<OsString>,
{
  Hook {
    name,
    action: HookAction::Python(args.into_iter().map(Into::into).collect()),
  }
}

/// The hooks for a tree, in execution order.
pub fn hooks(ctx: &PipelineContext) -> Vec<Hook> {
  let mut depot_tools = OsString::from("--depot-tools=");
  depot_tools.push(ctx.depot_tools_dir());

  vec![
    python("generate LASTCHANGE", [LASTCHANGE, "-o", "src/build/util/LASTCHANGE"]),
    python(
      "generate GPU lists version header",
      [
        LASTCHANGE,
        "-m",
        "GPU_LISTS_VERSION",
        "--revision-id-only",
        "--header",
        "src/gpu/config/gpu_lists_version.h",
      ],
    ),
    python(
      "generate Skia commit hash header",
      [
        LASTCHANGE,
        "-m",
        "SKIA_COMMIT_HASH",
        "-s",
        "src/third_party/skia",
        "--header",
        "src/skia/ext/skia_commit_hash.h",
      ],
    ),
    python(
      "generate Dawn version file",
      [LASTCHANGE, "-s", "src/third_party/dawn", "--revision", "src/gpu/webgpu/DAWN_VERSION"],
    ),
    Hook {
      name: "create i18n_process_css_test.html",
      action: HookAction::Touch(ctx.src_dir().join("chrome/test/data/webui/i18n_process_css_test.html")),
    },
    python(
      "download PGO profiles",
      vec![
        OsString::from("src/tools/update_pgo_profiles.py"),
        OsString::from(format!("--target={}", TARGET_OS)),
        OsString::from("update"),
        OsString::from("--gs-url-base=chromium-optimization-profiles/pgo_profiles"),
      ],
    ),
    python(
      "download V8 builtins PGO profiles",
      vec![
        OsString::from("src/v8/tools/builtins-pgo/download_profiles.py"),
        OsString::from("download"),
        depot_tools,
        OsString::from("--force"),
        OsString::from("--check-v8-revision"),
      ],
    ),
  ]
}

pub async fn run<R: Runner>(ctx: &PipelineContext, runner: &R) -> Result<(), StageError> {
  for hook in hooks(ctx) {
    info!(hook = hook.name, "running hook");
    match &hook.action {
      HookAction::Python(args) => {
        runner
          .run(&ctx.command(&ctx.config().python).args(args))
          .await
          .map_err(command_err(hook.name))?;
      }
      HookAction::Touch(path) => touch(path).await?,
    }
  }

  if ctx.config().bundle_gn {
    info!(hook = "bundle GN sources", "running hook");
    gn::bundle(ctx, runner).await?;
  }

  Ok(())
}

async fn touch(path: &Path) -> Result<(), StageError> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)
      .await
      .map_err(io_err("create directory", parent))?;
  }
  fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .await
    .map_err(io_err("create placeholder", path))?;
  Ok(())
}
