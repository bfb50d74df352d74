//! Archive export into the output directory.

use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::context::PipelineContext;
use crate::exec::Runner;
use crate::pipeline::checksum::{self, sidecar_path};
use crate::pipeline::types::{ExportedArchive, StageError, command_err, io_err};
use crate::util::fs::{move_file, remove_file_if_exists};
use crate::version::ArchiveKind;

/// Commit time written next to `LASTCHANGE`; the export tool stamps archive
/// entries with it and aborts without it.
pub const COMMIT_TIME_FILE: &str = "src/build/util/LASTCHANGE.committime";

/// Archive variants this run produces, in export order.
pub fn archive_kinds(ctx: &PipelineContext) -> Vec<ArchiveKind> {
  if ctx.config().test_data {
    vec![ArchiveKind::TestData, ArchiveKind::Full]
  } else {
    vec![ArchiveKind::Full]
  }
}

/// Export every archive variant and checksum it.
///
/// If a later variant fails, files this call already placed in the output
/// directory are removed again. Files from earlier runs are not touched.
pub async fn run<R: Runner>(ctx: &PipelineContext, runner: &R) -> Result<Vec<ExportedArchive>, StageError> {
  let commit_time = ctx.work_dir().join(COMMIT_TIME_FILE);
  if !fs::try_exists(&commit_time)
    .await
    .map_err(io_err("inspect", &commit_time))?
  {
    return Err(StageError::MissingInput {
      path: commit_time,
      produced_by: "generate LASTCHANGE",
    });
  }

  let out_dir = ctx.out_dir();
  fs::create_dir_all(out_dir)
    .await
    .map_err(io_err("create output directory", out_dir))?;

  let mut exported: Vec<ExportedArchive> = Vec::new();
  for kind in archive_kinds(ctx) {
    match export_archive(ctx, runner, kind).await {
      Ok(archive) => exported.push(archive),
      Err(e) => {
        for archive in &exported {
          discard(&archive.path).await;
          discard(&archive.hashes).await;
        }
        return Err(e);
      }
    }
  }
  Ok(exported)
}

async fn export_archive<R: Runner>(
  ctx: &PipelineContext,
  runner: &R,
  kind: ArchiveKind,
) -> Result<ExportedArchive, StageError> {
  let version = ctx.version();
  let basename = version.export_basename();
  info!(kind = %kind, version = %version, "exporting archive");

  let mut invocation = ctx
    .python_script(&ctx.config().export_script)
    .args(["--version", version.as_str(), "--xz"]);
  if kind == ArchiveKind::TestData {
    invocation = invocation.arg("--test-data");
  }
  let invocation = invocation
    .args(["--remove-nonessential-files", "--src-dir", "src"])
    .arg(&basename)
    .streamed();

  runner
    .run(&invocation)
    .await
    .map_err(command_err(format!("export {} archive", kind)))?;

  let produced = ctx.work_dir().join(format!("{}.tar.xz", basename));
  let dest = ctx.out_dir().join(kind.file_name(version));
  move_file(&produced, &dest)
    .await
    .map_err(io_err("move archive", &produced))?;

  let hashes = match checksum::write_hashes(ctx, runner, &dest).await {
    Ok(hashes) => hashes,
    Err(e) => {
      discard(&dest).await;
      discard(&sidecar_path(&dest)).await;
      return Err(e);
    }
  };

  info!(path = %dest.display(), "archive ready");
  Ok(ExportedArchive {
    kind,
    path: dest,
    hashes,
  })
}

async fn discard(path: &Path) {
  if let Err(e) = remove_file_if_exists(path).await {
    warn!(path = %path.display(), error = %e, "failed to remove partial output");
  }
}
