//! Error and result types for pipeline stages.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::exec::ExecError;
use crate::version::ArchiveKind;

/// The fixed, ordered steps of a packaging run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  /// Verify the Python interpreter before touching anything.
  Preflight,
  /// Clone or update depot_tools and put it on the search path.
  Bootstrap,
  /// Write `.gclient` pinned to the requested version.
  Configure,
  /// Shallow `gclient sync` without upstream hooks.
  Sync,
  /// Metadata generation, profile downloads, optional GN bundling.
  Hooks,
  /// Produce archives and checksum listings in the output directory.
  Export,
}

impl Stage {
  pub const ALL: [Stage; 6] = [
    Stage::Preflight,
    Stage::Bootstrap,
    Stage::Configure,
    Stage::Sync,
    Stage::Hooks,
    Stage::Export,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Stage::Preflight => "preflight",
      Stage::Bootstrap => "bootstrap",
      Stage::Configure => "configure",
      Stage::Sync => "sync",
      Stage::Hooks => "hooks",
      Stage::Export => "export",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Errors a single stage can fail with.
#[derive(Debug, Error)]
pub enum StageError {
  /// The host is missing something the pipeline needs up front.
  #[error("environment check failed: {0}")]
  Environment(String),

  /// An external command failed; `step` names what it was doing.
  #[error("{step} failed: {source}")]
  Command {
    step: String,
    #[source]
    source: ExecError,
  },

  /// A filesystem operation failed.
  #[error("failed to {op} '{path}': {source}")]
  Io {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A file an earlier step should have produced is not there.
  #[error("'{path}' is missing; it is written by the {produced_by} hook")]
  MissingInput { path: PathBuf, produced_by: &'static str },

  /// No GN revision was given and none could be read from `DEPS`.
  #[error("could not determine the GN revision: {0}")]
  GnRevision(String),
}

/// Build a `map_err` adapter for a failed command.
pub(crate) fn command_err(step: impl Into<String>) -> impl FnOnce(ExecError) -> StageError {
  let step = step.into();
  move |source| StageError::Command { step, source }
}

/// Build a `map_err` adapter for a failed filesystem operation.
pub(crate) fn io_err(op: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> StageError {
  let path = path.to_path_buf();
  move |source| StageError::Io { op, path, source }
}

/// A stage failure, tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
  pub stage: Stage,
  #[source]
  pub source: StageError,
}

/// An archive placed in the output directory along with its checksum listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedArchive {
  pub kind: ArchiveKind,
  pub path: PathBuf,
  pub hashes: PathBuf,
}

/// Summary of a completed run.
#[derive(Debug, Default)]
pub struct PipelineReport {
  pub archives: Vec<ExportedArchive>,
  pub timings: Vec<(Stage, Duration)>,
}

impl PipelineReport {
  pub fn total_duration(&self) -> Duration {
    self.timings.iter().map(|(_, elapsed)| *elapsed).sum()
  }
}
