//! chromium-tarball-lib: packaging Chromium release tarballs.
//!
//! This crate drives the external tools that turn a Chromium version tag into
//! distributable source archives:
//! - `pipeline`: the ordered, fail-fast stages (bootstrap, configure, sync,
//!   hooks, export)
//! - `context`: run configuration and the state threaded between stages
//! - `exec`: the `Runner` seam every external command goes through
//! - `releases`: lookup of current Chrome releases to decide what to package

pub mod consts;
pub mod context;
pub mod exec;
pub mod pipeline;
pub mod releases;
pub mod util;
pub mod version;

pub use context::{PipelineConfig, PipelineContext};
pub use exec::{Runner, SystemRunner};
pub use pipeline::{Pipeline, PipelineError, PipelineReport, Stage};
pub use version::{ArchiveKind, Version, VersionError};
