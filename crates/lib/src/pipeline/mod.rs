//! The packaging pipeline.
//!
//! A run is a fixed sequence of [`Stage`]s. Each stage gets the shared
//! [`PipelineContext`] and the [`Runner`] used for external commands, and
//! either succeeds or stops the run with a [`PipelineError`] naming it. Nothing
//! is retried and no failure is downgraded.

pub mod bootstrap;
pub mod checksum;
pub mod configure;
pub mod export;
pub mod gn;
pub mod hooks;
pub mod preflight;
pub mod sync;
pub mod types;

use std::time::Instant;

use tracing::{error, info};

use crate::context::PipelineContext;
use crate::exec::Runner;

pub use types::{ExportedArchive, PipelineError, PipelineReport, Stage, StageError};

pub struct Pipeline<R> {
  ctx: PipelineContext,
  runner: R,
}

impl<R: Runner> Pipeline<R> {
  pub fn new(ctx: PipelineContext, runner: R) -> Self {
    Self { ctx, runner }
  }

  pub fn context(&self) -> &PipelineContext {
    &self.ctx
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// Run every stage in order, stopping at the first failure.
  pub async fn run(&mut self) -> Result<PipelineReport, PipelineError> {
    let mut report = PipelineReport::default();

    for stage in Stage::ALL {
      info!(stage = %stage, "stage started");
      let start = Instant::now();

      if let Err(source) = self.run_stage(stage, &mut report).await {
        error!(stage = %stage, error = %source, "stage failed");
        return Err(PipelineError { stage, source });
      }

      let elapsed = start.elapsed();
      info!(stage = %stage, elapsed = ?elapsed, "stage finished");
      report.timings.push((stage, elapsed));
    }

    Ok(report)
  }

  /// Run one stage against the current context.
  pub async fn run_stage(&mut self, stage: Stage, report: &mut PipelineReport) -> Result<(), StageError> {
    match stage {
      Stage::Preflight => preflight::run(&self.ctx, &self.runner).await,
      Stage::Bootstrap => bootstrap::run(&mut self.ctx, &self.runner).await,
      Stage::Configure => configure::run(&self.ctx, &self.runner).await,
      Stage::Sync => sync::run(&self.ctx, &self.runner).await,
      Stage::Hooks => hooks::run(&self.ctx, &self.runner).await,
      Stage::Export => {
        report.archives = export::run(&self.ctx, &self.runner).await?;
        Ok(())
      }
    }
  }
}
