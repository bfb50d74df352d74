//! Implementation of the default command: package one Chromium version.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::{OwoColorize, Stream};
use tracing::info;

use chromium_tarball_lib::{Pipeline, PipelineConfig, PipelineContext, SystemRunner, Version};

use crate::output::{format_bytes, format_duration, print_info, print_stat, print_success, symbols};

#[derive(Debug, Args)]
pub struct PackageArgs {
  /// Chromium version to package (e.g. 130.0.6723.91)
  #[arg(value_name = "VERSION")]
  pub tag: Option<String>,

  /// Directory holding depot_tools, .gclient and the source tree
  #[arg(long, env = "CHROMIUM_TARBALL_WORK_DIR", default_value = ".")]
  pub work_dir: PathBuf,

  /// Where archives and checksum listings are written [default: <WORK_DIR>/out]
  #[arg(long, env = "CHROMIUM_TARBALL_OUT_DIR")]
  pub out_dir: Option<PathBuf>,

  /// Python 3 interpreter used for the Chromium scripts
  #[arg(long, env = "CHROMIUM_TARBALL_PYTHON", default_value = "python")]
  pub python: String,

  /// Export script, relative to the work directory
  #[arg(long, env = "CHROMIUM_TARBALL_EXPORT_SCRIPT")]
  pub export_script: Option<PathBuf>,

  /// Skip the test-data archive
  #[arg(long)]
  pub no_test_data: bool,

  /// Bundle GN's sources into src/tools/gn
  #[arg(long)]
  pub bundle_gn: bool,

  /// GN revision to bundle instead of the one pinned in src/DEPS
  #[arg(long, requires = "bundle_gn")]
  pub gn_revision: Option<String>,
}

impl PackageArgs {
  fn to_config(&self) -> PipelineConfig {
    let defaults = PipelineConfig::default();
    PipelineConfig {
      work_dir: self.work_dir.clone(),
      out_dir: self.out_dir.clone(),
      python: self.python.clone(),
      export_script: self.export_script.clone().unwrap_or(defaults.export_script.clone()),
      test_data: !self.no_test_data,
      bundle_gn: self.bundle_gn,
      gn_revision: self.gn_revision.clone(),
      ..defaults
    }
  }
}

/// Execute the packaging pipeline for `tag`.
///
/// Prints each produced archive with its size and checksum listing.
pub fn cmd_package(tag: &str, args: &PackageArgs) -> Result<()> {
  let version = Version::new(tag)?;
  let ctx = PipelineContext::new(args.to_config(), version.clone())
    .with_context(|| format!("Failed to resolve work directory: {}", args.work_dir.display()))?;

  print_info(&format!(
    "Packaging Chromium {} in {}",
    version,
    ctx.work_dir().display()
  ));

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let mut pipeline = Pipeline::new(ctx, SystemRunner);
  let report = rt.block_on(pipeline.run()).context("Packaging failed")?;

  println!();
  print_success(&format!("Chromium {} packaged", version));
  for archive in &report.archives {
    let size = std::fs::metadata(&archive.path).map(|m| m.len()).unwrap_or(0);
    println!(
      "  {} {} ({})",
      symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.cyan()),
      archive.path.display(),
      format_bytes(size)
    );
    print_stat("checksums", &archive.hashes.display().to_string());
  }
  print_stat("Duration", &format_duration(report.total_duration()));

  info!(archives = report.archives.len(), "packaging complete");
  Ok(())
}
