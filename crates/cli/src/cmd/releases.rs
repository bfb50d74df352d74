//! Implementation of the `releases` command.
//!
//! Lists current Chrome releases so CI can decide which versions to package.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::{OwoColorize, Stream};

use chromium_tarball_lib::releases::{Channel, Release, ReleaseClient};

#[derive(Debug, Args)]
pub struct ReleasesArgs {
  /// Only list releases that started serving within this window (e.g. 48h, 3days)
  #[arg(long, value_parser = humantime::parse_duration, default_value = "48h")]
  pub within: Duration,

  /// Channels to query
  #[arg(long = "channel", value_delimiter = ',', default_values = ["stable", "beta", "dev"])]
  pub channels: Vec<Channel>,

  /// Look up a single version across all channels instead
  #[arg(short, long, value_name = "VERSION")]
  pub release: Option<String>,

  /// Version history API base URL
  #[arg(long, env = "CHROMIUM_TARBALL_VERSION_HISTORY_URL", hide = true)]
  pub api_url: Option<String>,
}

/// Execute the releases command.
///
/// Without `--release`, prints one version per line (or a description per
/// release with `--verbose`) for each channel whose latest release is recent.
pub fn cmd_releases(args: &ReleasesArgs, verbose: bool) -> Result<()> {
  let client = match &args.api_url {
    Some(url) => ReleaseClient::new(url.clone()),
    None => ReleaseClient::default(),
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  if let Some(version) = &args.release {
    let release = rt
      .block_on(client.find(version))
      .with_context(|| format!("Failed to look up Chromium {}", version))?;
    println!(
      "Chromium {}: {} ({})",
      release.version,
      release.channel,
      release.started_at_display()
    );
    return Ok(());
  }

  let releases = rt
    .block_on(client.recent_from_now(&args.channels, args.within))
    .context("Failed to fetch releases")?;

  for release in &releases {
    if verbose {
      print_release(release);
    } else {
      println!("{}", release.version);
    }
  }
  Ok(())
}

fn print_release(release: &Release) {
  println!(
    "Chromium {}: {} {}",
    release.channel.if_supports_color(Stream::Stdout, |s| s.cyan()),
    release.version,
    format!("({})", release.started_at_display()).if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
}
