mod cmd;
mod output;

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{PackageArgs, ReleasesArgs, cmd_package, cmd_releases};
use output::{format_error_chain, print_error};

/// chromium-tarball - Reproducible Chromium source tarballs
#[derive(Parser)]
#[command(name = "chromium-tarball")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,

  #[command(flatten)]
  package: PackageArgs,
}

#[derive(Subcommand)]
enum Commands {
  /// List recent Chrome releases, or look up one version
  Releases(ReleasesArgs),
}

fn main() -> ExitCode {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
      let _ = e.print();
      return ExitCode::SUCCESS;
    }
    Err(e) => {
      let _ = e.print();
      return ExitCode::FAILURE;
    }
  };

  if cli.command.is_some() && cli.package.tag.is_some() {
    let _ = Cli::command()
      .error(ErrorKind::ArgumentConflict, "a VERSION cannot be combined with a subcommand")
      .print();
    return ExitCode::FAILURE;
  }

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match &cli.command {
    Some(Commands::Releases(args)) => cmd_releases(args, cli.verbose),
    None => match cli.package.tag.as_deref() {
      Some(tag) => cmd_package(tag, &cli.package),
      None => {
        eprintln!("{}", Cli::command().render_usage());
        eprintln!();
        eprintln!("A Chromium version is required, e.g. `chromium-tarball 130.0.6723.91`.");
        return ExitCode::FAILURE;
      }
    },
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format_error_chain(&e));
      ExitCode::FAILURE
    }
  }
}
