//! External command invocation.
//!
//! Every tool the pipeline drives (git, gclient, the Python scripts in the
//! Chromium tree, the checksum utilities) goes through a [`Runner`]. The
//! production implementation is [`SystemRunner`]; stage tests swap in a
//! recording fake.

mod system;

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use system::SystemRunner;

/// Errors produced while running an external command.
#[derive(Debug, Error)]
pub enum ExecError {
  /// The program could not be started at all (missing binary, bad cwd, ...).
  #[error("failed to spawn '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The program ran and exited unsuccessfully.
  #[error("command failed with {}: {cmd}{}", exit_description(.code), stderr_tail(.stderr))]
  CmdFailed {
    cmd: String,
    code: Option<i32>,
    stderr: String,
  },

  /// A search path directory cannot be represented in `PATH`.
  #[error("cannot add '{}' to PATH: {source}", .dir.display())]
  SearchPath {
    dir: PathBuf,
    #[source]
    source: std::env::JoinPathsError,
  },
}

/// Lines of captured stderr carried into a [`ExecError::CmdFailed`] message.
const STDERR_TAIL_LINES: usize = 20;

fn exit_description(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {}", code),
    None => "a signal".to_string(),
  }
}

fn stderr_tail(stderr: &str) -> String {
  let lines: Vec<&str> = stderr.trim().lines().collect();
  if lines.is_empty() {
    return String::new();
  }
  let tail = &lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..];
  format!("\n{}", tail.join("\n"))
}

/// A fully described command: what to run, where, and with which search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: OsString,
  pub args: Vec<OsString>,
  pub cwd: PathBuf,
  /// Directories placed in front of the inherited `PATH`, first entry wins.
  pub path_prefix: Vec<PathBuf>,
  pub env: BTreeMap<String, String>,
  /// Let the child write straight to our stdout/stderr instead of capturing.
  pub streamed: bool,
}

impl Invocation {
  pub fn new(program: impl AsRef<OsStr>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.as_ref().to_os_string(),
      args: Vec::new(),
      cwd: cwd.into(),
      path_prefix: Vec::new(),
      env: BTreeMap::new(),
      streamed: false,
    }
  }

  pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
    self.args.push(arg.as_ref().to_os_string());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
    self
  }

  pub fn path_prefix(mut self, dirs: &[PathBuf]) -> Self {
    self.path_prefix = dirs.to_vec();
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn streamed(mut self) -> Self {
    self.streamed = true;
    self
  }

  pub fn cwd(&self) -> &Path {
    &self.cwd
  }

  pub fn program_lossy(&self) -> String {
    self.program.to_string_lossy().into_owned()
  }

  pub fn args_lossy(&self) -> Vec<String> {
    self.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
  }

  /// The `PATH` the child should see, or `None` when no prefix was requested.
  ///
  /// Fails when a prefix directory contains the platform's path separator,
  /// since it could not be found on `PATH` at all.
  pub fn search_path(&self) -> Result<Option<OsString>, ExecError> {
    if self.path_prefix.is_empty() {
      return Ok(None);
    }
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let dirs = self
      .path_prefix
      .iter()
      .cloned()
      .chain(std::env::split_paths(&inherited));
    std::env::join_paths(dirs).map(Some).map_err(|source| {
      let dir = self
        .path_prefix
        .iter()
        .find(|dir| std::env::join_paths([dir]).is_err())
        .unwrap_or(&self.path_prefix[0])
        .clone();
      ExecError::SearchPath { dir, source }
    })
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program.to_string_lossy())?;
    for arg in &self.args {
      write!(f, " {}", arg.to_string_lossy())?;
    }
    Ok(())
  }
}

/// Captured result of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdOutput {
  pub stdout: String,
  pub stderr: String,
}

impl CmdOutput {
  pub fn from_stdout(stdout: impl Into<String>) -> Self {
    Self {
      stdout: stdout.into(),
      stderr: String::new(),
    }
  }
}

/// Runs invocations to completion, one at a time.
///
/// Implementations return `Ok` only for a zero exit status.
#[allow(async_fn_in_trait)]
pub trait Runner {
  async fn run(&self, invocation: &Invocation) -> Result<CmdOutput, ExecError>;
}
