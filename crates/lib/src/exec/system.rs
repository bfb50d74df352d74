//! Runner backed by real child processes.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use super::{CmdOutput, ExecError, Invocation, Runner};

/// Spawns each invocation with `tokio::process` and waits for it to exit.
///
/// Unlike build sandboxes, the environment is inherited: gclient and the
/// Chromium scripts need the user's proxy, credential and Python settings.
/// Only `PATH` is rewritten, and only when the invocation carries a prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl Runner for SystemRunner {
  async fn run(&self, invocation: &Invocation) -> Result<CmdOutput, ExecError> {
    info!(cmd = %invocation, "executing command");

    let mut command = Command::new(&invocation.program);
    command
      .args(&invocation.args)
      .current_dir(&invocation.cwd)
      .stdin(Stdio::null());

    if let Some(path) = invocation.search_path()? {
      command.env("PATH", path);
    }
    for (key, value) in &invocation.env {
      command.env(key, value);
    }

    debug!(cwd = ?invocation.cwd, streamed = invocation.streamed, "spawning process");

    if invocation.streamed {
      let status = command
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| ExecError::Spawn {
          program: invocation.program_lossy(),
          source,
        })?;

      if !status.success() {
        return Err(ExecError::CmdFailed {
          cmd: invocation.to_string(),
          code: status.code(),
          stderr: String::new(),
        });
      }
      return Ok(CmdOutput::default());
    }

    let output = command.output().await.map_err(|source| ExecError::Spawn {
      program: invocation.program_lossy(),
      source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
      if !stderr.is_empty() {
        debug!(stderr = %stderr, "command stderr");
      }
      if !stdout.is_empty() {
        debug!(stdout = %stdout, "command stdout");
      }

      return Err(ExecError::CmdFailed {
        cmd: invocation.to_string(),
        code: output.status.code(),
        stderr,
      });
    }

    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command output");
    }

    Ok(CmdOutput { stdout, stderr })
  }
}
