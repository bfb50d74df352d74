//! Test utilities: a recording stand-in for external commands.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::consts::HASH_ALGORITHMS;
use crate::context::{PipelineConfig, PipelineContext};
use crate::exec::{CmdOutput, ExecError, Invocation, Runner};
use crate::version::Version;

type Handler = Box<dyn Fn(&Invocation) -> Result<CmdOutput, ExecError> + Send + Sync>;

/// A [`Runner`] that records every invocation and answers from rules.
///
/// Rules match when the rendered command line contains their pattern. Later
/// rules take priority, so presets can be overridden per test. Unmatched
/// commands succeed with empty output.
pub struct FakeRunner {
  rules: Vec<(String, Handler)>,
  calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self {
      rules: Vec::new(),
      calls: Mutex::new(Vec::new()),
    }
  }

  /// Stand-ins that leave the on-disk traces real tools would.
  pub fn with_tools() -> Self {
    let mut runner = Self::new()
      .respond("python --version", "Python 3.12.1")
      .on("lastchange.py -o", |inv| {
        let lastchange = inv.cwd().join(inv.args_lossy().last().cloned().unwrap_or_default());
        let mut commit_time = lastchange.clone().into_os_string();
        commit_time.push(".committime");
        for path in [lastchange, PathBuf::from(commit_time)] {
          if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| spawn_err(inv, e))?;
          }
          std::fs::write(&path, "").map_err(|e| spawn_err(inv, e))?;
        }
        Ok(CmdOutput::default())
      })
      .on("sync --nohooks", |inv| {
        std::fs::create_dir_all(inv.cwd().join("src")).map_err(|e| spawn_err(inv, e))?;
        Ok(CmdOutput::default())
      })
      .on("export_tarball.py", |inv| {
        let basename = inv.args_lossy().last().cloned().unwrap_or_default();
        let test_data = inv.args_lossy().iter().any(|a| a == "--test-data");
        let body = if test_data { "testdata" } else { "full" };
        std::fs::write(inv.cwd().join(format!("{basename}.tar.xz")), body).map_err(|e| spawn_err(inv, e))?;
        Ok(CmdOutput::default())
      });

    for algo in HASH_ALGORITHMS {
      runner = runner.on(&format!("{algo}sum "), move |inv| {
        let file = inv.args_lossy().last().cloned().unwrap_or_default();
        Ok(CmdOutput::from_stdout(format!("{algo}-digest  {file}")))
      });
    }
    runner
  }

  pub fn on<F>(mut self, pattern: &str, handler: F) -> Self
  where
    F: Fn(&Invocation) -> Result<CmdOutput, ExecError> + Send + Sync + 'static,
  {
    self.rules.push((pattern.to_string(), Box::new(handler)));
    self
  }

  pub fn respond(self, pattern: &str, stdout: &str) -> Self {
    let stdout = stdout.to_string();
    self.on(pattern, move |_| Ok(CmdOutput::from_stdout(stdout.clone())))
  }

  pub fn fail_on(self, pattern: &str) -> Self {
    self.on(pattern, |inv| {
      Err(ExecError::CmdFailed {
        cmd: inv.to_string(),
        code: Some(1),
        stderr: String::new(),
      })
    })
  }

  pub fn calls(&self) -> Vec<Invocation> {
    self.calls.lock().unwrap().clone()
  }

  /// Rendered command lines, in call order.
  pub fn commands(&self) -> Vec<String> {
    self.calls().iter().map(ToString::to_string).collect()
  }

  /// Index of the first command containing `pattern`.
  pub fn position(&self, pattern: &str) -> Option<usize> {
    self.commands().iter().position(|c| c.contains(pattern))
  }

  pub fn ran(&self, pattern: &str) -> bool {
    self.position(pattern).is_some()
  }
}

impl Runner for FakeRunner {
  async fn run(&self, invocation: &Invocation) -> Result<CmdOutput, ExecError> {
    self.calls.lock().unwrap().push(invocation.clone());
    let line = invocation.to_string();
    match self.rules.iter().rev().find(|(pattern, _)| line.contains(pattern.as_str())) {
      Some((_, handler)) => handler(invocation),
      None => Ok(CmdOutput::default()),
    }
  }
}

fn spawn_err(inv: &Invocation, source: std::io::Error) -> ExecError {
  ExecError::Spawn {
    program: inv.program_lossy(),
    source,
  }
}

/// A context for version `1.2.3` rooted at `work_dir`.
pub fn test_context(work_dir: &Path) -> PipelineContext {
  test_context_with(work_dir, |_| {})
}

pub fn test_context_with(work_dir: &Path, adjust: impl FnOnce(&mut PipelineConfig)) -> PipelineContext {
  let mut config = PipelineConfig {
    work_dir: work_dir.to_path_buf(),
    ..Default::default()
  };
  adjust(&mut config);
  PipelineContext::new(config, Version::new("1.2.3").unwrap()).unwrap()
}

/// Sorted file names directly inside `dir`.
pub fn list_dir(dir: &Path) -> Vec<String> {
  let mut names: Vec<String> = match std::fs::read_dir(dir) {
    Ok(entries) => entries
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect(),
    Err(_) => Vec::new(),
  };
  names.sort();
  names
}

pub fn touch(path: PathBuf) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, "").unwrap();
}
