//! Run configuration and the context threaded through every stage.
//!
//! Stages never touch the process environment or working directory. The
//! search path grown by the bootstrap stage and the directories every later
//! stage works in live here and are stamped onto each [`Invocation`].

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::consts::{
  CHROMIUM_SRC_URL, DEPOT_TOOLS_DIR, DEPOT_TOOLS_URL, EXPORT_TARBALL_SCRIPT, GCLIENT_FILE, GN_URL, OUT_DIR, SRC_DIR,
};
use crate::exec::Invocation;
use crate::version::Version;

/// Everything about a run except the version being packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
  /// Directory holding depot_tools, `.gclient` and `src/`.
  pub work_dir: PathBuf,
  /// Archive destination. Defaults to `<work_dir>/out`.
  pub out_dir: Option<PathBuf>,
  /// Interpreter used for every Chromium script. Must be Python 3.
  pub python: String,
  pub git: String,
  pub gclient: String,
  pub depot_tools_url: String,
  pub chromium_src_url: String,
  pub gn_url: String,
  /// Export script, relative to the work directory.
  pub export_script: PathBuf,
  /// Produce the `-testdata` archive in addition to the full one.
  pub test_data: bool,
  /// Bundle GN's own sources into `src/tools/gn`.
  pub bundle_gn: bool,
  /// GN revision to bundle. Read from `src/DEPS` when unset.
  pub gn_revision: Option<String>,
  /// Environment added to every command.
  pub env: BTreeMap<String, String>,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    // depot_tools self-updates on every gclient call otherwise; bootstrap
    // already pulled it.
    let env = BTreeMap::from([("DEPOT_TOOLS_UPDATE".to_string(), "0".to_string())]);

    Self {
      work_dir: PathBuf::from("."),
      out_dir: None,
      python: "python".to_string(),
      git: "git".to_string(),
      gclient: "gclient".to_string(),
      depot_tools_url: DEPOT_TOOLS_URL.to_string(),
      chromium_src_url: CHROMIUM_SRC_URL.to_string(),
      gn_url: GN_URL.to_string(),
      export_script: PathBuf::from(EXPORT_TARBALL_SCRIPT),
      test_data: true,
      bundle_gn: false,
      gn_revision: None,
      env,
    }
  }
}

/// Resolved state for a single packaging run.
#[derive(Debug, Clone)]
pub struct PipelineContext {
  config: PipelineConfig,
  version: Version,
  work_dir: PathBuf,
  out_dir: PathBuf,
  search_path: Vec<PathBuf>,
}

impl PipelineContext {
  /// Resolve the configured directories to absolute paths.
  ///
  /// Nothing is created here; the bootstrap stage creates the work directory
  /// and export creates the output directory.
  pub fn new(config: PipelineConfig, version: Version) -> std::io::Result<Self> {
    let work_dir = absolute_dir(&config.work_dir)?;
    let out_dir = match &config.out_dir {
      Some(dir) if dir.is_absolute() => dir.clone(),
      Some(dir) => absolute_dir(dir)?,
      None => work_dir.join(OUT_DIR),
    };

    Ok(Self {
      config,
      version,
      work_dir,
      out_dir,
      search_path: Vec::new(),
    })
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  pub fn version(&self) -> &Version {
    &self.version
  }

  pub fn work_dir(&self) -> &Path {
    &self.work_dir
  }

  pub fn out_dir(&self) -> &Path {
    &self.out_dir
  }

  pub fn src_dir(&self) -> PathBuf {
    self.work_dir.join(SRC_DIR)
  }

  pub fn depot_tools_dir(&self) -> PathBuf {
    self.work_dir.join(DEPOT_TOOLS_DIR)
  }

  pub fn gclient_file(&self) -> PathBuf {
    self.work_dir.join(GCLIENT_FILE)
  }

  pub fn search_path(&self) -> &[PathBuf] {
    &self.search_path
  }

  /// Put `dir` in front of the search path used by all later commands.
  pub fn prepend_search_path(&mut self, dir: PathBuf) {
    self.search_path.retain(|existing| existing != &dir);
    self.search_path.insert(0, dir);
  }

  /// A command rooted at the work directory.
  pub fn command(&self, program: impl AsRef<OsStr>) -> Invocation {
    self.command_in(program, &self.work_dir)
  }

  /// A command rooted at an arbitrary directory.
  pub fn command_in(&self, program: impl AsRef<OsStr>, cwd: &Path) -> Invocation {
    let mut invocation = Invocation::new(program, cwd).path_prefix(&self.search_path);
    for (key, value) in &self.config.env {
      invocation = invocation.env(key.clone(), value.clone());
    }
    invocation
  }

  pub fn git(&self, cwd: &Path) -> Invocation {
    self.command_in(&self.config.git, cwd)
  }

  pub fn gclient(&self) -> Invocation {
    self.command(&self.config.gclient)
  }

  /// `<python> <script>` run from the work directory.
  pub fn python_script(&self, script: impl AsRef<OsStr>) -> Invocation {
    self.command(&self.config.python).arg(script)
  }
}

fn absolute_dir(path: &Path) -> std::io::Result<PathBuf> {
  if path.exists() {
    dunce::canonicalize(path)
  } else {
    std::path::absolute(path)
  }
}
