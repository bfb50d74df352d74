//! The version identifier a packaging run is pinned to.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::consts::TARGET_OS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
  #[error("a version identifier is required (e.g. 130.0.6723.91)")]
  Empty,
}

/// A Chromium release tag such as `130.0.6723.91`.
///
/// The value is opaque apart from being non-empty; it is passed verbatim to
/// gclient and embedded in archive names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
  pub fn new(value: impl Into<String>) -> Result<Self, VersionError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(VersionError::Empty);
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Base name the export tool writes to, without extension (`chromium-<v>`).
  pub fn export_basename(&self) -> String {
    format!("chromium-{}", self.0)
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for Version {
  type Err = VersionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Version::new(s)
  }
}

/// Which slice of the tree an archive holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
  /// Only the test-data directories.
  TestData,
  /// The whole tree minus nonessential files.
  Full,
}

impl ArchiveKind {
  pub fn as_str(self) -> &'static str {
    match self {
      ArchiveKind::TestData => "testdata",
      ArchiveKind::Full => "full",
    }
  }

  /// Final file name inside the output directory.
  pub fn file_name(self, version: &Version) -> String {
    match self {
      ArchiveKind::Full => format!("chromium-{}-{}.tar.xz", version, TARGET_OS),
      ArchiveKind::TestData => format!("chromium-{}-{}-testdata.tar.xz", version, TARGET_OS),
    }
  }
}

impl fmt::Display for ArchiveKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
