//! Fixed locations, names and upstream URLs.

/// Upstream Chromium source repository pinned by `gclient config`.
pub const CHROMIUM_SRC_URL: &str = "https://chromium.googlesource.com/chromium/src.git";

pub const DEPOT_TOOLS_URL: &str = "https://chromium.googlesource.com/chromium/tools/depot_tools.git";

pub const GN_URL: &str = "https://gn.googlesource.com/gn";

pub const VERSION_HISTORY_URL: &str = "https://versionhistory.googleapis.com/v1/chrome/platforms";

/// The only platform tarballs are produced for.
pub const TARGET_OS: &str = "linux";

/// Branch that a detached depot_tools checkout is returned to before pulling.
pub const DEPOT_TOOLS_BRANCH: &str = "main";

pub const DEPOT_TOOLS_DIR: &str = "depot_tools";
pub const SRC_DIR: &str = "src";
pub const OUT_DIR: &str = "out";
pub const GCLIENT_FILE: &str = ".gclient";

pub const EXPORT_TARBALL_SCRIPT: &str = "src/tools/tarball/export_tarball.py";

/// Digest algorithms listed in every `.hashes` sidecar, in order.
///
/// Each name maps to the `<name>sum` coreutils binary.
pub const HASH_ALGORITHMS: [&str; 6] = ["md5", "sha1", "sha224", "sha256", "sha384", "sha512"];

pub const HASHES_EXTENSION: &str = "hashes";
