mod package;
mod releases;

pub use package::{PackageArgs, cmd_package};
pub use releases::{ReleasesArgs, cmd_releases};
