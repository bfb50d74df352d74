//! Integration tests that run the binary against stub tools.

#[cfg(unix)]
mod package_tests;
mod releases_tests;
