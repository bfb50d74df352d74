//! `releases` subcommand against a mock version history API.

use predicates::prelude::*;
use serde_json::json;

use crate::common::TestEnv;

fn page(releases: &[(&str, &str)]) -> String {
  let releases: Vec<_> = releases
    .iter()
    .map(|(version, start)| json!({ "version": version, "serving": { "startTime": start } }))
    .collect();
  json!({ "releases": releases }).to_string()
}

#[test]
fn releases_lists_latest_versions_within_window() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let stable = server
    .mock("GET", "/linux/channels/stable/versions/all/releases")
    .match_query(mockito::Matcher::Any)
    .with_body(page(&[("130.0.6723.116", "2024-11-01T00:00:00Z")]))
    .create();

  env
    .tarball_cmd()
    .args(["releases", "--channel", "stable", "--within", "36500days"])
    .env("CHROMIUM_TARBALL_VERSION_HISTORY_URL", server.url())
    .assert()
    .success()
    .stdout(predicate::eq("130.0.6723.116\n"));

  stable.assert();
}

#[test]
fn releases_drops_old_versions() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  server
    .mock("GET", "/linux/channels/stable/versions/all/releases")
    .match_query(mockito::Matcher::Any)
    .with_body(page(&[("100.0.4896.60", "2022-03-29T00:00:00Z")]))
    .create();

  env
    .tarball_cmd()
    .args(["releases", "--channel", "stable"])
    .env("CHROMIUM_TARBALL_VERSION_HISTORY_URL", server.url())
    .assert()
    .success()
    .stdout(predicate::str::is_empty());
}

#[test]
fn releases_looks_up_single_version() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  server
    .mock("GET", "/linux/channels/stable/versions/all/releases")
    .match_query(mockito::Matcher::Any)
    .with_body(page(&[("130.0.6723.116", "2024-11-01T00:00:00Z")]))
    .create();
  server
    .mock("GET", "/linux/channels/beta/versions/all/releases")
    .match_query(mockito::Matcher::Any)
    .with_body(page(&[("131.0.6778.13", "2024-10-23T17:00:00Z")]))
    .create();

  env
    .tarball_cmd()
    .args(["releases", "--release", "131.0.6778.13"])
    .env("CHROMIUM_TARBALL_VERSION_HISTORY_URL", server.url())
    .assert()
    .success()
    .stdout(predicate::str::contains("Chromium 131.0.6778.13: beta (October 23, 2024 at 05:00 UTC)"));
}

#[test]
fn releases_reports_http_errors() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  server
    .mock("GET", "/linux/channels/stable/versions/all/releases")
    .match_query(mockito::Matcher::Any)
    .with_status(503)
    .create();

  env
    .tarball_cmd()
    .args(["releases", "--channel", "stable"])
    .env("CHROMIUM_TARBALL_VERSION_HISTORY_URL", server.url())
    .assert()
    .code(1)
    .stderr(predicate::str::contains("503"));
}

#[test]
fn releases_verbose_describes_each_release() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  server
    .mock("GET", "/linux/channels/stable/versions/all/releases")
    .match_query(mockito::Matcher::Any)
    .with_body(page(&[("130.0.6723.116", "2024-11-01T00:00:00Z")]))
    .create();

  env
    .tarball_cmd()
    .args(["releases", "--verbose", "--channel", "stable", "--within", "36500days"])
    .env("CHROMIUM_TARBALL_VERSION_HISTORY_URL", server.url())
    .env("NO_COLOR", "1")
    .assert()
    .success()
    .stdout(predicate::eq("Chromium stable: 130.0.6723.116 (November 01, 2024 at 12:00 UTC)\n"));
}

#[test]
fn unreachable_api_reports_url_once() {
  let env = TestEnv::new();

  let assert = env
    .tarball_cmd()
    .args(["releases", "--channel", "stable"])
    .env("CHROMIUM_TARBALL_VERSION_HISTORY_URL", "http://127.0.0.1:9")
    .assert()
    .code(1);

  let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
  let error_line = stderr
    .lines()
    .find(|l| l.contains("Failed to fetch releases"))
    .unwrap_or_else(|| panic!("no error line in {stderr}"));
  assert_eq!(error_line.matches("http://127.0.0.1:9/").count(), 1, "{error_line}");
}
