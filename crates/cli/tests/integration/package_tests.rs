//! End-to-end packaging runs against stub git, gclient, python and *sum tools.

use predicates::prelude::*;

use crate::common::{TestEnv, VERSION};

#[test]
fn package_produces_two_archives_and_hashes() {
  let env = TestEnv::new();

  env.tarball_cmd().arg(VERSION).assert().success();

  assert_eq!(
    env.out_files(),
    vec![
      format!("chromium-{}-linux-testdata.tar.xz", VERSION),
      format!("chromium-{}-linux-testdata.tar.xz.hashes", VERSION),
      format!("chromium-{}-linux.tar.xz", VERSION),
      format!("chromium-{}-linux.tar.xz.hashes", VERSION),
    ]
  );

  for name in env.out_files().iter().filter(|n| n.ends_with(".hashes")) {
    let content = std::fs::read_to_string(env.out_path().join(name)).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 6, "{}", content);
    for (line, algo) in lines.iter().zip(["md5", "sha1", "sha224", "sha256", "sha384", "sha512"]) {
      assert!(line.starts_with(&format!("{}  ", algo)), "{}", line);
    }
  }

  // Nothing left behind in the work dir after the moves.
  assert!(!env.work_path().join(format!("chromium-{}.tar.xz", VERSION)).exists());
}

#[test]
fn package_runs_stages_in_order() {
  let env = TestEnv::new();

  env.tarball_cmd().arg(VERSION).assert().success();

  let order = [
    "python --version",
    "git clone",
    "gclient config",
    "gclient sync --nohooks --no-history",
    "python src/build/util/lastchange.py -o",
    "python src/tools/update_pgo_profiles.py",
    "python src/tools/tarball/export_tarball.py",
    "md5sum",
  ];
  let positions: Vec<usize> = order
    .iter()
    .map(|p| env.position(p).unwrap_or_else(|| panic!("{} never ran: {:?}", p, env.calls())))
    .collect();
  assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", env.calls());

  let gclient = std::fs::read_to_string(env.work_path().join(".gclient")).unwrap();
  assert_eq!(gclient, "target_os = [ 'linux' ]\n");
}

#[test]
fn existing_checkout_is_pulled_not_cloned() {
  let env = TestEnv::new();
  std::fs::create_dir_all(env.work_path().join("depot_tools")).unwrap();

  env.tarball_cmd().arg(VERSION).assert().success();

  assert!(env.position("git clone").is_none());
  assert!(env.position("git pull").is_some());
  assert!(env.position("git checkout").is_none());
}

#[test]
fn detached_checkout_switches_to_main_before_pull() {
  let env = TestEnv::new();
  std::fs::create_dir_all(env.work_path().join("depot_tools")).unwrap();

  env
    .tarball_cmd()
    .env("STUB_GIT_HEAD", "HEAD")
    .arg(VERSION)
    .assert()
    .success();

  let checkout = env.position("git checkout main").expect("checkout main ran");
  let pull = env.position("git pull").expect("pull ran");
  assert!(checkout < pull);
}

#[test]
fn pgo_failure_exits_nonzero_without_archives() {
  let env = TestEnv::new();

  env
    .tarball_cmd()
    .env("STUB_FAIL_PGO", "1")
    .arg(VERSION)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("hooks stage failed"));

  assert!(env.out_files().iter().all(|n| !n.ends_with(".tar.xz")));
  assert!(env.position("python src/tools/tarball/export_tarball.py").is_none());
}

#[test]
fn python_2_aborts_before_bootstrap() {
  let env = TestEnv::new();

  env
    .tarball_cmd()
    .env("STUB_PYTHON_VERSION", "Python 2.7.18")
    .arg(VERSION)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Python 3"));

  assert_eq!(env.calls(), vec!["python --version".to_string()]);
  assert!(!env.work_path().join("depot_tools").exists());
}

#[test]
fn missing_commit_time_names_the_hook() {
  let env = TestEnv::new();

  env
    .tarball_cmd()
    .env("STUB_SKIP_LASTCHANGE", "1")
    .arg(VERSION)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("LASTCHANGE.committime"))
    .stderr(predicate::str::contains("generate LASTCHANGE"));

  assert!(env.position("python src/tools/tarball/export_tarball.py").is_none());
  assert!(env.out_files().is_empty());
}

#[test]
fn no_test_data_exports_only_full_archive() {
  let env = TestEnv::new();

  env
    .tarball_cmd()
    .args(["--no-test-data", VERSION])
    .assert()
    .success();

  assert_eq!(
    env.out_files(),
    vec![
      format!("chromium-{}-linux.tar.xz", VERSION),
      format!("chromium-{}-linux.tar.xz.hashes", VERSION),
    ]
  );
}

#[test]
fn out_dir_option_redirects_archives() {
  let env = TestEnv::new();
  let out = env.temp.path().join("dist");

  env
    .tarball_cmd()
    .arg("--out-dir")
    .arg(&out)
    .arg(VERSION)
    .assert()
    .success();

  assert!(out.join(format!("chromium-{}-linux.tar.xz", VERSION)).exists());
  assert!(env.out_files().is_empty());
}
