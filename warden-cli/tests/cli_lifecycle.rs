use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::sleep;
use std::time::{Duration, Instant};

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

use warden_core::paths::{config_dir, daemon_dir, log_path, record_path};
use warden_core::DaemonName;

/// Temp HOME with a fake watcher. Slays everything on drop.
struct Home {
    dir: TempDir,
    watcher: PathBuf,
}

impl Home {
    fn new() -> Self {
        let dir = TempDir::new().expect("home");
        let watcher = write_fake_watcher(dir.path());
        Self { dir, watcher }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn warden(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("warden"));
        cmd.env("HOME", self.path())
            .env("WARDEN_WATCHER", &self.watcher)
            .env("WARDEN_INTERPRETER", "sh")
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    fn src(&self, name: &str) -> String {
        self.path().join("src").join(name).display().to_string()
    }

    fn invoke(&self, name: &str, extra: &[&str]) -> assert_cmd::assert::Assert {
        let watch = self.src(name);
        let mut cmd = self.warden();
        cmd.args(["invoke", "--name", name, "--watch", &watch, "--script", "build.sh"])
            .args(extra);
        cmd.assert()
    }

    fn tally_json(&self) -> Value {
        let output = self.warden().args(["tally", "--json"]).output().expect("tally");
        assert!(output.status.success(), "tally failed: {output:?}");
        serde_json::from_slice(&output.stdout).expect("tally JSON")
    }

    fn state_of(&self, name: &str) -> Option<String> {
        self.tally_json()["daemons"]
            .as_array()?
            .iter()
            .find(|d| d["name"] == name)
            .and_then(|d| d["state"].as_str().map(str::to_string))
    }

    fn wait_for_state(&self, name: &str, want: &str) -> Option<String> {
        let deadline = Instant::now() + Duration::from_secs(3);
        loop {
            let got = self.state_of(name);
            if got.as_deref() == Some(want) || Instant::now() > deadline {
                return got;
            }
            sleep(Duration::from_millis(50));
        }
    }
}

impl Drop for Home {
    fn drop(&mut self) {
        let _ = self.warden().args(["slay", "--all"]).output();
    }
}

fn write_fake_watcher(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("fake-watchexec");
    fs::write(&path, "#!/bin/sh\necho \"watching $2\"\nexec sleep 30\n").expect("write watcher");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

// ---------------------------------------------------------------------------
// invoke
// ---------------------------------------------------------------------------

#[test]
fn invoke_reports_pid_and_persists_record() {
    let home = Home::new();
    home.invoke("helix", &["--group", "forge"])
        .success()
        .stdout(contains("OK: invoked daemon \"helix\" (group=\"forge\") with PID "));

    let record = record_path(home.path(), &DaemonName::from("helix"));
    let json: Value = serde_json::from_str(&fs::read_to_string(record).unwrap()).unwrap();
    assert_eq!(json["group"], "forge");
    assert!(json["pid"].as_i64().unwrap() > 0);
    assert_eq!(json["logPath"], log_path(home.path(), "helix").display().to_string());
    assert!(json["scriptPath"].as_str().unwrap().ends_with("/build.sh"));
}

#[test]
fn invoke_conflict_exits_with_code_2() {
    let home = Home::new();
    home.invoke("helix", &[]).success();

    let watch = home.src("helix");
    home.warden()
        .args(["invoke", "--name", "twin", "--watch", &watch, "--script", "build.sh"])
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("already watching")));
    assert!(!record_path(home.path(), &DaemonName::from("twin")).exists());
}

#[test]
fn invoke_without_watch_is_validation_error() {
    let home = Home::new();
    home.warden()
        .args(["invoke", "--name", "helix", "--script", "build.sh"])
        .assert()
        .code(1)
        .stderr(contains("`--watch` is required"));
}

#[test]
fn invoke_from_installed_workflow() {
    let home = Home::new();
    home.warden().args(["install", "full"]).assert().success();

    home.warden()
        .args(["invoke", "--config", "dummy"])
        .assert()
        .success()
        .stdout(contains("invoked daemon \"dummy\" (group=\"default\")"));

    let json = home.tally_json();
    let daemon = &json["daemons"][0];
    assert_eq!(daemon["name"], "dummy");
    assert_eq!(daemon["group"], "default");
    assert_eq!(daemon["watchDir"], home.path().join("Downloads").display().to_string());
    let script = daemon["scriptPath"].as_str().unwrap();
    assert_eq!(script, config_dir(home.path()).join("dummy.sh").display().to_string());
    assert!(Path::new(script).is_file(), "installed workflow script missing");
}

#[test]
fn invoke_unknown_workflow_fails() {
    let home = Home::new();
    fs::create_dir_all(config_dir(home.path())).unwrap();
    home.warden()
        .args(["invoke", "--config", "ghost"])
        .assert()
        .code(1)
        .stderr(contains("workflow 'ghost' not found"));
}

// ---------------------------------------------------------------------------
// freeze / rekindle / slay / tally
// ---------------------------------------------------------------------------

#[test]
fn freeze_shows_stopped_then_slay_forgets() {
    let home = Home::new();
    home.invoke("helix", &[]).success();
    assert_eq!(home.wait_for_state("helix", "running").as_deref(), Some("running"));

    home.warden()
        .args(["freeze", "helix"])
        .assert()
        .success()
        .stdout(contains("OK: froze daemon \"helix\""));
    assert_eq!(home.wait_for_state("helix", "stopped").as_deref(), Some("stopped"));

    home.warden()
        .args(["slay", "helix"])
        .assert()
        .success()
        .stdout(contains("OK: slayed daemon \"helix\""));
    assert!(!record_path(home.path(), &DaemonName::from("helix")).exists());
    assert!(!log_path(home.path(), "helix").exists());

    home.warden()
        .arg("tally")
        .assert()
        .success()
        .stdout(contains("No daemons invoked."));
}

#[test]
fn rekindle_reports_new_pid_and_orphan() {
    let home = Home::new();
    home.invoke("helix", &[]).success();
    let before = home.tally_json()["daemons"][0]["pid"].as_i64().unwrap();

    home.warden()
        .args(["rekindle", "helix"])
        .assert()
        .success()
        .stdout(contains("OK: rekindled \"helix\" with PID "))
        .stderr(contains(format!("(PID {before}) is still running")));

    let after = home.tally_json()["daemons"][0]["pid"].as_i64().unwrap();
    assert_ne!(before, after);

    // The orphaned watcher is not tracked; clean it up by hand.
    let _ = Command::new("kill").arg(before.to_string()).status();
}

#[test]
fn group_selector_targets_only_that_group() {
    let home = Home::new();
    home.invoke("alpha", &["--group", "forge"]).success();
    home.invoke("beta", &["--group", "forge"]).success();
    home.invoke("gamma", &["--group", "editors"]).success();

    home.warden()
        .args(["slay", "--group", "forge"])
        .assert()
        .success()
        .stdout(contains("\"alpha\"").and(contains("\"beta\"")).and(contains("gamma").not()));

    let json = home.tally_json();
    let names: Vec<_> = json["daemons"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["gamma"]);
}

#[test]
fn batch_reports_corrupt_records_and_succeeds() {
    let home = Home::new();
    home.invoke("helix", &[]).success();
    fs::write(daemon_dir(home.path()).join("broken.json"), "{").unwrap();

    home.warden()
        .args(["freeze", "--all"])
        .assert()
        .success()
        .stdout(contains("froze daemon \"helix\""))
        .stderr(contains("warning:").and(contains("broken.json")));

    let json = home.tally_json();
    assert_eq!(json["daemons"].as_array().unwrap().len(), 1);
    assert_eq!(json["skipped"].as_array().unwrap().len(), 1);
}

#[test]
fn selector_is_required_and_exclusive() {
    let home = Home::new();
    home.warden().arg("freeze").assert().code(1);
    home.warden()
        .args(["slay", "helix", "--all"])
        .assert()
        .code(1)
        .stderr(contains("cannot be used with"));
}

#[test]
fn usage_errors_exit_1_and_help_exits_0() {
    let home = Home::new();
    home.warden()
        .arg("slay")
        .assert()
        .code(1)
        .stderr(contains("required arguments were not provided"));
    home.warden().args(["invoke", "--bogus"]).assert().code(1);
    home.warden()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Usage"));
    home.warden().arg("--version").assert().success();
}

#[test]
fn missing_daemon_is_generic_failure() {
    let home = Home::new();
    home.warden()
        .args(["freeze", "ghost"])
        .assert()
        .code(1)
        .stderr(contains("error:").and(contains("no daemon named 'ghost'")));
}

// ---------------------------------------------------------------------------
// summon / install
// ---------------------------------------------------------------------------

#[test]
fn summon_prints_log_tail() {
    let home = Home::new();
    home.invoke("helix", &[]).success();

    let log = log_path(home.path(), "helix");
    let deadline = Instant::now() + Duration::from_secs(3);
    while !fs::read_to_string(&log).unwrap_or_default().contains("watching")
        && Instant::now() < deadline
    {
        sleep(Duration::from_millis(20));
    }

    home.warden()
        .args(["summon", "helix", "--lines", "5"])
        .assert()
        .success()
        .stdout(contains(format!("watching {}", home.src("helix"))));
}

#[test]
fn summon_survives_non_utf8_output() {
    let home = Home::new();
    home.invoke("helix", &[]).success();
    let log = log_path(home.path(), "helix");
    let deadline = Instant::now() + Duration::from_secs(3);
    while !fs::read_to_string(&log).unwrap_or_default().contains("watching")
        && Instant::now() < deadline
    {
        sleep(Duration::from_millis(20));
    }
    fs::write(&log, b"ok line\nbad \xff byte\nlast line\n").unwrap();

    home.warden()
        .args(["summon", "helix"])
        .assert()
        .success()
        .stdout(contains("ok line").and(contains("bad \u{fffd} byte")).and(contains("last line")));
}

#[test]
fn install_is_idempotent() {
    let home = Home::new();
    home.warden()
        .args(["install", "full"])
        .assert()
        .success()
        .stdout(contains("OK: initialized").and(contains("default.toml")));
    assert!(daemon_dir(home.path()).is_dir());

    home.warden()
        .args(["install", "config"])
        .assert()
        .success()
        .stdout(contains("configuration already present"));
}
