//! Schedules, disabled rules, cyclic groups, and shorthand services through the CLI.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn flowcheck_cmd() -> Command {
    Command::cargo_bin("flowcheck").expect("flowcheck binary not found")
}

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/schedules")
}

/// Run `analyze` on the schedules fixture and return `(label, decision, policy id)` per row.
fn run(out_dir: &Path, extra: &[&str]) -> Vec<(String, String, String)> {
    let dir = fixture();
    let out = out_dir.join("results.csv");
    flowcheck_cmd()
        .arg("analyze")
        .arg("--config")
        .arg(dir.join("fortigate.conf"))
        .arg("--src-csv")
        .arg(dir.join("src.csv"))
        .arg("--dst-csv")
        .arg(dir.join("dst.csv"))
        .arg("--ports")
        .arg(dir.join("ports.txt"))
        .arg("--out")
        .arg(&out)
        .args(extra)
        .assert()
        .success();

    std::fs::read_to_string(out)
        .expect("results")
        .lines()
        .skip(1)
        .map(|line| {
            let cols: Vec<&str> = line.split(',').collect();
            (cols[5].to_string(), cols[8].to_string(), cols[9].to_string())
        })
        .collect()
}

fn row(label: &str, decision: &str, policy: &str) -> (String, String, String) {
    (label.to_string(), decision.to_string(), policy.to_string())
}

#[test]
fn named_schedule_is_inactive_by_default() {
    let tmp = TempDir::new().expect("temp dir");
    assert_eq!(
        run(tmp.path(), &[]),
        vec![
            row("ssh", "DENY", "3"),
            row("alt-web", "ALLOW", "4"),
            row("dns", "DENY", ""),
        ]
    );
}

#[test]
fn active_schedule_flag_enables_the_rule() {
    let tmp = TempDir::new().expect("temp dir");
    let rows = run(tmp.path(), &["--active-schedule", "maintenance"]);
    assert_eq!(rows[0], row("ssh", "ALLOW", "1"));

    let other = run(tmp.path(), &["--active-schedule", "weekend"]);
    assert_eq!(other[0], row("ssh", "DENY", "3"));
}

#[test]
fn ignore_schedule_enables_every_rule() {
    let tmp = TempDir::new().expect("temp dir");
    let rows = run(tmp.path(), &["--ignore-schedule"]);
    assert_eq!(rows[0], row("ssh", "ALLOW", "1"));
}

#[test]
fn settings_file_can_list_active_schedules() {
    let tmp = TempDir::new().expect("temp dir");
    let settings = tmp.path().join("flowcheck.toml");
    std::fs::write(&settings, "active_schedules = [\"maintenance\"]\n").expect("settings");
    let settings = settings.to_str().expect("utf8 path").to_string();
    let rows = run(tmp.path(), &["--settings", &settings]);
    assert_eq!(rows[0], row("ssh", "ALLOW", "1"));
}
