use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid config; sources point at a closed local port so nothing leaves the machine.
fn write_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let toml = format!(
        r#"
[sources]
primary_url = "http://127.0.0.1:9/travel"
secondary_url = "http://127.0.0.1:9/export"
timeout_secs = 2

[notify]
recipient_id = 42
token_env = "FINWATCH_TEST_TOKEN"
{extra}
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn finwatch(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("finwatch").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("DISCORD_USER_ID")
        .env_remove("FINWATCH_TEST_TOKEN")
        .arg("--config")
        .arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["plan", "--restock", "2026-03-01T18:00:00Z"], 0, "2026-03-01 16:24:00 UTC", "stdout")]
#[case(&["plan", "--restock", "tomorrow"], 2, "invalid restock instant", "stderr")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
#[case(&["check"], 2, "FINWATCH_TEST_TOKEN", "stderr")]
#[case(&["run", "--once"], 2, "missing credential", "stderr")]
#[case(&["bogus"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    let mut cmd = finwatch(&cfg);
    for a in args {
        cmd.arg(a);
    }
    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn plan_prints_full_schedule_as_json() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = finwatch(&cfg)
        .args(["--json", "plan", "--restock", "2026-03-01T18:00:00Z"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["warn"], "2026-03-01T16:14:00+00:00");
    assert_eq!(v["depart"], "2026-03-01T16:24:00+00:00");
    assert_eq!(v["depart_deadline"], "2026-03-01T16:54:00+00:00");
    assert_eq!(v["landing"], "2026-03-01T17:58:00+00:00");
}

#[test]
fn plan_honours_positive_arrival_offset() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[timing]\narrival_offset_secs = 60\n");
    finwatch(&cfg)
        .args(["plan", "--restock", "2026-03-01T18:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-03-01 16:27:00 UTC"))
        .stdout(predicate::str::contains("2026-03-01 18:01:00 UTC"));
}

#[test]
fn missing_config_file_exits_two() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    finwatch(&missing)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("read config"));
}

#[test]
fn invalid_value_is_reported_as_json() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[prediction]\ncalibration_factor = 0.0\n");
    let out = finwatch(&cfg).args(["--json", "self-check"]).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
    let line = String::from_utf8(out.stderr).unwrap();
    let last = line.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "Config");
    assert!(v["message"].as_str().unwrap().contains("calibration_factor"));
}

#[test]
fn dry_run_simulated_single_tick() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = finwatch(&cfg)
        .args(["run", "--dry-run", "--simulate", "--once", "--plain-times"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["quantity"], 1200);
    assert_eq!(v["edge"], serde_json::Value::Null);
    let logs = String::from_utf8_lossy(&out.stderr);
    assert!(logs.contains("monitor online"));
}

#[test]
fn check_reports_unreachable_sources() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    finwatch(&cfg)
        .env("FINWATCH_TEST_TOKEN", "t")
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"ok\":false"))
        .stderr(predicate::str::contains("no source returned the tracked item"));
}
