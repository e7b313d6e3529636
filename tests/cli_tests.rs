//! CLI integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn bankpeer() -> Command {
    let mut cmd = cargo_bin_cmd!("bankpeer");
    cmd.env_remove("BANKPEER_DATABASE").env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("bankpeer.toml");
    let database = dir.join("peers.db");
    fs::write(
        &path,
        format!("database = \"{}\"\n{extra}", database.display()),
    )
    .expect("write config");
    path
}

fn write_statements(dir: &Path) -> PathBuf {
    let banks = [("alpha", 500.0, 0.014), ("bravo", 400.0, 0.011), ("charlie", 300.0, 0.009), ("delta", 200.0, 0.012)];
    let institutions: Vec<Value> = banks
        .iter()
        .map(|(id, _, _)| json!({ "id": id, "name": format!("{id} national") }))
        .collect();
    let statements: Vec<Value> = banks
        .iter()
        .map(|(id, size, roa)| {
            json!({
                "institution_id": id,
                "period": "2024-03-31",
                "balance_sheet": { "assets": { "total_assets": size } },
                "ratios": { "roa": roa },
            })
        })
        .collect();

    let path = dir.join("statements.json");
    fs::write(
        &path,
        json!({ "institutions": institutions, "statements": statements }).to_string(),
    )
    .expect("write statements");
    path
}

fn last_json_line(output: &[u8]) -> Value {
    let stdout = String::from_utf8_lossy(output);
    let line = stdout.lines().last().expect("some output");
    serde_json::from_str(line).expect("json output")
}

#[test]
fn help_lists_commands() {
    bankpeer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn metrics_json_lists_every_metric() {
    let output = bankpeer().args(["metrics", "--json"]).output().unwrap();
    assert!(output.status.success());

    let value = last_json_line(&output.stdout);
    let metrics = value["metrics"].as_array().unwrap();
    assert_eq!(metrics.len(), 13);
    assert!(metrics
        .iter()
        .any(|m| m["name"] == "efficiencyRatio" && m["direction"] == "lower_is_better"));
}

#[test]
fn config_init_then_validate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bankpeer.toml");

    bankpeer()
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .success();
    bankpeer()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
    bankpeer()
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn invalid_config_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "[analysis]\npeer_count = 0\n");

    bankpeer()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("peer_count"));
}

#[test]
fn import_run_show_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "[analysis]\npeer_count = 1\n");
    let statements = write_statements(dir.path());

    let import = bankpeer()
        .args(["import", "--json", "--config"])
        .arg(&config)
        .arg(&statements)
        .output()
        .unwrap();
    assert!(import.status.success(), "{}", String::from_utf8_lossy(&import.stderr));
    let imported = last_json_line(&import.stdout);
    assert_eq!(imported["statements"], 4);

    let run = bankpeer()
        .args(["run", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));
    let summary = &last_json_line(&run.stdout)["summary"];
    assert_eq!(summary["processed"], 4);
    assert_eq!(summary["errors"], 0);
    assert_eq!(summary["state"], "finished");

    let show = bankpeer()
        .args(["show", "bravo", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(show.status.success(), "{}", String::from_utf8_lossy(&show.stderr));
    let shown = last_json_line(&show.stdout);
    assert_eq!(shown["period"], "2024-03-31");
    let cohort = &shown["analysis"]["cohort"];
    assert_eq!(cohort["larger_ids"], json!(["alpha"]));
    assert_eq!(cohort["smaller_ids"], json!(["charlie"]));
    assert_eq!(shown["analysis"]["rankings"]["roa"]["rank"], 3);
}

#[test]
fn show_before_run_reports_missing_analysis() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    let statements = write_statements(dir.path());

    bankpeer()
        .args(["import", "--config"])
        .arg(&config)
        .arg(&statements)
        .assert()
        .success();

    bankpeer()
        .args(["show", "alpha", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No peer analysis"));
}

#[test]
fn show_unknown_institution_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    bankpeer()
        .args(["show", "zulu", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("institution zulu has no statements"));
}

#[test]
fn held_lock_blocks_a_second_run() {
    let dir = TempDir::new().unwrap();
    let lock = dir.path().join("bankpeer.lock");
    fs::write(&lock, "1 held").unwrap();
    let config = write_config(dir.path(), &format!("lock_file = \"{}\"\n", lock.display()));

    bankpeer()
        .args(["run", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 held"))
        .stdout(predicate::str::contains(format!("delete {}", lock.display())))
        .stderr(predicate::str::contains("another run"));
    assert!(lock.exists());
}

#[test]
fn run_writes_status_file() {
    let dir = TempDir::new().unwrap();
    let status = dir.path().join("status.json");
    let config = write_config(dir.path(), &format!("status_file = \"{}\"\n", status.display()));
    let statements = write_statements(dir.path());

    bankpeer()
        .args(["import", "--quiet", "--config"])
        .arg(&config)
        .arg(&statements)
        .assert()
        .success();
    bankpeer()
        .args(["run", "--quiet", "--config"])
        .arg(&config)
        .assert()
        .success();

    let written: Value = serde_json::from_str(&fs::read_to_string(&status).unwrap()).unwrap();
    assert_eq!(written["version"], "1");
    assert_eq!(written["summary"]["processed"], 4);
}
