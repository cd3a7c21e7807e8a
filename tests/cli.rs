#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn cli() -> Command {
    Command::cargo_bin("tabel-cli").unwrap()
}

#[test]
fn build_prints_every_worker() {
    cli()
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("Феоктистова Е.А. | ГР1 | 11.5 11.5 - 11.5"))
        .stdout(predicate::str::contains("| 188 | 28"))
        .stdout(predicate::str::contains("Подгорбунский Д.А. | офис"));
}

#[test]
fn list_filters_by_group() {
    cli()
        .args(["list", "--group", "офис"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Подгорбунский Д.А."))
        .stdout(predicate::str::contains("Феоктистова").not());
}

#[test]
fn summary_reports_key_figures() {
    cli()
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workers: 24"))
        .stdout(predicate::str::contains("Overtime: 24"));
}

#[test]
fn validate_exits_with_warning_code() {
    cli()
        .arg("validate")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Феоктистова Е.А. day 1: invalid value '11.5'"));

    cli()
        .args(["validate", "--corrected"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no invalid cells"));
}

#[test]
fn validate_edited_table_is_audited() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("table.csv");
    let log = dir.path().join("app.log");

    cli()
        .args(["build", "--out-csv"])
        .arg(&csv)
        .assert()
        .success();

    let text = fs::read_to_string(&csv).unwrap();
    fs::write(&csv, text.replacen("Третьяков А.И.,ГР1,11.5,", "Третьяков А.И.,ГР1,xx,", 1)).unwrap();

    cli()
        .args(["--user", "operator", "--audit-log"])
        .arg(&log)
        .args(["validate", "--corrected", "--table"])
        .arg(&csv)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Третьяков А.И. day 1: invalid value 'xx'"));

    let audit = fs::read_to_string(&log).unwrap();
    assert!(audit.contains("User: operator - table edited: 1 cell(s) changed"));
}

#[test]
fn export_writes_dated_file() {
    let dir = tempdir().unwrap();
    cli()
        .args(["export", "--format", "json", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported"));

    let files: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("timesheet_"));
    assert!(files[0].ends_with(".json"));
}

#[test]
fn unknown_template_aborts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roster.json");
    fs::write(
        &path,
        r#"{
            "groups": ["A"],
            "markers": [""],
            "templates": [{ "id": "T", "slots": [8] }],
            "workers": [
                { "name": "ok", "group": "A", "template": "T" },
                { "name": "ko", "group": "A", "template": "missing" }
            ]
        }"#,
    )
    .unwrap();

    cli()
        .arg("--config")
        .arg(&path)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown template: missing"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn init_config_writes_default() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("roster.json");
    cli().args(["init-config", "--out"]).arg(&out).assert().success();

    cli()
        .arg("--config")
        .arg(&out)
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workers: 24"));
}
