use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bankstmt() -> Command {
    Command::cargo_bin("bankstmt").unwrap()
}

/// Temp dir with an explicit config so the user's own file is never read.
fn workspace() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    let config = config.to_string_lossy().into_owned();
    (dir, config)
}

#[test]
fn parse_text_file_as_csv() {
    let (dir, config) = workspace();
    let input = dir.path().join("statement.txt");
    fs::write(&input, "2025-08-15 ATM Withdrawal -500.00\n2025-08-16 Salary 2000\n").unwrap();

    bankstmt()
        .args(["-c", &config, "parse", "--format", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("date,description,amount,credit,debit"))
        .stdout(predicate::str::contains("2025-08-15,ATM Withdrawal,-500.00,0,500.00"))
        .stdout(predicate::str::contains("2025-08-16,Salary,2000,2000,0"));
}

#[test]
fn parse_stdin_as_json() {
    let (_dir, config) = workspace();

    bankstmt()
        .args(["-c", &config, "parse", "-"])
        .write_stdin("2025-08-15 Coffee -3.50\n2025-08-16 Refund 3.50\n2025-08-17 Fee -1.00\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"provenance\": \"text\""))
        .stdout(predicate::str::contains("\"description\": \"Refund\""));
}

#[test]
fn parse_without_transactions_suggests_table_strategy() {
    let (dir, config) = workspace();
    let input = dir.path().join("empty.txt");
    fs::write(&input, "Account summary\nNo activity this period\n").unwrap();

    bankstmt()
        .args(["-c", &config, "parse"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("try the table strategy"));
}

#[test]
fn convert_missing_file_fails() {
    let (dir, config) = workspace();

    bankstmt()
        .args(["-c", &config, "convert", "--strategy", "text"])
        .arg(dir.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn convert_rejects_non_pdf() {
    let (dir, config) = workspace();
    let input = dir.path().join("fake.pdf");
    fs::write(&input, "not a pdf at all").unwrap();

    bankstmt()
        .args(["-c", &config, "convert", "--strategy", "table"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse PDF"));
}

#[test]
fn convert_requires_strategy() {
    let (dir, config) = workspace();

    bankstmt()
        .args(["-c", &config, "convert"])
        .arg(dir.path().join("statement.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--strategy"));
}

#[test]
fn config_init_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.json");
    let config = config.to_string_lossy().into_owned();

    bankstmt()
        .args(["-c", &config, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    bankstmt()
        .args(["-c", &config, "config", "set", "extraction.min_records_before_escalation", "5"])
        .assert()
        .success();

    bankstmt()
        .args(["-c", &config, "config", "get", "extraction.min_records_before_escalation"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    bankstmt()
        .args(["-c", &config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn config_path_reports_status() {
    let (_dir, config) = workspace();

    bankstmt()
        .args(["-c", &config, "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"))
        .stdout(predicate::str::contains("exists"));
}

#[test]
fn batch_without_matches_fails() {
    let (dir, config) = workspace();
    let pattern = dir.path().join("*.pdf").to_string_lossy().into_owned();

    bankstmt()
        .args(["-c", &config, "batch", "--strategy", "text", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching PDF files"));
}

#[test]
fn batch_continue_on_error_writes_summary() {
    let (dir, config) = workspace();
    fs::write(dir.path().join("broken.pdf"), "garbage").unwrap();
    let pattern = dir.path().join("*.pdf").to_string_lossy().into_owned();
    let out = dir.path().join("out");

    bankstmt()
        .args(["-c", &config, "batch", "--strategy", "text", "--summary", "--continue-on-error"])
        .arg("-o")
        .arg(&out)
        .arg(&pattern)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 failed"));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,provenance"));
    assert!(summary.contains("broken.pdf,error"));
}
