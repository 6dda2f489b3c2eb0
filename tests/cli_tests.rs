//! CLI Integration Tests
//!
//! Runs the `sheetlens` binary with assert_cmd against fixtures written by
//! rust_xlsxwriter.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(dir: &Path) -> PathBuf {
    let path = dir.join("report.xlsx");
    let mut book = XlsxWorkbook::new();
    let sheet = book.add_worksheet();
    sheet.set_name("Data").unwrap();
    sheet.write_string(0, 0, "Name").unwrap();
    sheet.write_number(0, 1, 3.0).unwrap();
    book.save(&path).unwrap();
    path
}

fn sheetlens() -> Command {
    let mut cmd = Command::cargo_bin("sheetlens").unwrap();
    cmd.env_remove("SHEETLENS_OUTPUT_DIR");
    cmd
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    sheetlens()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("--output-dir"));
}

#[test]
fn test_cli_version() {
    sheetlens()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheetlens"));
}

// ═══════════════════════════════════════════════════════════════════════════
// ANALYZE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_no_format_flag_fails() {
    let dir = TempDir::new().unwrap();
    let input = fixture(dir.path());

    sheetlens()
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("At least one output format"));
}

#[test]
fn test_json_report_generated() {
    let dir = TempDir::new().unwrap();
    let input = fixture(dir.path());
    let out = dir.path().join("out");

    sheetlens()
        .arg(&input)
        .arg("--json")
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"))
        .stdout(predicate::str::contains("report_analysis.json"));

    assert!(out.join("report_analysis.json").exists());
}

#[test]
fn test_all_formats_generated() {
    let dir = TempDir::new().unwrap();
    let input = fixture(dir.path());
    let out = dir.path().join("all");

    sheetlens()
        .arg(&input)
        .args(["--json", "--yaml", "--html", "--text", "--csv", "--excel"])
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    for name in [
        "report_analysis.json",
        "report_analysis.yaml",
        "report_analysis.html",
        "report_analysis.txt",
        "report_Data.csv",
        "report_analysis.xlsx",
    ] {
        assert!(out.join(name).exists(), "{} missing", name);
    }
}

#[test]
fn test_output_dir_from_env() {
    let dir = TempDir::new().unwrap();
    let input = fixture(dir.path());
    let out = dir.path().join("from-env");

    sheetlens()
        .env("SHEETLENS_OUTPUT_DIR", &out)
        .arg(&input)
        .arg("--text")
        .assert()
        .success();

    assert!(out.join("report_analysis.txt").exists());
}

// ═══════════════════════════════════════════════════════════════════════════
// ERROR TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_file_reports_open_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.xlsx");

    sheetlens()
        .arg(&missing)
        .arg("--json")
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: open error"))
        .stderr(predicate::str::contains("missing.xlsx"));
}

#[test]
fn test_unsupported_extension_reported() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("book.xlsb");
    std::fs::write(&input, [0u8; 8]).unwrap();

    sheetlens()
        .arg(&input)
        .arg("--text")
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: unsupported format"));
}
