//! CLI integration tests
//!
//! Drives the sheetmap binary with assert_cmd.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tempfile::TempDir;

const LAYOUT: &str = "test-data/cars_layout.yaml";

fn sheetmap() -> Command {
    Command::cargo_bin("sheetmap").unwrap()
}

/// A workbook matching the test layout with two cars and one dealer.
fn write_data(path: &Path) {
    let mut workbook = Workbook::new();

    let cars = workbook.add_worksheet();
    cars.set_name("Cars").unwrap();
    for (col, header) in ["Make", "Model", "Year"].iter().enumerate() {
        cars.write_string(1, col as u16, *header).unwrap();
    }
    cars.write_string(2, 0, "Toyota").unwrap();
    cars.write_string(2, 1, "Camry").unwrap();
    cars.write_number(2, 2, 2020.0).unwrap();
    cars.write_string(3, 0, "Honda").unwrap();
    cars.write_string(3, 1, "Civic").unwrap();
    cars.write_string(3, 2, "2019").unwrap();

    let dealers = workbook.add_worksheet();
    dealers.set_name("Dealers").unwrap();
    dealers.write_string(2, 0, "Main St Motors").unwrap();
    dealers.write_string(2, 1, "Osaka").unwrap();
    dealers.write_string(2, 2, "OPEN").unwrap();

    workbook.save(path).unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    sheetmap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheetmap"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    sheetmap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheetmap"));
}

// ═══════════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_check_prints_placements() {
    sheetmap()
        .args(["check", LAYOUT])
        .assert()
        .success()
        .stdout(predicate::str::contains("Manufacturing Plants"))
        .stdout(predicate::str::contains("F1:I1"))
        .stdout(predicate::str::contains("Layout is valid"));
}

#[test]
fn test_check_rejects_bad_layout() {
    let dir = TempDir::new().unwrap();
    let layout = dir.path().join("bad.yaml");
    std::fs::write(
        &layout,
        "sheets:\n  - name: A\n    header_row: 1\n    tables:\n      - { name: T, columns: [{ field: x }] }\n",
    )
    .unwrap();

    sheetmap()
        .args(["check", layout.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title row and header row"));
}

#[test]
fn test_template_command_writes_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("template.xlsx");

    sheetmap()
        .args(["template", LAYOUT, output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Template written"));

    assert!(output.exists());
}

#[test]
fn test_load_command_writes_json() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data.xlsx");
    let output = dir.path().join("rows.json");
    write_data(&data);

    sheetmap()
        .args([
            "load",
            LAYOUT,
            data.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 3 records"));

    let rows: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(rows["cars"][1]["year"], 2019);
    assert_eq!(rows["dealers"][0]["city"], "Osaka");
    assert_eq!(rows["manufacturing_plants"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_load_command_missing_sheet_fails() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("partial.xlsx");
    let mut workbook = Workbook::new();
    workbook.add_worksheet().set_name("Cars").unwrap();
    workbook.save(&data).unwrap();

    sheetmap()
        .args(["load", LAYOUT, data.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dealers"));
}
