//! Integration tests for the rigcheck CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.
//! Commands run inside a temp directory with the RIGCHECK_* variables
//! cleared, so only the built-in sample data or an explicit --catalog is
//! seen.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an isolated rigcheck command
fn rigcheck(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rigcheck").unwrap();
    cmd.current_dir(tmp.path())
        .env_remove("RIGCHECK_CATALOG")
        .env_remove("RIGCHECK_ESTIMATES")
        .env_remove("RIGCHECK_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to write a catalog directory holding the reference AM4 build
fn setup_reference_catalog() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("parts");
    fs::create_dir(&dir).unwrap();

    fs::write(
        dir.join("cpu.json"),
        r#"[{"model": "Ref CPU", "socket": "AM4", "power": 65}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("mobo.json"),
        r#"[{"model": "Ref Board", "socket": "AM4", "ramType": "DDR4", "formFactor": "ATX"}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("ram.json"),
        r#"[{"model": "Ref RAM", "type": "DDR4", "power": 5}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("gpu.json"),
        r#"[
            {"model": "Ref GPU", "length": 300, "power": 220},
            {"model": "Long GPU", "length_mm": 400, "power": 220}
        ]"#,
    )
    .unwrap();
    fs::write(
        dir.join("psu.json"),
        r#"[{"model": "Small PSU", "capacity": 450}, {"model": "Ref PSU", "watt": 550}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("case.json"),
        r#"[{"model": "Ref Case", "formFactor": "ATX", "gpuMaxLength": 350}]"#,
    )
    .unwrap();
    tmp
}

fn reference_build_args<'a>(gpu: &'a str, psu: &'a str) -> Vec<&'a str> {
    vec![
        "--catalog", "parts", "--cpu", "Ref CPU", "--board", "Ref Board", "--ram", "Ref RAM",
        "--gpu", gpu, "--psu", psu, "--case", "Ref Case",
    ]
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compatibility"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rigcheck"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rigcheck"));
}

// ============================================================================
// Check Command Tests
// ============================================================================

#[test]
fn test_check_reference_build_is_compatible() {
    let tmp = setup_reference_catalog();
    rigcheck(&tmp)
        .arg("check")
        .args(reference_build_args("Ref GPU", "Ref PSU"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Compatible"))
        .stdout(predicate::str::contains("500W"));
}

#[test]
fn test_check_reference_build_json() {
    let tmp = setup_reference_catalog();
    let output = rigcheck(&tmp)
        .args(["check", "--format", "json"])
        .args(reference_build_args("Ref GPU", "Ref PSU"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["compatible"], true);
    assert_eq!(report["power"]["recommended_w"], 500);
    assert_eq!(report["findings"].as_array().unwrap().len(), 0);
    assert_eq!(report["parts"].as_array().unwrap().len(), 6);
}

#[test]
fn test_check_long_gpu_gives_one_clearance_finding() {
    let tmp = setup_reference_catalog();
    let output = rigcheck(&tmp)
        .args(["check", "-f", "json"])
        .args(reference_build_args("Long GPU", "Ref PSU"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["compatible"], false);
    let findings = report["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["rule"], "gpu-clearance");
    assert_eq!(findings[0]["severity"], "blocking");
    assert_eq!(findings[0]["categories"], serde_json::json!(["case", "gpu"]));
}

#[test]
fn test_check_strict_fails_on_blocking_finding() {
    let tmp = setup_reference_catalog();
    rigcheck(&tmp)
        .args(["check", "--strict"])
        .args(reference_build_args("Ref GPU", "Small PSU"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("below the recommended 500W"))
        .stderr(predicate::str::contains("blocking"));
}

#[test]
fn test_check_skip_rule() {
    let tmp = setup_reference_catalog();
    rigcheck(&tmp)
        .args(["check", "--strict", "--skip-rule", "power-margin"])
        .args(reference_build_args("Ref GPU", "Small PSU"))
        .assert()
        .success();
}

#[test]
fn test_check_socket_mismatch_with_builtin_catalog() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args([
            "check",
            "--cpu",
            "Ryzen 5 5600",
            "--board",
            "B650 AORUS ELITE AX",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("uses socket AM4"))
        .stdout(predicate::str::contains("has socket AM5"));
}

#[test]
fn test_check_findings_as_ids() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args([
            "check",
            "-f",
            "id",
            "--board",
            "MAG B550 TOMAHAWK",
            "--ram",
            "Fury Beast 32GB DDR5-6000",
        ])
        .assert()
        .success()
        .stdout("ram-type-match\n");
}

#[test]
fn test_check_unknown_model_fails() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["check", "--cpu", "Ryzen 9 9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown CPU model"));
}

#[test]
fn test_check_build_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("build.yaml"),
        "cpu: Ryzen 5 7600\nmobo: B650 AORUS ELITE AX\nram: Fury Beast 32GB DDR5-6000\ngpu: none\n",
    )
    .unwrap();

    rigcheck(&tmp)
        .args(["check", "--strict", "--build", "build.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compatible"));

    // A flag overrides the file entry
    rigcheck(&tmp)
        .args(["check", "--strict", "--build", "build.yaml", "--cpu", "Ryzen 5 5600"])
        .assert()
        .failure();
}

#[test]
fn test_check_nothing_selected() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No parts selected"));
}

// ============================================================================
// Catalog Loading Tests
// ============================================================================

#[test]
fn test_missing_catalog_dir_fails() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["check", "--catalog", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Catalog directory not found"));
}

#[test]
fn test_catalog_syntax_error_is_reported() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("parts");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("cpu.json"), "[\n  {\"model\": }\n]").unwrap();

    rigcheck(&tmp)
        .args(["check", "--catalog", "parts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON syntax error"));
}

#[test]
fn test_missing_category_file_is_empty() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("parts");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("cpu.json"), r#"[{"model": "Only CPU"}]"#).unwrap();

    rigcheck(&tmp)
        .args(["options", "gpu", "--catalog", "parts", "-f", "id"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_catalog_from_environment() {
    let tmp = setup_reference_catalog();
    rigcheck(&tmp)
        .env("RIGCHECK_CATALOG", "parts")
        .args(["options", "cpu", "-f", "id"])
        .assert()
        .success()
        .stdout("Ref CPU\n");
}

// ============================================================================
// Power Command Tests
// ============================================================================

#[test]
fn test_power_quiet_prints_recommendation() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args([
            "power",
            "-q",
            "--cpu",
            "Ryzen 5 5600",
            "--gpu",
            "GeForce RTX 4070 SUPER",
            "--ram",
            "Ripjaws V 32GB DDR4-3600",
        ])
        .assert()
        .success()
        .stdout("500\n");
}

#[test]
fn test_power_empty_selection() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["power", "-q"])
        .assert()
        .success()
        .stdout("150\n");
}

#[test]
fn test_power_lists_suitable_psus() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args([
            "power",
            "-f",
            "id",
            "--cpu",
            "Ryzen 5 5600",
            "--gpu",
            "GeForce RTX 4070 SUPER",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Focus GX-550"))
        .stdout(predicate::str::contains("HX1200i"))
        .stdout(predicate::str::contains("MWE 450 Bronze").not());
}

#[test]
fn test_power_json_reports_selected_psu() {
    let tmp = setup_reference_catalog();
    let output = rigcheck(&tmp)
        .args(["power", "-f", "json"])
        .args(reference_build_args("Ref GPU", "Small PSU"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["recommended_w"], 500);
    assert_eq!(report["estimated_load_w"], 370.0);
    assert_eq!(report["psu"]["sufficient"], false);
    assert_eq!(report["suitable_psus"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Options Command Tests
// ============================================================================

#[test]
fn test_options_case_restricts_gpus() {
    let tmp = TempDir::new().unwrap();
    let output = rigcheck(&tmp)
        .args(["options", "gpu", "--case", "Meshify C", "-f", "id"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let models: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        models,
        vec!["GeForce RTX 4060", "Radeon RX 7600", "GeForce RTX 4070 SUPER"]
    );
}

#[test]
fn test_options_cpu_restricts_boards() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["options", "mobo", "--cpu", "Ryzen 5 7600", "-f", "id"])
        .assert()
        .success()
        .stdout("B650 AORUS ELITE AX\nROG STRIX B650E-I\n");
}

#[test]
fn test_options_all_shows_conflicts() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["options", "gpu", "--case", "Meshify C", "--all", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("model,details,status,reason"))
        .stdout(predicate::str::contains("conflict"))
        .stdout(predicate::str::contains("does not fit in case (Meshify C)"));
}

#[test]
fn test_options_summary_covers_every_category() {
    let tmp = TempDir::new().unwrap();
    let output = rigcheck(&tmp)
        .args(["options", "--cpu", "Ryzen 5 7600", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary = stdout_json(&output);
    let rows = summary.as_array().unwrap();
    assert_eq!(rows.len(), 6);
    let board = rows.iter().find(|r| r["category"] == "board").unwrap();
    assert_eq!(board["compatible"], 2);
    assert_eq!(board["total"], 6);
}

#[test]
fn test_options_unknown_category_fails() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["options", "cooler"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category"));
}

// ============================================================================
// Estimate Command Tests
// ============================================================================

#[test]
fn test_estimate_closest_builtin() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["estimate", "closest", "--budget", "1000", "--use-case", "gaming", "-f", "id"])
        .assert()
        .success()
        .stdout("1440p high settings\n");
}

#[test]
fn test_estimate_closest_card() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["estimate", "closest", "--budget", "700", "-u", "office"])
        .assert()
        .success()
        .stdout(predicate::str::contains("B760M DS3H DDR4"))
        .stdout(predicate::str::contains("100 under budget"));
}

#[test]
fn test_estimate_closest_check() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["estimate", "closest", "--budget", "3000", "-u", "gaming", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GeForce RTX 4090"))
        .stdout(predicate::str::contains("Compatible"));
}

#[test]
fn test_estimate_invalid_budget_fails() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["estimate", "closest", "--budget", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid budget"));
}

#[test]
fn test_estimate_unknown_use_case() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["estimate", "closest", "--budget", "1000", "-u", "server"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No estimates for use-case 'server'"))
        .stdout(predicate::str::contains("gaming, office"));
}

#[test]
fn test_estimate_range() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["estimate", "range", "--min", "500", "--max", "900", "-f", "id"])
        .assert()
        .success()
        .stdout("Documents, browsing and video calls\nOffice work with light photo editing\n");
}

#[test]
fn test_estimate_range_inverted_is_empty() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["estimate", "range", "--min", "900", "--max", "500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No estimates priced between 900 and 500"));
}

#[test]
fn test_estimate_flat_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("estimates.json"),
        r#"[
            {"name": "Budget", "totalPrice": 700, "parts": [{"category": "cpu", "name": "X"}]},
            {"name": "Mid", "totalPrice": 1200, "parts": []},
            {"name": "High", "totalPrice": 2000, "parts": []}
        ]"#,
    )
    .unwrap();

    rigcheck(&tmp)
        .args([
            "estimate",
            "closest",
            "--estimates",
            "estimates.json",
            "--budget",
            "1500",
            "-f",
            "id",
        ])
        .assert()
        .success()
        .stdout("Mid\n");
}

#[test]
fn test_estimate_default_use_case_from_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("rigcheck.yaml"), "default_use_case: office\n").unwrap();

    rigcheck(&tmp)
        .args(["estimate", "closest", "--budget", "5000", "-f", "id"])
        .assert()
        .success()
        .stdout("Office work with light photo editing\n");
}

// ============================================================================
// Rules & Config Command Tests
// ============================================================================

#[test]
fn test_rules_list_ids() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["rules", "-f", "id"])
        .assert()
        .success()
        .stdout(
            "socket-match\nram-type-match\nform-factor-fit\ngpu-clearance\npower-margin\nincomplete-data\n",
        );
}

#[test]
fn test_format_from_environment() {
    let tmp = TempDir::new().unwrap();
    let output = rigcheck(&tmp)
        .env("RIGCHECK_FORMAT", "json")
        .arg("rules")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output).as_array().unwrap().len(), 6);
}

#[test]
fn test_config_show_key_from_local_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("rigcheck.yaml"), "catalog_dir: my-parts\n").unwrap();

    rigcheck(&tmp)
        .args(["config", "show", "catalog_dir"])
        .assert()
        .success()
        .stdout("my-parts\n");
}

#[test]
fn test_config_flag_overrides_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("rigcheck.yaml"), "catalog_dir: my-parts\n").unwrap();

    rigcheck(&tmp)
        .args(["config", "show", "catalog_dir", "--catalog", "other"])
        .assert()
        .success()
        .stdout("other\n");
}

#[test]
fn test_config_show_unknown_key_fails() {
    let tmp = TempDir::new().unwrap();
    rigcheck(&tmp)
        .args(["config", "show", "author"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_invalid_default_format_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("rigcheck.yaml"), "default_format: xml\n").unwrap();

    rigcheck(&tmp)
        .arg("rules")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid default_format"));
}
