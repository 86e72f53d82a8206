// End-to-end CLI tests: build a trial tree in a temp dir, run the binary,
// check the rendered reports.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "Timestamp,Output Sistem Aktual,Output Sistem yang Diharapkan\n";

fn medir() -> Command {
    Command::cargo_bin("medir").unwrap()
}

fn write_trial(dir: &Path, name: &str, rows: &[(&str, &str, &str)]) {
    let mut contents = HEADER.to_string();
    for (stamp, actual, expected) in rows {
        contents.push_str(&format!("{stamp},{actual},{expected}\n"));
    }
    fs::write(dir.join(name), contents).unwrap();
}

fn scenario_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("Normal_to_Arc");
    fs::create_dir(&dir).unwrap();
    write_trial(
        &dir,
        "trial_1.csv",
        &[
            ("2024-03-01 10:00:00.000", "Normal", "Normal"),
            ("2024-03-01 10:00:00.100", "Normal", "Normal"),
            ("2024-03-01 10:00:00.200", "Normal", "Arc"),
            ("2024-03-01 10:00:00.300", "Arc", "Arc"),
        ],
    );
    write_trial(
        &dir,
        "trial_2.csv",
        &[
            ("2024-03-01 11:00:00.000", "Normal", "Normal"),
            ("2024-03-01 11:00:00.100", "Arc", "Arc"),
        ],
    );
    tmp
}

#[test]
fn test_missing_root_aborts_with_clear_message() {
    medir()
        .arg("/nonexistent/medir-input")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_text_report_tables() {
    let tmp = scenario_tree();
    medir()
        .arg(tmp.path())
        .args(["--scenario", "Normal_to_Arc", "--trials", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Accuracy per Scenario ---"))
        .stdout(predicate::str::contains("Normal_to_Arc"))
        .stdout(predicate::str::contains("--- Detection Delay Analysis ---"))
        .stdout(predicate::str::contains("Normal to Arc"))
        .stdout(predicate::str::contains("--- Confusion Matrix ---"));
}

#[test]
fn test_missing_trial_files_are_skipped_not_fatal() {
    let tmp = scenario_tree();
    // Default --trials is 10 but only 2 files exist
    medir()
        .arg(tmp.path())
        .args(["--scenario", "Normal_to_Arc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped units: 8"));
}

#[test]
fn test_missing_column_skips_trial() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("Normal_to_Arc");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("trial_1.csv"), "Voltage,Current\n1,2\n").unwrap();

    medir()
        .arg(tmp.path())
        .args(["--scenario", "Normal_to_Arc", "--trials", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing column"));
}

#[test]
fn test_json_format_produces_valid_document() {
    let tmp = scenario_tree();
    let output = medir()
        .arg(tmp.path())
        .args(["--scenario", "Normal_to_Arc", "--trials", "2", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["trials_processed"], 2);
    assert_eq!(json["delay_units"], "rows");
    assert_eq!(json["scenarios"][0]["scenario"], "Normal_to_Arc");
    assert!(json["delays"].as_array().unwrap().len() >= 1);
}

#[test]
fn test_csv_format_sections() {
    let tmp = scenario_tree();
    medir()
        .arg(tmp.path())
        .args(["--scenario", "Normal_to_Arc", "--trials", "2", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# accuracy"))
        .stdout(predicate::str::contains(
            "scenario,total_rows,correct,incorrect,accuracy_percent",
        ))
        .stdout(predicate::str::contains("# confusion"));
}

#[test]
fn test_output_dir_writes_report_files() {
    let tmp = scenario_tree();
    let out = TempDir::new().unwrap();
    medir()
        .arg(tmp.path())
        .args(["--scenario", "Normal_to_Arc", "--trials", "2", "-o"])
        .arg(out.path())
        .assert()
        .success();

    for name in [
        "accuracy_report.csv",
        "delay_report.csv",
        "classification_report.csv",
        "confusion_matrix.csv",
    ] {
        assert!(out.path().join(name).is_file(), "missing {name}");
    }
}

#[test]
fn test_delay_units_seconds() {
    let tmp = scenario_tree();
    medir()
        .arg(tmp.path())
        .args([
            "--scenario",
            "Normal_to_Arc",
            "--trials",
            "2",
            "--delay-units",
            "seconds",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mean (seconds)"));
}

#[test]
fn test_pairs_layout_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let truth_dir = tmp.path().join("truth run");
    let pred_dir = tmp.path().join("pred run");
    fs::create_dir(&truth_dir).unwrap();
    fs::create_dir(&pred_dir).unwrap();

    fs::write(
        truth_dir.join("truth run.csv"),
        "Timestamp,Hasil_Prediksi\n\
         2024-03-01 10:00:00.000,NORMAL\n\
         2024-03-01 10:00:00.100,ARC FLASH \u{26A0}\n\
         2024-03-01 10:00:00.200,ARC FLASH \u{26A0}\n",
    )
    .unwrap();
    fs::write(
        pred_dir.join("pred run.csv"),
        "Timestamp,Hasil_Prediksi\n\
         2024-03-01 10:00:00.000,NORMAL\n\
         2024-03-01 10:00:00.100,NORMAL\n\
         2024-03-01 10:00:00.200,ARC FLASH \u{26A0}\n",
    )
    .unwrap();

    medir()
        .arg(tmp.path())
        .args(["--layout", "pairs", "--variants", "0", "--truth"])
        .arg("truth run")
        .arg("--pred")
        .arg("pred run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Normal to Arc"))
        .stdout(predicate::str::contains("truth run"));
}

#[test]
fn test_pairs_layout_requires_matching_dirs() {
    let tmp = TempDir::new().unwrap();
    medir()
        .arg(tmp.path())
        .args(["--layout", "pairs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--truth/--pred"));
}

#[test]
fn test_empty_scenario_reports_zero_percent() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("Arc_to_Off")).unwrap();
    medir()
        .arg(tmp.path())
        .args(["--scenario", "Arc_to_Off", "--trials", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TOTAL"))
        .stdout(predicate::str::contains("0.00"));
}
