//! Report rendering: text tables on stdout, CSV files on disk
//!
//! Table shapes follow the lab's long-standing report layout: a
//! per-scenario accuracy table with a grand-total row, a delay table with
//! `(no data)` placeholders for keys that never resolved, the
//! classification report, and the confusion matrix grid.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::aggregate::{AccuracyTracker, DelayAggregator, DelayUnits};
use crate::batch::BatchReport;
use crate::csv_output::{
    CsvAccuracyOutput, CsvAccuracyRow, CsvClassOutput, CsvClassRow, CsvDelayOutput, CsvDelayRow,
    CsvMatrixOutput,
};
use crate::metrics::{classification_report, ClassMetrics, ConfusionMatrix};

const NO_DATA: &str = "(no data)";

fn units_label(units: DelayUnits) -> &'static str {
    match units {
        DelayUnits::Rows => "rows",
        DelayUnits::Seconds => "seconds",
    }
}

/// Render the per-scenario accuracy table with a grand-total row.
pub fn render_accuracy(accuracy: &AccuracyTracker) -> String {
    let mut out = String::from("--- Accuracy per Scenario ---\n");
    out.push_str(&format!(
        "{:<24} {:>10} {:>10} {:>10} {:>13}\n",
        "Scenario", "Total", "Correct", "Incorrect", "Accuracy (%)"
    ));
    out.push_str(&"-".repeat(72));
    out.push('\n');

    for (name, tally) in accuracy.scenarios() {
        out.push_str(&format!(
            "{:<24} {:>10} {:>10} {:>10} {:>13.2}\n",
            name,
            tally.total,
            tally.correct,
            tally.incorrect(),
            tally.percent()
        ));
    }

    out.push_str(&"-".repeat(72));
    out.push('\n');
    let overall = accuracy.overall();
    out.push_str(&format!(
        "{:<24} {:>10} {:>10} {:>10} {:>13.2}\n",
        "TOTAL",
        overall.total,
        overall.correct,
        overall.incorrect(),
        overall.percent()
    ));
    out
}

/// Render the per-transition delay table.
pub fn render_delays(delays: &DelayAggregator, units: DelayUnits, count_missing: bool) -> String {
    let unit = units_label(units);
    let mut out = String::from("--- Detection Delay Analysis ---\n");
    out.push_str(&format!(
        "{:<20} | {:>6} | {:>14} | {:>14} | {:>14} | {:>7}\n",
        "Transition",
        "Tests",
        format!("Mean ({unit})"),
        format!("Min ({unit})"),
        format!("Max ({unit})"),
        "Missing"
    ));
    out.push_str(&"-".repeat(90));
    out.push('\n');

    for key in delays.keys() {
        let found = delays.found_count(key);
        let missing = delays.missing_count(key);
        let tests = if count_missing { found + missing } else { found };
        match delays.stats(key, units) {
            Some(stats) => out.push_str(&format!(
                "{:<20} | {:>6} | {:>14.3} | {:>14.3} | {:>14.3} | {:>7}\n",
                key.to_string(),
                tests,
                stats.mean,
                stats.min,
                stats.max,
                missing
            )),
            None => out.push_str(&format!(
                "{:<20} | {:>6} | {:>14} | {:>14} | {:>14} | {:>7}\n",
                key.to_string(),
                tests,
                NO_DATA,
                NO_DATA,
                NO_DATA,
                missing
            )),
        }
    }
    out.push_str(&"-".repeat(90));
    out.push('\n');
    out
}

/// Render the full text report for one batch run.
pub fn render_text(report: &BatchReport, units: DelayUnits, count_missing: bool) -> String {
    let mut out = String::new();
    out.push_str(&render_accuracy(&report.accuracy));
    out.push('\n');

    if !report.delays.is_empty() {
        out.push_str(&render_delays(&report.delays, units, count_missing));
        out.push('\n');
    }

    if !report.expected.is_empty() {
        let cm = ConfusionMatrix::from_labels(&report.expected, &report.actual);
        out.push_str("--- Classification Report per Class ---\n");
        out.push_str(&classification_report(&cm));
        out.push('\n');
        out.push_str("--- Confusion Matrix ---\n");
        out.push_str(&cm.to_string());
    } else {
        out.push_str("No rows processed; classification report not produced.\n");
    }

    if !report.skipped.is_empty() {
        out.push_str(&format!("\nSkipped units: {}\n", report.skipped.len()));
        for diagnostic in &report.skipped {
            out.push_str(&format!("  - {diagnostic}\n"));
        }
    }
    out
}

fn accuracy_csv(accuracy: &AccuracyTracker) -> String {
    let mut output = CsvAccuracyOutput::new();
    for (name, tally) in accuracy.scenarios() {
        output.add_row(CsvAccuracyRow {
            scenario: name.clone(),
            total: tally.total,
            correct: tally.correct,
            incorrect: tally.incorrect(),
            percent: tally.percent(),
        });
    }
    let overall = accuracy.overall();
    output.add_row(CsvAccuracyRow {
        scenario: "TOTAL".to_string(),
        total: overall.total,
        correct: overall.correct,
        incorrect: overall.incorrect(),
        percent: overall.percent(),
    });
    output.to_csv()
}

fn delay_csv(delays: &DelayAggregator, units: DelayUnits, count_missing: bool) -> String {
    let mut output = CsvDelayOutput::new();
    for key in delays.keys() {
        let stats = delays.stats(key, units);
        let found = delays.found_count(key);
        let missing = delays.missing_count(key);
        output.add_row(CsvDelayRow {
            transition: key.to_string(),
            observations: if count_missing { found + missing } else { found },
            missing,
            mean: stats.as_ref().map(|s| s.mean),
            min: stats.as_ref().map(|s| s.min),
            max: stats.as_ref().map(|s| s.max),
        });
    }
    output.to_csv(units_label(units))
}

fn class_csv(cm: &ConfusionMatrix) -> String {
    let metrics = ClassMetrics::from_confusion_matrix(cm);
    let mut output = CsvClassOutput::new();
    for (i, class) in cm.classes().iter().enumerate() {
        output.add_row(CsvClassRow {
            class: class.long_name().to_string(),
            precision: metrics.precision[i],
            recall: metrics.recall[i],
            f1: metrics.f1[i],
            support: metrics.support[i],
        });
    }
    output.to_csv()
}

fn matrix_csv(cm: &ConfusionMatrix) -> String {
    CsvMatrixOutput::new(
        cm.classes().iter().map(|c| c.long_name().to_string()).collect(),
        (0..cm.n_classes())
            .map(|i| (0..cm.n_classes()).map(|j| cm.get(i, j)).collect())
            .collect(),
    )
    .to_csv()
}

/// Render all tables as one CSV stream, sections separated by comment lines.
pub fn render_csv(report: &BatchReport, units: DelayUnits, count_missing: bool) -> String {
    let cm = ConfusionMatrix::from_labels(&report.expected, &report.actual);
    format!(
        "# accuracy\n{}\n# delays\n{}\n# classification\n{}\n# confusion\n{}",
        accuracy_csv(&report.accuracy),
        delay_csv(&report.delays, units, count_missing),
        class_csv(&cm),
        matrix_csv(&cm)
    )
}

/// Write the four CSV report files under `dir`, creating it if needed.
/// Returns the written paths.
pub fn export_csv(
    report: &BatchReport,
    units: DelayUnits,
    count_missing: bool,
    dir: &Path,
) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let cm = ConfusionMatrix::from_labels(&report.expected, &report.actual);

    let files = [
        ("accuracy_report.csv", accuracy_csv(&report.accuracy)),
        (
            "delay_report.csv",
            delay_csv(&report.delays, units, count_missing),
        ),
        ("classification_report.csv", class_csv(&cm)),
        ("confusion_matrix.csv", matrix_csv(&cm)),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = dir.join(name);
        fs::write(&path, contents)?;
        written.push(path);
    }
    Ok(written)
}
