//! Trial loading: ordered (expected, actual) label rows from CSV logs
//!
//! Two capture conventions exist in the field:
//!
//! - single-file: one CSV per trial with the expected and actual output
//!   columns side by side, plus an optional `Timestamp` column
//! - paired-file: a ground-truth CSV and a prediction CSV, each carrying a
//!   `Hasil_Prediksi` column, joined by row index
//!
//! Cells are whitespace-trimmed at load. Timestamps parse strictly as
//! `%Y-%m-%d %H:%M:%S.%f`; a cell that fails to parse becomes `None` and is
//! excluded from time-based delay analysis only.

use chrono::NaiveDateTime;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Expected-output column in single-file trials.
pub const EXPECTED_COLUMN: &str = "Output Sistem yang Diharapkan";
/// Actual-output column in single-file trials.
pub const ACTUAL_COLUMN: &str = "Output Sistem Aktual";
/// Label column shared by both files of a paired trial.
pub const PREDICTION_COLUMN: &str = "Hasil_Prediksi";
/// Optional timestamp column, either convention.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
/// Strict timestamp format; anything else coerces to `None`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Errors for trial loading
#[derive(Error, Debug)]
pub enum TrialError {
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("file has no header row")]
    EmptyFile,

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrialError>;

/// One ordered observation: what the system should have said vs what it said.
///
/// `expected_at`/`actual_at` differ only for paired trials, where the truth
/// and prediction files carry their own clocks.
#[derive(Debug, Clone)]
pub struct Row {
    pub expected: String,
    pub actual: String,
    pub expected_at: Option<NaiveDateTime>,
    pub actual_at: Option<NaiveDateTime>,
}

/// A named, ordered label sequence from one trial file (or file pair).
/// Immutable after load.
#[derive(Debug, Clone)]
pub struct Trial {
    pub scenario: String,
    pub name: String,
    pub rows: Vec<Row>,
}

impl Trial {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Load a single-file trial (expected + actual columns in one CSV).
    pub fn from_csv_file(scenario: &str, path: &Path) -> Result<Trial> {
        let records = read_records(path)?;
        let (header, body) = records.split_first().ok_or(TrialError::EmptyFile)?;

        let expected_col = find_column(header, EXPECTED_COLUMN)?;
        let actual_col = find_column(header, ACTUAL_COLUMN)?;
        let ts_col = find_column(header, TIMESTAMP_COLUMN).ok();

        let rows = body
            .iter()
            .map(|record| {
                let at = ts_col.and_then(|col| parse_timestamp(cell(record, col)));
                Row {
                    expected: cell(record, expected_col).to_string(),
                    actual: cell(record, actual_col).to_string(),
                    expected_at: at,
                    actual_at: at,
                }
            })
            .collect();

        Ok(Trial {
            scenario: scenario.to_string(),
            name: file_name(path),
            rows,
        })
    }

    /// Load a paired trial: truth file supplies expected labels, prediction
    /// file supplies actual labels, joined by row index. The shorter file
    /// bounds the joined length.
    pub fn from_paired_files(scenario: &str, truth_path: &Path, pred_path: &Path) -> Result<Trial> {
        let truth = read_records(truth_path)?;
        let pred = read_records(pred_path)?;
        let (truth_header, truth_body) = truth.split_first().ok_or(TrialError::EmptyFile)?;
        let (pred_header, pred_body) = pred.split_first().ok_or(TrialError::EmptyFile)?;

        let truth_col = find_column(truth_header, PREDICTION_COLUMN)?;
        let pred_col = find_column(pred_header, PREDICTION_COLUMN)?;
        let truth_ts = find_column(truth_header, TIMESTAMP_COLUMN).ok();
        let pred_ts = find_column(pred_header, TIMESTAMP_COLUMN).ok();

        let rows = truth_body
            .iter()
            .zip(pred_body.iter())
            .map(|(t, p)| Row {
                expected: cell(t, truth_col).to_string(),
                actual: cell(p, pred_col).to_string(),
                expected_at: truth_ts.and_then(|col| parse_timestamp(cell(t, col))),
                actual_at: pred_ts.and_then(|col| parse_timestamp(cell(p, col))),
            })
            .collect();

        Ok(Trial {
            scenario: scenario.to_string(),
            name: file_name(truth_path),
            rows,
        })
    }
}

/// Parse a timestamp cell; unparsable values coerce to `None`.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT).ok()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Header lookup with trimmed comparison (logged headers often carry
/// trailing spaces).
fn find_column(header: &[String], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| TrialError::MissingColumn {
            column: name.to_string(),
        })
}

/// Cell access tolerant of ragged records.
fn cell(record: &[String], col: usize) -> &str {
    record.get(col).map_or("", String::as_str)
}

fn read_records(path: &Path) -> Result<Vec<Vec<String>>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_records(&text))
}

/// Minimal RFC-4180 record parser: quoted fields, doubled quotes, CR/LF.
/// Fields are whitespace-trimmed.
pub fn parse_records(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(take_field(&mut field)),
                '\r' => {}
                '\n' => {
                    record.push(take_field(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(take_field(&mut field));
        records.push(record);
    }

    // Drop fully blank trailing records
    records.retain(|r| !(r.len() == 1 && r[0].is_empty()));
    records
}

fn take_field(field: &mut String) -> String {
    let value = field.trim().to_string();
    field.clear();
    value
}
