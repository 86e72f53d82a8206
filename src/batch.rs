//! Batch runner: enumerate trial files, load, aggregate
//!
//! Single-threaded, fixed enumeration order. A missing folder, missing
//! file, or malformed trial is skipped with a recorded diagnostic and a
//! warning; only a missing input root aborts the run, before any
//! processing. All accumulation lives in the returned [`BatchReport`].

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::aggregate::{AccuracyTally, AccuracyTracker, DelayAggregator};
use crate::delay;
use crate::label::{Label, TransitionKey};
use crate::transition::Transitions;
use crate::trial::{Trial, TrialError};

/// Dataset layout on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `root/<scenario>/trial_<n>.csv`, single-file column convention.
    Scenarios,
    /// Explicit truth/prediction directory pairs, paired-file convention.
    Pairs,
}

/// One truth/prediction directory pair. File names are the directory's
/// basename plus a variant suffix (`""`, `"1"`, ..).
#[derive(Debug, Clone)]
pub struct PairSpec {
    pub truth: PathBuf,
    pub pred: PathBuf,
}

/// Configuration for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub root: PathBuf,
    pub layout: Layout,
    pub scenarios: Vec<String>,
    pub trials: usize,
    pub pairs: Vec<PairSpec>,
    pub variants: usize,
    /// Count `NotFound` sentinels toward per-key observation totals in
    /// reports. Never affects mean/min/max.
    pub count_missing: bool,
}

impl BatchConfig {
    /// The four canonical transition scenario folders.
    pub fn default_scenarios() -> Vec<String> {
        ["Arc_to_Normal", "Arc_to_Off", "Normal_to_Arc", "Off_to_Arc"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

/// Fatal batch errors. Everything else is a skip diagnostic.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("input directory '{}' does not exist", .0.display())]
    MissingRoot(PathBuf),
}

/// Why a unit was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingFolder,
    MissingFile,
    MissingColumn(String),
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFolder => write!(f, "folder not found"),
            SkipReason::MissingFile => write!(f, "file not found"),
            SkipReason::MissingColumn(col) => write!(f, "missing column '{col}'"),
            SkipReason::Unreadable(msg) => write!(f, "unreadable: {msg}"),
        }
    }
}

/// A skipped unit, collected instead of raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipDiagnostic {
    pub unit: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkipDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.unit, self.reason)
    }
}

/// Everything one batch run produced. Owned by the caller; nothing global.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub accuracy: AccuracyTracker,
    pub delays: DelayAggregator,
    /// Alias-resolved label pairs across all trials, for the confusion
    /// matrix and classification report.
    pub expected: Vec<Label>,
    pub actual: Vec<Label>,
    pub skipped: Vec<SkipDiagnostic>,
    pub trials_processed: usize,
}

impl BatchReport {
    fn skip(&mut self, unit: impl Into<String>, reason: SkipReason) {
        let diagnostic = SkipDiagnostic {
            unit: unit.into(),
            reason,
        };
        warn!("skipping {diagnostic}");
        self.skipped.push(diagnostic);
    }

    fn ingest(&mut self, trial: &Trial) {
        self.accuracy
            .record(&trial.scenario, AccuracyTally::from_trial(trial));

        for row in &trial.rows {
            self.expected.push(Label::resolve(&row.expected));
            self.actual.push(Label::resolve(&row.actual));
        }

        for event in Transitions::new(trial) {
            let observation = delay::resolve(&event, trial);
            self.delays
                .record(TransitionKey::new(event.from, event.to), observation);
        }

        self.trials_processed += 1;
    }
}

/// Run a whole batch over the configured layout.
pub fn run_batch(config: &BatchConfig) -> Result<BatchReport, AnalysisError> {
    if !config.root.exists() {
        return Err(AnalysisError::MissingRoot(config.root.clone()));
    }

    let mut report = BatchReport::default();
    match config.layout {
        Layout::Scenarios => run_scenarios(config, &mut report),
        Layout::Pairs => run_pairs(config, &mut report),
    }
    Ok(report)
}

fn run_scenarios(config: &BatchConfig, report: &mut BatchReport) {
    for scenario in &config.scenarios {
        let folder = config.root.join(scenario);
        if !folder.is_dir() {
            report.skip(scenario.clone(), SkipReason::MissingFolder);
            continue;
        }

        debug!("analyzing scenario folder {scenario}");
        // A scenario with zero contributing rows still gets a 0/0/0 row
        report
            .accuracy
            .record(scenario, AccuracyTally::default());
        for n in 1..=config.trials {
            let path = folder.join(format!("trial_{n}.csv"));
            if !path.is_file() {
                report.skip(display_unit(&path), SkipReason::MissingFile);
                continue;
            }
            match Trial::from_csv_file(scenario, &path) {
                Ok(trial) => report.ingest(&trial),
                Err(err) => report.skip(display_unit(&path), skip_reason(err)),
            }
        }
    }
}

fn run_pairs(config: &BatchConfig, report: &mut BatchReport) {
    for pair in &config.pairs {
        let truth_dir = config.root.join(&pair.truth);
        let pred_dir = config.root.join(&pair.pred);
        let scenario = basename(&truth_dir);
        if !truth_dir.is_dir() || !pred_dir.is_dir() {
            report.skip(scenario, SkipReason::MissingFolder);
            continue;
        }

        debug!("analyzing pair {} / {}", truth_dir.display(), pred_dir.display());
        for suffix in variant_suffixes(config.variants) {
            let truth_path = truth_dir.join(format!("{}{suffix}.csv", basename(&truth_dir)));
            let pred_path = pred_dir.join(format!("{}{suffix}.csv", basename(&pred_dir)));
            if !truth_path.is_file() || !pred_path.is_file() {
                report.skip(display_unit(&truth_path), SkipReason::MissingFile);
                continue;
            }
            match Trial::from_paired_files(&scenario, &truth_path, &pred_path) {
                Ok(trial) => report.ingest(&trial),
                Err(err) => report.skip(display_unit(&truth_path), skip_reason(err)),
            }
        }
    }
}

/// `""` for the base capture, then `"1"`..`"N"` for the synthetic variants.
fn variant_suffixes(variants: usize) -> Vec<String> {
    std::iter::once(String::new())
        .chain((1..=variants).map(|i| i.to_string()))
        .collect()
}

fn skip_reason(err: TrialError) -> SkipReason {
    match err {
        TrialError::MissingColumn { column } => SkipReason::MissingColumn(column),
        TrialError::EmptyFile => SkipReason::Unreadable("no header row".to_string()),
        TrialError::Io(e) => SkipReason::Unreadable(e.to_string()),
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn display_unit(path: &Path) -> String {
    path.display().to_string()
}
