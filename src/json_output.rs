//! JSON output format for audit reports
//!
//! One document per batch run, for machine parsing of everything the text
//! report shows: per-scenario accuracy, delay statistics, per-class
//! metrics, the confusion matrix, and skipped-unit diagnostics.

use serde::{Deserialize, Serialize};

use crate::aggregate::DelayUnits;
use crate::batch::BatchReport;
use crate::metrics::{ClassMetrics, ConfusionMatrix};

/// Accuracy tally for one scenario (or the grand total)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonAccuracy {
    pub scenario: String,
    pub total_rows: u64,
    pub correct: u64,
    pub incorrect: u64,
    pub accuracy_percent: f64,
}

/// Delay statistics for one canonical transition key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDelay {
    pub transition: String,
    /// Observation count; includes unresolved transitions only when the run
    /// was configured to count them.
    pub observations: usize,
    pub missing: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
}

/// Per-class precision/recall/F1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonClass {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Confusion matrix: `matrix[i][j]` counts true class i predicted as j
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonConfusion {
    pub classes: Vec<String>,
    pub matrix: Vec<Vec<usize>>,
}

/// A unit skipped during the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSkip {
    pub unit: String,
    pub reason: String,
}

/// Top-level report document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub trials_processed: usize,
    pub scenarios: Vec<JsonAccuracy>,
    pub overall: JsonAccuracy,
    pub delay_units: String,
    pub delays: Vec<JsonDelay>,
    pub classes: Vec<JsonClass>,
    pub overall_accuracy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confusion: Option<JsonConfusion>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skipped: Vec<JsonSkip>,
}

impl JsonReport {
    /// Assemble the document from a finished batch run.
    pub fn build(report: &BatchReport, units: DelayUnits, count_missing: bool) -> Self {
        let scenarios = report
            .accuracy
            .scenarios()
            .iter()
            .map(|(name, tally)| JsonAccuracy {
                scenario: name.clone(),
                total_rows: tally.total,
                correct: tally.correct,
                incorrect: tally.incorrect(),
                accuracy_percent: tally.percent(),
            })
            .collect();

        let overall_tally = report.accuracy.overall();
        let overall = JsonAccuracy {
            scenario: "TOTAL".to_string(),
            total_rows: overall_tally.total,
            correct: overall_tally.correct,
            incorrect: overall_tally.incorrect(),
            accuracy_percent: overall_tally.percent(),
        };

        let delays = report
            .delays
            .keys()
            .iter()
            .map(|key| {
                let stats = report.delays.stats(key, units);
                let found = report.delays.found_count(key);
                let missing = report.delays.missing_count(key);
                JsonDelay {
                    transition: key.to_string(),
                    observations: if count_missing { found + missing } else { found },
                    missing,
                    mean: stats.as_ref().map(|s| s.mean),
                    min: stats.as_ref().map(|s| s.min),
                    max: stats.as_ref().map(|s| s.max),
                }
            })
            .collect();

        let cm = ConfusionMatrix::from_labels(&report.expected, &report.actual);
        let class_metrics = ClassMetrics::from_confusion_matrix(&cm);
        let classes = cm
            .classes()
            .iter()
            .enumerate()
            .map(|(i, class)| JsonClass {
                class: class.long_name().to_string(),
                precision: class_metrics.precision[i],
                recall: class_metrics.recall[i],
                f1_score: class_metrics.f1[i],
                support: class_metrics.support[i],
            })
            .collect();

        let confusion = (cm.n_classes() > 0).then(|| JsonConfusion {
            classes: cm
                .classes()
                .iter()
                .map(|c| c.long_name().to_string())
                .collect(),
            matrix: (0..cm.n_classes())
                .map(|i| (0..cm.n_classes()).map(|j| cm.get(i, j)).collect())
                .collect(),
        });

        let skipped = report
            .skipped
            .iter()
            .map(|diag| JsonSkip {
                unit: diag.unit.clone(),
                reason: diag.reason.to_string(),
            })
            .collect();

        JsonReport {
            trials_processed: report.trials_processed,
            scenarios,
            overall,
            delay_units: match units {
                DelayUnits::Rows => "rows".to_string(),
                DelayUnits::Seconds => "seconds".to_string(),
            },
            delays,
            classes,
            overall_accuracy: cm.accuracy(),
            confusion,
            skipped,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AccuracyTally;
    use crate::delay::Delay;
    use crate::label::{Label, TransitionKey};

    fn sample_report() -> BatchReport {
        let mut report = BatchReport::default();
        report.trials_processed = 1;
        report
            .accuracy
            .record("Normal_to_Arc", AccuracyTally { total: 4, correct: 3 });
        report.delays.record(
            TransitionKey::new(Label::Normal, Label::ArcFlash),
            Delay::Found { rows: 1, seconds: None },
        );
        report.delays.record(
            TransitionKey::new(Label::OffContact, Label::ArcFlash),
            Delay::NotFound,
        );
        report.expected = vec![Label::Normal, Label::ArcFlash];
        report.actual = vec![Label::Normal, Label::Normal];
        report
    }

    #[test]
    fn test_build_accuracy_section() {
        let json = JsonReport::build(&sample_report(), DelayUnits::Rows, false);
        assert_eq!(json.scenarios.len(), 1);
        assert_eq!(json.scenarios[0].total_rows, 4);
        assert_eq!(json.overall.correct, 3);
        assert_eq!(json.overall.accuracy_percent, 75.0);
    }

    #[test]
    fn test_unresolved_key_serializes_without_stats() {
        let json = JsonReport::build(&sample_report(), DelayUnits::Rows, false);
        let missing = json
            .delays
            .iter()
            .find(|d| d.transition == "Off to Arc")
            .unwrap();
        assert_eq!(missing.observations, 0);
        assert_eq!(missing.missing, 1);
        assert!(missing.mean.is_none());

        let text = json.to_json().unwrap();
        assert!(text.contains("\"transition\": \"Off to Arc\""));
        assert!(!text.contains("\"mean\": null"));
    }

    #[test]
    fn test_count_missing_changes_observation_totals() {
        let report = sample_report();
        let without = JsonReport::build(&report, DelayUnits::Rows, false);
        let with = JsonReport::build(&report, DelayUnits::Rows, true);
        let find = |json: &JsonReport| {
            json.delays
                .iter()
                .find(|d| d.transition == "Off to Arc")
                .unwrap()
                .observations
        };
        assert_eq!(find(&without), 0);
        assert_eq!(find(&with), 1);
    }

    #[test]
    fn test_roundtrip() {
        let json = JsonReport::build(&sample_report(), DelayUnits::Seconds, false);
        let text = json.to_json().unwrap();
        let parsed: JsonReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.delay_units, "seconds");
        assert_eq!(parsed.trials_processed, 1);
    }

    #[test]
    fn test_empty_report_has_no_confusion_section() {
        let report = BatchReport::default();
        let json = JsonReport::build(&report, DelayUnits::Rows, false);
        assert!(json.confusion.is_none());
        assert!(json.classes.is_empty());
    }
}
