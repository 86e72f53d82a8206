//! Multi-class classification metrics over resolved labels
//!
//! Confusion matrix, per-class precision/recall/F1 with zero-division
//! falling back to 0.0, macro and support-weighted averages, and an
//! sklearn-shaped text report. Classes are the sorted union of labels seen
//! in either sequence.

use std::fmt;

use crate::label::Label;

/// Confusion matrix: element `[i][j]` counts rows with true class `i`
/// predicted as class `j`.
#[derive(Clone, Debug)]
pub struct ConfusionMatrix {
    classes: Vec<Label>,
    matrix: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Build from index-aligned label sequences. Classes are the sorted
    /// union of both sides, so a label only ever predicted (or only ever
    /// expected) still gets a row and column.
    pub fn from_labels(y_true: &[Label], y_pred: &[Label]) -> Self {
        let mut classes: Vec<Label> = Vec::new();
        for label in y_true.iter().chain(y_pred.iter()) {
            if !classes.contains(label) {
                classes.push(label.clone());
            }
        }
        classes.sort_by(|a, b| a.long_name().cmp(b.long_name()));

        let n = classes.len();
        let mut matrix = vec![vec![0usize; n]; n];
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            let ti = classes.iter().position(|c| c == t).unwrap_or(0);
            let pi = classes.iter().position(|c| c == p).unwrap_or(0);
            matrix[ti][pi] += 1;
        }

        Self { classes, matrix }
    }

    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Count at `[true_class][predicted_class]`.
    pub fn get(&self, true_class: usize, predicted_class: usize) -> usize {
        self.matrix[true_class][predicted_class]
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.matrix[class][class]
    }

    /// Predicted as `class` but wasn't.
    pub fn false_positives(&self, class: usize) -> usize {
        (0..self.n_classes())
            .filter(|&i| i != class)
            .map(|i| self.matrix[i][class])
            .sum()
    }

    /// Was `class` but predicted differently.
    pub fn false_negatives(&self, class: usize) -> usize {
        (0..self.n_classes())
            .filter(|&j| j != class)
            .map(|j| self.matrix[class][j])
            .sum()
    }

    /// Total true instances of a class.
    pub fn support(&self, class: usize) -> usize {
        self.matrix[class].iter().sum()
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes()).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.long_name().len())
            .max()
            .unwrap_or(0)
            .max(6);

        write!(f, "{:>width$} ", "", width = width + 5)?;
        for class in &self.classes {
            write!(f, "{:>width$} ", class.long_name(), width = width)?;
        }
        writeln!(f)?;

        for (i, class) in self.classes.iter().enumerate() {
            write!(f, "True {:>width$} ", class.long_name(), width = width)?;
            for j in 0..self.n_classes() {
                write!(f, "{:>width$} ", self.matrix[i][j], width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Per-class precision/recall/F1 derived from a confusion matrix.
#[derive(Clone, Debug)]
pub struct ClassMetrics {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub f1: Vec<f64>,
    pub support: Vec<usize>,
}

impl ClassMetrics {
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let n = cm.n_classes();
        let mut precision = Vec::with_capacity(n);
        let mut recall = Vec::with_capacity(n);
        let mut f1 = Vec::with_capacity(n);
        let mut support = Vec::with_capacity(n);

        for class in 0..n {
            let tp = cm.true_positives(class) as f64;
            let fp = cm.false_positives(class) as f64;
            let fn_ = cm.false_negatives(class) as f64;

            let p = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
            let r = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
            let f = if p + r > 0.0 {
                2.0 * p * r / (p + r)
            } else {
                0.0
            };

            precision.push(p);
            recall.push(r);
            f1.push(f);
            support.push(cm.support(class));
        }

        Self {
            precision,
            recall,
            f1,
            support,
        }
    }

    pub fn macro_avg(values: &[f64]) -> f64 {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    pub fn weighted_avg(&self, values: &[f64]) -> f64 {
        let total: usize = self.support.iter().sum();
        if total == 0 {
            return 0.0;
        }
        values
            .iter()
            .zip(self.support.iter())
            .map(|(&v, &s)| v * s as f64)
            .sum::<f64>()
            / total as f64
    }
}

/// Generate an sklearn-style classification report.
pub fn classification_report(cm: &ConfusionMatrix) -> String {
    let metrics = ClassMetrics::from_confusion_matrix(cm);
    let name_width = cm
        .classes()
        .iter()
        .map(|c| c.long_name().len())
        .max()
        .unwrap_or(0)
        .max("weighted avg".len());

    let mut report = String::new();
    report.push_str(&format!(
        "{:>name_width$} {:>10} {:>10} {:>10} {:>10}\n",
        "", "precision", "recall", "f1-score", "support"
    ));
    report.push_str(&"-".repeat(name_width + 44));
    report.push('\n');

    for (i, class) in cm.classes().iter().enumerate() {
        report.push_str(&format!(
            "{:>name_width$} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
            class.long_name(),
            metrics.precision[i],
            metrics.recall[i],
            metrics.f1[i],
            metrics.support[i]
        ));
    }

    report.push_str(&"-".repeat(name_width + 44));
    report.push('\n');

    let total_support: usize = metrics.support.iter().sum();
    report.push_str(&format!(
        "{:>name_width$} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
        "macro avg",
        ClassMetrics::macro_avg(&metrics.precision),
        ClassMetrics::macro_avg(&metrics.recall),
        ClassMetrics::macro_avg(&metrics.f1),
        total_support
    ));
    report.push_str(&format!(
        "{:>name_width$} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
        "weighted avg",
        metrics.weighted_avg(&metrics.precision),
        metrics.weighted_avg(&metrics.recall),
        metrics.weighted_avg(&metrics.f1),
        total_support
    ));

    report.push_str(&format!("\nAccuracy: {:.4}\n", cm.accuracy()));
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<Label> {
        names.iter().map(|n| Label::resolve(n)).collect()
    }

    #[test]
    fn test_confusion_matrix_counts() {
        let y_true = labels(&["Normal", "Normal", "Arc", "Arc", "Off"]);
        let y_pred = labels(&["Normal", "Arc", "Arc", "Arc", "Off"]);
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred);

        // Classes sorted by long name: Arc Flash, Normal, Off Contact
        assert_eq!(cm.n_classes(), 3);
        assert_eq!(cm.classes()[0], Label::ArcFlash);
        assert_eq!(cm.get(0, 0), 2); // Arc predicted Arc
        assert_eq!(cm.get(1, 0), 1); // Normal predicted Arc
        assert_eq!(cm.get(1, 1), 1);
        assert_eq!(cm.get(2, 2), 1);
        assert_eq!(cm.total(), 5);
    }

    #[test]
    fn test_confusion_matrix_tp_fp_fn() {
        let y_true = labels(&["Normal", "Normal", "Arc", "Arc"]);
        let y_pred = labels(&["Normal", "Arc", "Arc", "Normal"]);
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred);

        let arc = 0;
        assert_eq!(cm.true_positives(arc), 1);
        assert_eq!(cm.false_positives(arc), 1);
        assert_eq!(cm.false_negatives(arc), 1);
        assert_eq!(cm.support(arc), 2);
    }

    #[test]
    fn test_accuracy_from_diagonal() {
        let y_true = labels(&["Normal", "Arc", "Off", "Arc"]);
        let y_pred = labels(&["Normal", "Arc", "Off", "Normal"]);
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred);
        assert!((cm.accuracy() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs_accuracy_zero() {
        let cm = ConfusionMatrix::from_labels(&[], &[]);
        assert_eq!(cm.accuracy(), 0.0);
        assert_eq!(cm.n_classes(), 0);
    }

    #[test]
    fn test_class_only_in_predictions_still_counted() {
        let y_true = labels(&["Normal", "Normal"]);
        let y_pred = labels(&["Normal", "Arc"]);
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred);
        assert_eq!(cm.n_classes(), 2);
        // Arc has zero support but a false positive
        assert_eq!(cm.support(0), 0);
        assert_eq!(cm.false_positives(0), 1);
    }

    #[test]
    fn test_perfect_predictions() {
        let y = labels(&["Normal", "Arc", "Off"]);
        let cm = ConfusionMatrix::from_labels(&y, &y);
        let m = ClassMetrics::from_confusion_matrix(&cm);
        for i in 0..3 {
            assert_eq!(m.precision[i], 1.0);
            assert_eq!(m.recall[i], 1.0);
            assert_eq!(m.f1[i], 1.0);
        }
        assert_eq!(cm.accuracy(), 1.0);
    }

    #[test]
    fn test_zero_division_yields_zero_not_nan() {
        // Off is never predicted: precision undefined -> 0.0
        let y_true = labels(&["Off", "Off"]);
        let y_pred = labels(&["Normal", "Normal"]);
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred);
        let m = ClassMetrics::from_confusion_matrix(&cm);
        for values in [&m.precision, &m.recall, &m.f1] {
            assert!(values.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_weighted_avg_weights_by_support() {
        let y_true = labels(&["Normal", "Normal", "Normal", "Arc"]);
        let y_pred = labels(&["Normal", "Normal", "Normal", "Normal"]);
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred);
        let m = ClassMetrics::from_confusion_matrix(&cm);

        // Normal recall 1.0 with support 3, Arc recall 0.0 with support 1
        let weighted = m.weighted_avg(&m.recall);
        assert!((weighted - 0.75).abs() < 1e-9);
        let macro_r = ClassMetrics::macro_avg(&m.recall);
        assert!((macro_r - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_report_contains_classes_and_averages() {
        let y_true = labels(&["Normal", "Arc", "Off", "Arc"]);
        let y_pred = labels(&["Normal", "Arc", "Off", "Normal"]);
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred);
        let report = classification_report(&cm);
        assert!(report.contains("precision"));
        assert!(report.contains("Arc Flash"));
        assert!(report.contains("Off Contact"));
        assert!(report.contains("macro avg"));
        assert!(report.contains("weighted avg"));
        assert!(report.contains("Accuracy: 0.7500"));
    }

    #[test]
    fn test_display_grid_shows_counts() {
        let y_true = labels(&["Normal", "Arc"]);
        let y_pred = labels(&["Normal", "Normal"]);
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred);
        let grid = cm.to_string();
        assert!(grid.contains("True"));
        assert!(grid.contains("Arc Flash"));
    }
}
