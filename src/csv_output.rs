//! CSV output format for audit reports
//!
//! Machine-readable export of the accuracy, delay, classification and
//! confusion tables for spreadsheet analysis.

/// CSV record for one scenario's accuracy tally
#[derive(Debug, Clone)]
pub struct CsvAccuracyRow {
    pub scenario: String,
    pub total: u64,
    pub correct: u64,
    pub incorrect: u64,
    pub percent: f64,
}

/// CSV accuracy table formatter
#[derive(Debug, Default)]
pub struct CsvAccuracyOutput {
    rows: Vec<CsvAccuracyRow>,
}

impl CsvAccuracyOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: CsvAccuracyRow) {
        self.rows.push(row);
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::from("scenario,total_rows,correct,incorrect,accuracy_percent\n");
        for row in &self.rows {
            output.push_str(&format!(
                "{},{},{},{},{:.2}\n",
                escape_field(&row.scenario),
                row.total,
                row.correct,
                row.incorrect,
                row.percent
            ));
        }
        output
    }
}

/// CSV record for one transition key's delay statistics.
/// `mean`/`min`/`max` are `None` when the key has no usable observation.
#[derive(Debug, Clone)]
pub struct CsvDelayRow {
    pub transition: String,
    pub observations: usize,
    pub missing: usize,
    pub mean: Option<f32>,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

/// CSV delay table formatter
#[derive(Debug, Default)]
pub struct CsvDelayOutput {
    rows: Vec<CsvDelayRow>,
}

impl CsvDelayOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: CsvDelayRow) {
        self.rows.push(row);
    }

    pub fn to_csv(&self, units: &str) -> String {
        let mut output =
            format!("transition,observations,missing,mean_{units},min_{units},max_{units}\n");
        for row in &self.rows {
            output.push_str(&format!(
                "{},{},{},{},{},{}\n",
                escape_field(&row.transition),
                row.observations,
                row.missing,
                stat_field(row.mean),
                stat_field(row.min),
                stat_field(row.max)
            ));
        }
        output
    }
}

/// CSV record for one class's precision/recall/F1
#[derive(Debug, Clone)]
pub struct CsvClassRow {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// CSV classification-report formatter
#[derive(Debug, Default)]
pub struct CsvClassOutput {
    rows: Vec<CsvClassRow>,
}

impl CsvClassOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: CsvClassRow) {
        self.rows.push(row);
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::from("class,precision,recall,f1_score,support\n");
        for row in &self.rows {
            output.push_str(&format!(
                "{},{:.4},{:.4},{:.4},{}\n",
                escape_field(&row.class),
                row.precision,
                row.recall,
                row.f1,
                row.support
            ));
        }
        output
    }
}

/// CSV confusion-matrix formatter: one header of predicted classes, one row
/// per true class.
#[derive(Debug, Default)]
pub struct CsvMatrixOutput {
    classes: Vec<String>,
    matrix: Vec<Vec<usize>>,
}

impl CsvMatrixOutput {
    pub fn new(classes: Vec<String>, matrix: Vec<Vec<usize>>) -> Self {
        Self { classes, matrix }
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::from("true_label");
        for class in &self.classes {
            output.push(',');
            output.push_str(&escape_field(class));
        }
        output.push('\n');

        for (class, counts) in self.classes.iter().zip(self.matrix.iter()) {
            output.push_str(&escape_field(class));
            for count in counts {
                output.push(',');
                output.push_str(&count.to_string());
            }
            output.push('\n');
        }
        output
    }
}

fn stat_field(value: Option<f32>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
}

/// Escape CSV field (handle commas, quotes, newlines)
pub fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
