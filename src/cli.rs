//! CLI argument parsing for medir

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for audit reports
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    Text,
    /// JSON document for machine parsing
    Json,
    /// CSV stream for spreadsheet analysis
    Csv,
}

/// Dataset layout on disk
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    /// Scenario folders with numbered trial files (trial_<n>.csv)
    Scenarios,
    /// Ground-truth/prediction directory pairs joined by row index
    Pairs,
}

/// Unit for delay statistics
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DelayUnitsArg {
    /// Row offset between transition and first detection
    Rows,
    /// Wall-clock seconds between the two rows' timestamps
    Seconds,
}

#[derive(Parser, Debug)]
#[command(name = "medir")]
#[command(version)]
#[command(about = "Offline accuracy and detection-latency auditor for classifier trial logs", long_about = None)]
pub struct Cli {
    /// Root directory containing the recorded trial data
    pub root: PathBuf,

    /// Dataset layout
    #[arg(long = "layout", value_enum, default_value = "scenarios")]
    pub layout: LayoutArg,

    /// Scenario folder to analyze (repeatable; defaults to the four
    /// canonical transition folders)
    #[arg(long = "scenario", value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// Number of numbered trial files per scenario folder
    #[arg(long = "trials", value_name = "N", default_value = "10")]
    pub trials: usize,

    /// Ground-truth directory for pairs layout (repeatable, zipped with --pred)
    #[arg(long = "truth", value_name = "DIR")]
    pub truth: Vec<PathBuf>,

    /// Prediction directory for pairs layout (repeatable, zipped with --truth)
    #[arg(long = "pred", value_name = "DIR")]
    pub pred: Vec<PathBuf>,

    /// Number of numbered variant files per directory pair (besides the base file)
    #[arg(long = "variants", value_name = "N", default_value = "4")]
    pub variants: usize,

    /// Unit for delay statistics
    #[arg(long = "delay-units", value_enum, default_value = "rows")]
    pub delay_units: DelayUnitsArg,

    /// Count unresolved transitions toward per-transition observation totals
    #[arg(long = "count-missing")]
    pub count_missing: bool,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Directory for CSV report files (written in addition to stdout output)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Enable debug tracing to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
