//! Medir - offline accuracy and detection-latency auditor
//!
//! This library replays recorded trial logs of a three-state fault
//! classifier (normal / arc flash / off contact), compares expected vs
//! actual labels row by row, and derives accuracy tables, per-class
//! precision/recall/F1, confusion matrices, and transition-delay
//! statistics.

pub mod aggregate;
pub mod batch;
pub mod cli;
pub mod csv_output;
pub mod delay;
pub mod json_output;
pub mod label;
pub mod metrics;
pub mod report;
pub mod transition;
pub mod trial;
