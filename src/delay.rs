//! Delay resolution: how long until a transition was actually detected
//!
//! For each transition in the expected column, scan the actual column from
//! the transition index forward for the first row matching the new label
//! (after the same normalization used by detection). The offset is measured
//! both in rows and, when both rows carry parsable timestamps, in seconds.
//! Only the first match counts; later coincidental matches are ignored even
//! if they are a "truer" detection.

use crate::label::normalize;
use crate::transition::TransitionEvent;
use crate::trial::Trial;

/// Outcome of resolving one transition against the actual-label column.
#[derive(Debug, Clone, PartialEq)]
pub enum Delay {
    /// First matching row found `rows` rows after the transition.
    /// `seconds` is the signed wall-clock delta when both ends have
    /// parsable timestamps (paired clocks may skew, so it can be negative).
    Found { rows: usize, seconds: Option<f64> },
    /// No matching row exists for the remainder of the sequence.
    NotFound,
}

impl Delay {
    pub fn is_found(&self) -> bool {
        matches!(self, Delay::Found { .. })
    }

    pub fn rows(&self) -> Option<usize> {
        match self {
            Delay::Found { rows, .. } => Some(*rows),
            Delay::NotFound => None,
        }
    }

    pub fn seconds(&self) -> Option<f64> {
        match self {
            Delay::Found { seconds, .. } => *seconds,
            Delay::NotFound => None,
        }
    }
}

/// Find the first index `j >= event.index` whose actual label matches the
/// transition's new label. An `event.index` beyond the actual column's
/// range yields `NotFound`.
pub fn resolve(event: &TransitionEvent, trial: &Trial) -> Delay {
    for j in event.index..trial.rows.len() {
        if normalize(&trial.rows[j].actual) == event.to_norm {
            let seconds = match (
                trial.rows[j].actual_at,
                trial.rows[event.index].expected_at,
            ) {
                (Some(found), Some(expected)) => Some(duration_seconds(found - expected)),
                _ => None,
            };
            return Delay::Found {
                rows: j - event.index,
                seconds,
            };
        }
    }
    Delay::NotFound
}

fn duration_seconds(delta: chrono::Duration) -> f64 {
    delta
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or_else(|| delta.num_milliseconds() as f64 / 1_000.0)
}
