//! Transition detection over a trial's expected-label sequence
//!
//! Scans the ground-truth column and yields an event at every index where
//! the normalized expected label differs from its predecessor. No event is
//! ever emitted at index 0; a sequence of length <= 1 yields nothing.
//! Flickers (A -> B -> A across three samples) are not merged: every change
//! point is its own event.

use crate::label::{normalize, Label};
use crate::trial::Trial;

/// A point where the expected label changes value.
///
/// Invariants: `index > 0`, and the normalized from/to values differ.
/// `to_norm` is the normalized raw spelling of the new label, used for
/// matching in the actual-label column; `from`/`to` are the alias-resolved
/// labels used for aggregation keys.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEvent {
    pub index: usize,
    pub from: Label,
    pub to: Label,
    pub to_norm: String,
}

/// Lazy, finite, restartable iterator over a trial's transitions, ordered
/// by index ascending. Restart by constructing a new one.
pub struct Transitions<'a> {
    trial: &'a Trial,
    idx: usize,
}

impl<'a> Transitions<'a> {
    pub fn new(trial: &'a Trial) -> Self {
        Self { trial, idx: 1 }
    }
}

impl Iterator for Transitions<'_> {
    type Item = TransitionEvent;

    fn next(&mut self) -> Option<TransitionEvent> {
        while self.idx < self.trial.rows.len() {
            let idx = self.idx;
            self.idx += 1;

            let prev = normalize(&self.trial.rows[idx - 1].expected);
            let cur = normalize(&self.trial.rows[idx].expected);
            if cur != prev {
                return Some(TransitionEvent {
                    index: idx,
                    from: Label::resolve(&prev),
                    to: Label::resolve(&cur),
                    to_norm: cur,
                });
            }
        }
        None
    }
}

/// Collect all transitions of a trial.
pub fn detect(trial: &Trial) -> Vec<TransitionEvent> {
    Transitions::new(trial).collect()
}
