//! Batch aggregation: per-transition delay statistics and accuracy tallies
//!
//! Aggregation is purely additive (merge, never overwrite), so a skipped
//! trial can never corrupt what earlier trials already contributed. All
//! state is owned by the batch run; nothing is global.

use std::collections::HashMap;

use crate::delay::Delay;
use crate::label::TransitionKey;
use crate::trial::Trial;

/// Unit in which delay statistics are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayUnits {
    /// Row offset between transition and first detection.
    Rows,
    /// Wall-clock seconds between the two rows' timestamps.
    Seconds,
}

/// Mean/min/max over the non-sentinel observations of one transition key.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayStats {
    pub mean: f32,
    pub min: f32,
    pub max: f32,
}

/// Accumulates delay observations keyed by canonical transition, across
/// every trial of a batch run.
///
/// Observations are kept raw, in trial-processing order; statistics are
/// derived on demand. Keys are listed in first-seen order so reports are
/// deterministic for a given enumeration order.
#[derive(Debug, Default)]
pub struct DelayAggregator {
    observations: HashMap<TransitionKey, Vec<Delay>>,
    order: Vec<TransitionKey>,
}

impl DelayAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation under its canonical key.
    pub fn record(&mut self, key: TransitionKey, delay: Delay) {
        if !self.observations.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.observations.entry(key).or_default().push(delay);
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> &[TransitionKey] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Raw observations for a key, in recording order.
    pub fn observations(&self, key: &TransitionKey) -> &[Delay] {
        self.observations.get(key).map_or(&[], Vec::as_slice)
    }

    /// Observations with a resolved offset.
    pub fn found_count(&self, key: &TransitionKey) -> usize {
        self.observations(key).iter().filter(|d| d.is_found()).count()
    }

    /// `NotFound` sentinels; never part of mean/min/max.
    pub fn missing_count(&self, key: &TransitionKey) -> usize {
        self.observations(key).iter().filter(|d| !d.is_found()).count()
    }

    /// Derive mean/min/max over the non-sentinel observations of a key in
    /// the requested unit. `None` when no usable observation exists (in
    /// seconds mode that includes found offsets whose timestamps failed to
    /// parse) rather than an error or a fake zero.
    pub fn stats(&self, key: &TransitionKey, units: DelayUnits) -> Option<DelayStats> {
        let values: Vec<f32> = self
            .observations(key)
            .iter()
            .filter_map(|d| match units {
                DelayUnits::Rows => d.rows().map(|r| r as f32),
                DelayUnits::Seconds => d.seconds().map(|s| s as f32),
            })
            .collect();

        if values.is_empty() {
            return None;
        }

        // Trueno SIMD reductions over the observation vector
        let v = trueno::Vector::from_slice(&values);
        Some(DelayStats {
            mean: v.mean().unwrap_or(0.0),
            min: v.min().unwrap_or(0.0),
            max: v.max().unwrap_or(0.0),
        })
    }
}

/// Row-agreement counts for one trial, scenario, or the whole run.
///
/// Agreement is exact equality of the whitespace-trimmed raw cells: no
/// marker stripping, no alias mapping. Stricter than delay matching on
/// purpose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccuracyTally {
    pub total: u64,
    pub correct: u64,
}

impl AccuracyTally {
    pub fn from_trial(trial: &Trial) -> Self {
        let correct = trial
            .rows
            .iter()
            .filter(|row| row.expected == row.actual)
            .count() as u64;
        Self {
            total: trial.len() as u64,
            correct,
        }
    }

    pub fn incorrect(&self) -> u64 {
        self.total - self.correct
    }

    /// Accuracy in percent. Zero rows reports exactly 0% by policy, not by
    /// dividing.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }

    pub fn merge(&mut self, other: AccuracyTally) {
        self.total += other.total;
        self.correct += other.correct;
    }
}

/// Per-scenario accuracy tallies plus a grand total, in first-seen order.
#[derive(Debug, Default)]
pub struct AccuracyTracker {
    scenarios: Vec<(String, AccuracyTally)>,
}

impl AccuracyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one trial's tally into its scenario.
    pub fn record(&mut self, scenario: &str, tally: AccuracyTally) {
        if let Some((_, existing)) = self.scenarios.iter_mut().find(|(name, _)| name == scenario) {
            existing.merge(tally);
        } else {
            self.scenarios.push((scenario.to_string(), tally));
        }
    }

    pub fn scenarios(&self) -> &[(String, AccuracyTally)] {
        &self.scenarios
    }

    /// Grand total across all scenarios, summed with trueno.
    pub fn overall(&self) -> AccuracyTally {
        if self.scenarios.is_empty() {
            return AccuracyTally::default();
        }

        let totals: Vec<f32> = self.scenarios.iter().map(|(_, t)| t.total as f32).collect();
        let corrects: Vec<f32> = self.scenarios.iter().map(|(_, t)| t.correct as f32).collect();

        AccuracyTally {
            total: trueno::Vector::from_slice(&totals).sum().unwrap_or(0.0) as u64,
            correct: trueno::Vector::from_slice(&corrects).sum().unwrap_or(0.0) as u64,
        }
    }
}
