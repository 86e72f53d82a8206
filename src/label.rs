//! Canonical fault-condition labels and alias resolution
//!
//! Trial logs spell the same physical condition several ways depending on
//! which capture pipeline produced them: long-form (`ARC FLASH`), short-form
//! (`Arc`), display-form (`Arc Flash`), or status-prefixed
//! (`Status: Arc Flash`), sometimes decorated with a trailing warning glyph.
//! Everything downstream (transition keys, confusion matrices) works on the
//! resolved [`Label`] so that all spellings of one condition aggregate
//! together.

use std::fmt;

/// Decorative warning marker some capture pipelines append to alarm labels.
const WARNING_MARKER: char = '\u{26A0}';

/// A resolved fault-condition label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    Normal,
    ArcFlash,
    OffContact,
    /// A label outside the alias table, kept verbatim (normalized).
    Other(String),
}

/// Trim incidental whitespace and strip the decorative warning marker.
///
/// The marker is cosmetic: it must never affect transition detection or
/// label matching. Applied before every label comparison in the pipeline.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(WARNING_MARKER)
        .trim()
        .to_string()
}

impl Label {
    /// Resolve a raw label cell through the alias table.
    ///
    /// Resolution is case-insensitive and ignores an optional `Status: `
    /// prefix. Unknown labels become [`Label::Other`] rather than an error;
    /// the auditor reports whatever the system under test emitted.
    pub fn resolve(raw: &str) -> Label {
        let norm = normalize(raw);
        let bare = norm.strip_prefix("Status:").map_or(norm.as_str(), str::trim);
        match bare.to_ascii_lowercase().as_str() {
            "normal" => Label::Normal,
            "arc" | "arc flash" => Label::ArcFlash,
            "off" | "off contact" | "no contact" => Label::OffContact,
            _ => Label::Other(norm),
        }
    }

    /// Short name used in transition keys (`Arc`, `Normal`, `Off`).
    pub fn short_name(&self) -> &str {
        match self {
            Label::Normal => "Normal",
            Label::ArcFlash => "Arc",
            Label::OffContact => "Off",
            Label::Other(s) => s,
        }
    }

    /// Long name used in per-class reports (`Arc Flash`, `Off Contact`).
    pub fn long_name(&self) -> &str {
        match self {
            Label::Normal => "Normal",
            Label::ArcFlash => "Arc Flash",
            Label::OffContact => "Off Contact",
            Label::Other(s) => s,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Canonical identity of a (from, to) expected-label change.
///
/// Both sides go through the same alias resolution, so the same physical
/// transition measured via two naming conventions lands on one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    pub from: Label,
    pub to: Label,
}

impl TransitionKey {
    pub fn new(from: Label, to: Label) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}
