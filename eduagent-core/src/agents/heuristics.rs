//! Surface-level content signals shared by the agent variants.
//!
//! Confidence is a lightweight proxy for output quality, not a calibrated
//! probability: a variant baseline plus additive bonuses for domain signals.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static STEP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*(?:step\s*\d+|\d+[.)])\s*\S").expect("Invalid regex")
});

static HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*#{1,6}\s+\S").expect("Invalid regex"));

static BULLET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:[-*•]|\d+[.)])\s+\S").expect("Invalid regex"));

static PERCENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?\s*%").expect("Invalid regex"));

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*\}|\[.*\])\s*```").expect("Invalid regex")
});

/// Additive confidence score, clamped to [0, 1] when finished.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConfidenceScore {
    value: f64,
}

impl ConfidenceScore {
    pub(crate) fn base(value: f64) -> Self {
        Self { value }
    }

    /// Add `bonus` if `condition` holds.
    pub(crate) fn bonus_if(mut self, condition: bool, bonus: f64) -> Self {
        if condition {
            self.value += bonus;
        }
        self
    }

    /// Add `bonus` if the lower-cased content contains any of `signals`.
    pub(crate) fn bonus_any(self, lowered: &str, signals: &[&str], bonus: f64) -> Self {
        self.bonus_if(contains_any(lowered, signals), bonus)
    }

    pub(crate) fn finish(self) -> f64 {
        clamp_confidence(self.value)
    }
}

/// Clamp to [0, 1]; NaN maps to 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Numbered or "Step N" lines.
pub(crate) fn count_steps(content: &str) -> usize {
    STEP_PATTERN.find_iter(content).count()
}

/// Markdown headings.
pub(crate) fn count_headings(content: &str) -> usize {
    HEADING_PATTERN.find_iter(content).count()
}

/// Bulleted or numbered list items.
pub(crate) fn count_list_items(content: &str) -> usize {
    BULLET_PATTERN.find_iter(content).count()
}

/// Percentages mentioned in the text, in order.
pub(crate) fn percentages(content: &str) -> Vec<String> {
    PERCENT_PATTERN
        .find_iter(content)
        .map(|m| m.as_str().replace(' ', ""))
        .collect()
}

pub(crate) fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Pull a JSON document out of model output: the whole text, a fenced
/// block, or the outermost braces, in that order.
pub(crate) fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() || value.is_array() {
            return Some(value);
        }
    }

    if let Some(captures) = FENCED_JSON.captures(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(&captures[1]) {
            return Some(value);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&trimmed[start..=end]).ok()
}
