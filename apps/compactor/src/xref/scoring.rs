//! Reference confidence scoring and structural distance.
//!
//! Scoring is purely syntactic: title matches, title-word overlap and a few
//! type keywords. The weights are plain data so they can be tuned without
//! touching candidate discovery.
//!
//! `CrossReferenceSystem` holds a `Box<dyn ReferenceScorer>`; the keyword
//! scorer is the default backend.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::xref::items::{ItemLocation, ReferenceableItem};
use crate::xref::ReferenceType;

/// Title words must be longer than this to count toward word overlap.
const MIN_TITLE_WORD_CHARS: usize = 3;

/// Crossing one part costs as much as ten sections.
pub const PART_DISTANCE_WEIGHT: usize = 10;

static MATH_VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(equation|formula|identity|law)\b").expect("valid vocabulary regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    /// Item title appears verbatim in the source text.
    pub title_match: f64,
    /// Scaled by the fraction of significant title words present.
    pub title_words: f64,
    pub formula_keyword: f64,
    pub example_keyword: f64,
    pub section_keyword: f64,
    /// Formula targets only, when the text talks about equations or laws.
    pub math_vocabulary: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            title_match: 0.8,
            title_words: 0.4,
            formula_keyword: 0.3,
            example_keyword: 0.3,
            section_keyword: 0.2,
            math_vocabulary: 0.2,
        }
    }
}

/// Heuristic `[0, 1]` likelihood that `source_text` refers to `item`.
pub fn calculate_reference_confidence(
    source_text: &str,
    item: &ReferenceableItem,
    weights: &ConfidenceWeights,
) -> f64 {
    let text = source_text.to_lowercase();
    let title = item.title.trim().to_lowercase();
    let mut score = 0.0;

    if !title.is_empty() && text.contains(&title) {
        score += weights.title_match;
    }

    let title_words: Vec<&str> = title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > MIN_TITLE_WORD_CHARS)
        .collect();
    if !title_words.is_empty() {
        let present = title_words.iter().filter(|w| text.contains(*w)).count();
        score += weights.title_words * present as f64 / title_words.len() as f64;
    }

    score += match item.item_type {
        ReferenceType::Formula if text.contains("formula") => weights.formula_keyword,
        ReferenceType::Example if text.contains("example") => weights.example_keyword,
        ReferenceType::Section if text.contains("section") => weights.section_keyword,
        _ => 0.0,
    };

    if item.item_type == ReferenceType::Formula && MATH_VOCABULARY.is_match(source_text) {
        score += weights.math_vocabulary;
    }

    score.clamp(0.0, 1.0)
}

/// `|Δpart| × 10`, plus `|Δsection|` when both sit in the same part.
pub fn structural_distance(a: ItemLocation, b: ItemLocation) -> usize {
    if a.part_index == b.part_index {
        a.section_index.abs_diff(b.section_index)
    } else {
        a.part_index.abs_diff(b.part_index) * PART_DISTANCE_WEIGHT
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer trait
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap the scoring backend without touching discovery.
pub trait ReferenceScorer: Send + Sync {
    fn score(&self, source_text: &str, item: &ReferenceableItem) -> f64;

    /// Reported in logs for transparency.
    fn name(&self) -> &'static str;
}

/// Default scorer: keyword and title overlap with tunable weights.
#[derive(Debug, Clone, Default)]
pub struct KeywordReferenceScorer {
    pub weights: ConfidenceWeights,
}

impl ReferenceScorer for KeywordReferenceScorer {
    fn score(&self, source_text: &str, item: &ReferenceableItem) -> f64 {
        calculate_reference_confidence(source_text, item, &self.weights)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
