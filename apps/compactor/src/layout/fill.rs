//! Column fill metrics and fill analysis.
//!
//! `balance_score` and `overflow_risk` are reported on every distribution.
//! `analyze_fill` only classifies; it never changes the distribution it
//! inspects.

use serde::{Deserialize, Serialize};

use crate::layout::blocks::ContentBlock;

const UNBALANCED_BELOW: f64 = 0.8;
const SPARSE_BELOW: f64 = 0.5;
const NEAR_OVERFLOW_AT: f64 = 0.95;

// ────────────────────────────────────────────────────────────────────────────
// Distribution types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnContent {
    pub column_index: usize,
    pub blocks: Vec<ContentBlock>,
    /// Running sum of block heights, inches.
    pub estimated_height: f64,
}

impl ColumnContent {
    pub fn new(column_index: usize) -> Self {
        Self {
            column_index,
            blocks: Vec::new(),
            estimated_height: 0.0,
        }
    }

    pub fn push(&mut self, block: ContentBlock) {
        self.estimated_height += block.estimated_height;
        self.blocks.push(block);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDistribution {
    pub columns: Vec<ColumnContent>,
    /// Tallest column, inches.
    pub total_height: f64,
    /// 1.0 means every column is the same height.
    pub balance_score: f64,
    /// Highest column-height-to-capacity ratio, capped at 1.0.
    pub overflow_risk: f64,
}

impl ColumnDistribution {
    pub fn from_columns(columns: Vec<ColumnContent>, capacity: f64) -> Self {
        let heights: Vec<f64> = columns.iter().map(|c| c.estimated_height).collect();
        Self {
            total_height: heights.iter().copied().fold(0.0, f64::max),
            balance_score: balance_score(&heights),
            overflow_risk: overflow_risk(&heights, capacity),
            columns,
        }
    }

    pub fn block_count(&self) -> usize {
        self.columns.iter().map(|c| c.blocks.len()).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Metrics
// ────────────────────────────────────────────────────────────────────────────

/// `max(0, 1 − stddev/mean)` over column heights; empty pages are balanced.
pub fn balance_score(heights: &[f64]) -> f64 {
    if heights.is_empty() {
        return 1.0;
    }
    let n = heights.len() as f64;
    let mean = heights.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 1.0;
    }
    let variance = heights.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / n;
    (1.0 - variance.sqrt() / mean).max(0.0)
}

/// `max over columns of min(1, height/capacity)`.
pub fn overflow_risk(heights: &[f64], capacity: f64) -> f64 {
    if capacity <= 0.0 {
        return 1.0;
    }
    heights
        .iter()
        .map(|h| (h / capacity).min(1.0))
        .fold(0.0, f64::max)
}

// ────────────────────────────────────────────────────────────────────────────
// Fill analysis
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillVerdict {
    Balanced,
    /// Balance below 0.8: one column runs noticeably longer than the others.
    Unbalanced,
    /// Less than half of the page's column capacity is used.
    Sparse,
    /// Some column is at 95% of capacity or more.
    NearOverflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillAnalysis {
    pub used_height: f64,
    pub available_height: f64,
    /// `used / available` over all columns.
    pub fill_ratio: f64,
    pub verdict: FillVerdict,
}

/// Classifies a distribution against `capacity` per column.
pub fn analyze_fill(distribution: &ColumnDistribution, capacity: f64) -> FillAnalysis {
    let used_height: f64 = distribution
        .columns
        .iter()
        .map(|c| c.estimated_height)
        .sum();
    let available_height = capacity * distribution.columns.len() as f64;
    let fill_ratio = if available_height > 0.0 {
        used_height / available_height
    } else {
        0.0
    };

    let verdict = if distribution.overflow_risk >= NEAR_OVERFLOW_AT {
        FillVerdict::NearOverflow
    } else if fill_ratio < SPARSE_BELOW {
        FillVerdict::Sparse
    } else if distribution.balance_score < UNBALANCED_BELOW {
        FillVerdict::Unbalanced
    } else {
        FillVerdict::Balanced
    };

    FillAnalysis {
        used_height,
        available_height,
        fill_ratio,
        verdict,
    }
}
