//! Compact Layout Engine: page capacity and column distribution.
//!
//! # Distribution
//! Blocks are stably sorted by priority (highest first) and drained from an
//! explicit work queue. Each block goes to the least-full column that still
//! has room. A breakable block that fits nowhere is split so its first part
//! fills the least-full column exactly; the remainder goes to the back of the
//! queue and competes for every column again. A block that can be neither
//! placed nor split is a `ColumnOverflow`: content is never dropped silently.
//!
//! One engine serves one generation request. `update_config` re-validates
//! before swapping anything.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::layout::blocks::{
    self, split_content_block, BlockType, ContentBlock, SplitOutcome, SplitStrategy,
};
use crate::layout::config::{CompactLayoutConfig, PartialLayoutConfig};
use crate::layout::fill::{ColumnContent, ColumnDistribution};
use crate::layout::geometry;
use crate::layout::LayoutError;
use crate::models::document::AcademicDocument;

/// Heights closer than this are treated as equal when testing for room.
const HEIGHT_EPSILON: f64 = 1e-9;

/// Overflow risk at which a finished distribution is worth a warning.
const OVERFLOW_WARN_AT: f64 = 0.9;

// ────────────────────────────────────────────────────────────────────────────
// Layout calculation
// ────────────────────────────────────────────────────────────────────────────

/// Page budget derived from a config. All lengths in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutCalculation {
    pub page_width: f64,
    pub page_height: f64,
    pub content_width: f64,
    pub content_height: f64,
    pub column_width: f64,
    pub column_gap: f64,
    pub columns: u8,
    pub effective_line_height: f64,
    pub lines_per_column: u32,
    pub chars_per_line: u32,
    /// Estimated characters per page across all columns.
    pub content_density: u32,
}

impl LayoutCalculation {
    /// Pure arithmetic over the page, margins and typography.
    pub fn from_config(config: &CompactLayoutConfig) -> Self {
        let (page_width, page_height) = config.paper_size.dimensions_in();
        let m = &config.margins;
        let content_width = page_width - m.left - m.right;
        let content_height = page_height - m.top - m.bottom;
        let columns = config.columns.max(1);
        let gaps = f64::from(columns - 1) * m.column_gap;
        let column_width = (content_width - gaps) / f64::from(columns);

        let font = config.typography.font_size_pt;
        let effective_line_height =
            geometry::effective_line_height_in(font, config.typography.line_height);
        let lines_per_column = (content_height / effective_line_height).floor() as u32;
        let chars_per_line = geometry::chars_per_line(column_width, font);

        Self {
            page_width,
            page_height,
            content_width,
            content_height,
            column_width,
            column_gap: m.column_gap,
            columns,
            effective_line_height,
            lines_per_column,
            chars_per_line,
            content_density: chars_per_line * lines_per_column * u32::from(columns),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CompactLayoutEngine {
    config: CompactLayoutConfig,
    calculation: LayoutCalculation,
    split_strategy: SplitStrategy,
}

impl CompactLayoutEngine {
    /// Merges `partial` over the defaults and validates the result.
    pub fn new(partial: PartialLayoutConfig) -> Result<Self, LayoutError> {
        Self::with_config(partial.apply_to(&CompactLayoutConfig::default()))
    }

    pub fn with_config(config: CompactLayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        let calculation = LayoutCalculation::from_config(&config);
        debug!(
            paper = %config.paper_size,
            columns = config.columns,
            font_size_pt = config.typography.font_size_pt,
            lines_per_column = calculation.lines_per_column,
            "Layout engine configured"
        );
        Ok(Self {
            config,
            calculation,
            split_strategy: SplitStrategy::default(),
        })
    }

    pub fn with_split_strategy(mut self, strategy: SplitStrategy) -> Self {
        self.split_strategy = strategy;
        self
    }

    pub fn config(&self) -> &CompactLayoutConfig {
        &self.config
    }

    pub fn split_strategy(&self) -> SplitStrategy {
        self.split_strategy
    }

    /// Overlays `partial` on the current config. On error the engine is unchanged.
    pub fn update_config(&mut self, partial: PartialLayoutConfig) -> Result<(), LayoutError> {
        let merged = partial.apply_to(&self.config);
        merged.validate()?;
        self.calculation = LayoutCalculation::from_config(&merged);
        self.config = merged;
        Ok(())
    }

    pub fn calculate_layout(&self) -> LayoutCalculation {
        self.calculation.clone()
    }

    /// Height available in one column, inches.
    pub fn column_capacity(&self) -> f64 {
        self.calculation.content_height
    }

    pub fn estimate_content_height(&self, content: &str, block_type: BlockType) -> f64 {
        blocks::estimate_content_height(
            content,
            block_type,
            self.calculation.effective_line_height,
        )
    }

    /// A block sized for this engine's typography, with type defaults.
    pub fn create_block(
        &self,
        id: impl Into<String>,
        block_type: BlockType,
        content: impl Into<String>,
    ) -> ContentBlock {
        let content = content.into();
        let height = self.estimate_content_height(&content, block_type);
        ContentBlock::new(id, block_type, content, height)
    }

    pub fn blocks_from_document(&self, document: &AcademicDocument) -> Vec<ContentBlock> {
        blocks::blocks_from_document(document, self.calculation.effective_line_height)
    }

    pub fn split_content_block(&self, block: ContentBlock, available_height: f64) -> SplitOutcome {
        split_content_block(block, available_height, self.split_strategy)
    }

    /// Packs `blocks` into the configured columns.
    pub fn distribute_content(
        &self,
        blocks: Vec<ContentBlock>,
    ) -> Result<ColumnDistribution, LayoutError> {
        let capacity = self.column_capacity();
        let mut ordered = blocks;
        // Stable: equal priorities keep input order.
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
        let mut queue: VecDeque<ContentBlock> = ordered.into();

        let mut columns: Vec<ColumnContent> = (0..usize::from(self.calculation.columns))
            .map(ColumnContent::new)
            .collect();
        let mut splits = 0u32;

        while let Some(block) = queue.pop_front() {
            if let Some(idx) = least_full_with_room(&columns, block.estimated_height, capacity) {
                columns[idx].push(block);
                continue;
            }

            let block = if block.breakable {
                let idx = least_full(&columns);
                let available = capacity - columns[idx].estimated_height;
                if available <= HEIGHT_EPSILON {
                    block
                } else {
                    match self.split_content_block(block, available) {
                        SplitOutcome::Split { first, remaining } => {
                            debug!(
                                block_id = %first.id,
                                column = idx,
                                placed_height = first.estimated_height,
                                deferred_height = remaining.estimated_height,
                                "Split block across columns"
                            );
                            splits += 1;
                            columns[idx].push(first);
                            queue.push_back(remaining);
                            continue;
                        }
                        SplitOutcome::Unsplit(block) => block,
                    }
                }
            } else {
                block
            };

            // Every column was already checked for room above.
            return Err(LayoutError::ColumnOverflow {
                block_id: block.id,
                block_type: block.block_type,
                block_height: block.estimated_height,
                capacity,
            });
        }

        let distribution = ColumnDistribution::from_columns(columns, capacity);
        info!(
            columns = distribution.columns.len(),
            blocks = distribution.block_count(),
            splits,
            total_height = distribution.total_height,
            balance = distribution.balance_score,
            "Content distributed"
        );
        if distribution.overflow_risk >= OVERFLOW_WARN_AT {
            warn!(
                overflow_risk = distribution.overflow_risk,
                "Column distribution is close to capacity"
            );
        }
        Ok(distribution)
    }
}

/// Least-full column that can take `height` more; ties go to the lower index.
fn least_full_with_room(columns: &[ColumnContent], height: f64, capacity: f64) -> Option<usize> {
    columns
        .iter()
        .filter(|c| c.estimated_height + height <= capacity + HEIGHT_EPSILON)
        .min_by(|a, b| a.estimated_height.total_cmp(&b.estimated_height))
        .map(|c| c.column_index)
}

fn least_full(columns: &[ColumnContent]) -> usize {
    columns
        .iter()
        .min_by(|a, b| a.estimated_height.total_cmp(&b.estimated_height))
        .map(|c| c.column_index)
        .unwrap_or(0)
}
