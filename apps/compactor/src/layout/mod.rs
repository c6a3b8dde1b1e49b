// Compact Layout Engine
// Implements: page geometry, typographic budget, block height estimation,
// column balancing with overflow splitting.
// Pure computation: callers on an async runtime should use spawn_blocking.

pub mod blocks;
pub mod config;
pub mod engine;
pub mod fill;
pub mod geometry;

use thiserror::Error;

pub use blocks::{BlockType, ContentBlock, SplitOutcome, SplitStrategy};
pub use config::{CompactLayoutConfig, PartialLayoutConfig};
pub use engine::{CompactLayoutEngine, LayoutCalculation};
pub use fill::{analyze_fill, ColumnContent, ColumnDistribution, FillAnalysis};
pub use geometry::{Margins, PaperSize};

/// Fatal layout failures. Both mean the caller must change its inputs.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Invalid layout config: {field} = {value} {reason}")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: String,
    },

    #[error(
        "Column overflow: {block_type} block '{block_id}' ({block_height:.3}in) fits in no column (capacity {capacity:.3}in)"
    )]
    ColumnOverflow {
        block_id: String,
        block_type: BlockType,
        block_height: f64,
        capacity: f64,
    },
}

impl LayoutError {
    pub fn code(&self) -> &'static str {
        match self {
            LayoutError::InvalidConfig { .. } => "INVALID_CONFIG",
            LayoutError::ColumnOverflow { .. } => "COLUMN_OVERFLOW",
        }
    }
}
