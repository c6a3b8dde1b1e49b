// Cross-Reference System
// Implements: referenceable item index, candidate discovery with keyword
// confidence scoring and structural distance, dedup, display formatting,
// one-hop validation and the target → references reverse index.

pub mod dedup;
pub mod format;
pub mod items;
pub mod scoring;
pub mod system;
pub mod validation;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dedup::{CrossReference, ReferenceCandidate};
pub use format::ReferenceFormats;
pub use items::{ItemIndex, ItemLocation, ReferenceableItem};
pub use scoring::{ConfidenceWeights, KeywordReferenceScorer, ReferenceScorer};
pub use system::{CrossReferenceConfig, CrossReferenceSystem, ReferenceSet};
pub use validation::{ValidationErrorType, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Section,
    Formula,
    Example,
    Theorem,
    Definition,
}

impl ReferenceType {
    pub const ALL: [ReferenceType; 5] = [
        ReferenceType::Section,
        ReferenceType::Formula,
        ReferenceType::Example,
        ReferenceType::Theorem,
        ReferenceType::Definition,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceType::Section => "section",
            ReferenceType::Formula => "formula",
            ReferenceType::Example => "example",
            ReferenceType::Theorem => "theorem",
            ReferenceType::Definition => "definition",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum XrefError {
    #[error("Duplicate referenceable item id '{id}'")]
    DuplicateItemId { id: String },
}

impl XrefError {
    pub fn code(&self) -> &'static str {
        match self {
            XrefError::DuplicateItemId { .. } => "DUPLICATE_ITEM_ID",
        }
    }
}
