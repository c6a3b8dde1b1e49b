//! Candidate ranking, pair deduplication and reference numbering.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::xref::format::ReferenceFormats;
use crate::xref::ReferenceType;

/// A scored link that passed the confidence and distance filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCandidate {
    pub source_id: String,
    pub target_id: String,
    pub reference_type: ReferenceType,
    pub confidence: f64,
    pub distance: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub id: String,
    #[serde(rename = "type")]
    pub reference_type: ReferenceType,
    pub source_id: String,
    pub target_id: String,
    pub display_text: String,
    pub confidence: f64,
}

/// Orders candidates by confidence, highest first. Equal confidences keep
/// discovery order.
pub fn rank_candidates(candidates: &mut [ReferenceCandidate]) {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

/// Walks ranked candidates, keeps the first of each `(source, target)` pair
/// and numbers the survivors `ref-1`, `ref-2`, ...
///
/// Self-references never become references.
pub fn build_references(
    mut candidates: Vec<ReferenceCandidate>,
    formats: &ReferenceFormats,
) -> Vec<CrossReference> {
    rank_candidates(&mut candidates);

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut references = Vec::new();

    for candidate in candidates {
        if candidate.source_id == candidate.target_id {
            continue;
        }
        if !seen.insert((candidate.source_id.clone(), candidate.target_id.clone())) {
            continue;
        }
        references.push(CrossReference {
            id: format!("ref-{}", references.len() + 1),
            reference_type: candidate.reference_type,
            display_text: formats.format(candidate.reference_type, &candidate.target_id),
            source_id: candidate.source_id,
            target_id: candidate.target_id,
            confidence: candidate.confidence,
        });
    }

    references
}
