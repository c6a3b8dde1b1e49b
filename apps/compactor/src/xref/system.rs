//! Cross-reference generation.
//!
//! `generate_cross_references` is a pure function of the document and the
//! system's configuration. Everything a run produces (item index, references,
//! forward and reverse maps, validation findings) lives in the returned
//! `ReferenceSet`, so a second call starts from nothing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::document::AcademicDocument;
use crate::xref::dedup::{build_references, CrossReference, ReferenceCandidate};
use crate::xref::format::ReferenceFormats;
use crate::xref::items::{collect_sources, extract_referenceable_items, ItemIndex, ReferenceSource};
use crate::xref::scoring::{structural_distance, KeywordReferenceScorer, ReferenceScorer};
use crate::xref::validation::{validate_references, ValidationResult};
use crate::xref::XrefError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossReferenceConfig {
    pub enable_auto_generation: bool,
    pub reference_formats: ReferenceFormats,
    pub validation_enabled: bool,
    /// Largest structural distance at which two items may still be linked.
    pub max_distance: usize,
    /// Minimum score in `[0, 1]` for a candidate to be kept.
    pub confidence_threshold: f64,
}

impl Default for CrossReferenceConfig {
    fn default() -> Self {
        Self {
            enable_auto_generation: true,
            reference_formats: ReferenceFormats::default(),
            validation_enabled: true,
            max_distance: 5,
            confidence_threshold: 0.6,
        }
    }
}

pub struct CrossReferenceSystem {
    config: CrossReferenceConfig,
    scorer: Box<dyn ReferenceScorer>,
}

impl CrossReferenceSystem {
    pub fn new(config: CrossReferenceConfig) -> Self {
        Self::with_scorer(config, Box::new(KeywordReferenceScorer::default()))
    }

    pub fn with_scorer(config: CrossReferenceConfig, scorer: Box<dyn ReferenceScorer>) -> Self {
        Self { config, scorer }
    }

    pub fn config(&self) -> &CrossReferenceConfig {
        &self.config
    }

    /// Merges `formats` over the configured templates. Existing reference
    /// sets are untouched; call `ReferenceSet::reformat` to apply.
    pub fn update_reference_formats(&mut self, formats: ReferenceFormats) {
        self.config.reference_formats.merge(formats);
    }

    pub fn generate_cross_references(
        &self,
        document: &AcademicDocument,
    ) -> Result<ReferenceSet, XrefError> {
        let items = extract_referenceable_items(document)?;

        if !self.config.enable_auto_generation {
            debug!(items = items.len(), "Cross-reference generation disabled");
            return Ok(ReferenceSet::new(items, Vec::new(), Vec::new()));
        }

        let sources = collect_sources(document);
        let candidates = self.find_candidates(&items, &sources);
        let candidate_count = candidates.len();
        let references = build_references(candidates, &self.config.reference_formats);

        let validation = if self.config.validation_enabled {
            self.validate(&references, &items)
        } else {
            Vec::new()
        };

        let set = ReferenceSet::new(items, references, validation);
        info!(
            scorer = self.scorer.name(),
            items = set.items().len(),
            sources = sources.len(),
            candidates = candidate_count,
            references = set.references().len(),
            invalid = set.invalid_count(),
            "Cross-references generated"
        );
        Ok(set)
    }

    /// Scores every source against every other item inside `max_distance`.
    /// Output follows source order, then item order.
    pub fn find_candidates(
        &self,
        items: &ItemIndex,
        sources: &[ReferenceSource],
    ) -> Vec<ReferenceCandidate> {
        let mut candidates = Vec::new();
        for source in sources {
            for item in items.iter() {
                if item.id == source.source_id {
                    continue;
                }
                let distance = structural_distance(source.location, item.location);
                if distance > self.config.max_distance {
                    continue;
                }
                let confidence = self.scorer.score(&source.text, item);
                if confidence < self.config.confidence_threshold {
                    continue;
                }
                debug!(
                    source = %source.source_id,
                    target = %item.id,
                    confidence,
                    distance,
                    "Reference candidate"
                );
                candidates.push(ReferenceCandidate {
                    source_id: source.source_id.clone(),
                    target_id: item.id.clone(),
                    reference_type: item.item_type,
                    confidence,
                    distance,
                });
            }
        }
        candidates
    }

    /// Display text for `reference` under the current templates.
    pub fn format_reference(&self, reference: &CrossReference) -> String {
        self.config
            .reference_formats
            .format(reference.reference_type, &reference.target_id)
    }

    pub fn validate(&self, references: &[CrossReference], items: &ItemIndex) -> Vec<ValidationResult> {
        let results = validate_references(references, items, &self.config.reference_formats);
        for result in results.iter().filter(|r| !r.is_valid) {
            warn!(
                reference_id = %result.reference_id,
                error_type = ?result.error_type,
                "{}",
                result.message
            );
        }
        results
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reference set
// ────────────────────────────────────────────────────────────────────────────

/// The result of one generation run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    items: ItemIndex,
    references: Vec<CrossReference>,
    validation: Vec<ValidationResult>,
    by_id: HashMap<String, usize>,
    /// source id → reference positions
    forward: HashMap<String, Vec<usize>>,
    /// target id → reference positions
    reverse: HashMap<String, Vec<usize>>,
}

impl ReferenceSet {
    pub fn new(
        items: ItemIndex,
        references: Vec<CrossReference>,
        validation: Vec<ValidationResult>,
    ) -> Self {
        let mut by_id = HashMap::new();
        let mut forward: HashMap<String, Vec<usize>> = HashMap::new();
        let mut reverse: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, reference) in references.iter().enumerate() {
            by_id.insert(reference.id.clone(), position);
            forward
                .entry(reference.source_id.clone())
                .or_default()
                .push(position);
            reverse
                .entry(reference.target_id.clone())
                .or_default()
                .push(position);
        }
        Self {
            items,
            references,
            validation,
            by_id,
            forward,
            reverse,
        }
    }

    pub fn items(&self) -> &ItemIndex {
        &self.items
    }

    pub fn references(&self) -> &[CrossReference] {
        &self.references
    }

    pub fn validation(&self) -> &[ValidationResult] {
        &self.validation
    }

    pub fn get(&self, reference_id: &str) -> Option<&CrossReference> {
        self.by_id.get(reference_id).map(|&i| &self.references[i])
    }

    /// References pointing at `target_id`, in reference id order.
    pub fn find_references_to_target(&self, target_id: &str) -> Vec<&CrossReference> {
        self.lookup(&self.reverse, target_id)
    }

    pub fn find_references_from_source(&self, source_id: &str) -> Vec<&CrossReference> {
        self.lookup(&self.forward, source_id)
    }

    pub fn invalid_count(&self) -> usize {
        self.validation.iter().filter(|r| !r.is_valid).count()
    }

    /// Re-derives every display text from `system`'s current templates.
    pub fn reformat(&mut self, system: &CrossReferenceSystem) {
        for reference in &mut self.references {
            reference.display_text = system.format_reference(reference);
        }
    }

    pub fn into_parts(self) -> (Vec<CrossReference>, Vec<ValidationResult>) {
        (self.references, self.validation)
    }

    fn lookup(&self, map: &HashMap<String, Vec<usize>>, key: &str) -> Vec<&CrossReference> {
        map.get(key)
            .map(|positions| positions.iter().map(|&i| &self.references[i]).collect())
            .unwrap_or_default()
    }
}
