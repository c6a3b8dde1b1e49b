//! Per-reference validation. Findings are collected and returned alongside
//! the references; nothing here fails the run.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::xref::dedup::CrossReference;
use crate::xref::format::ReferenceFormats;
use crate::xref::items::ItemIndex;
use crate::xref::ReferenceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorType {
    BrokenLink,
    CircularReference,
    InvalidFormat,
    MissingTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub reference_id: String,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ValidationErrorType>,
    pub message: String,
    pub confidence: f64,
}

impl ValidationResult {
    fn valid(reference: &CrossReference) -> Self {
        Self {
            reference_id: reference.id.clone(),
            is_valid: true,
            error_type: None,
            message: "Reference is valid".to_string(),
            confidence: reference.confidence,
        }
    }

    fn invalid(reference: &CrossReference, error_type: ValidationErrorType, message: String) -> Self {
        Self {
            reference_id: reference.id.clone(),
            is_valid: false,
            error_type: Some(error_type),
            message,
            confidence: reference.confidence,
        }
    }
}

/// Checks, in order, stopping at the first failure:
/// 1. the target is a known item (`MissingTarget`)
/// 2. the source is a known item (`BrokenLink`)
/// 3. no reference runs straight back from target to source (`CircularReference`)
/// 4. the display text matches its type's template (`InvalidFormat`)
///
/// Cycle detection is one hop only: A→B→A is flagged, A→B→C→A is not.
pub fn validate_references(
    references: &[CrossReference],
    index: &ItemIndex,
    formats: &ReferenceFormats,
) -> Vec<ValidationResult> {
    let links: HashSet<(&str, &str)> = references
        .iter()
        .map(|r| (r.source_id.as_str(), r.target_id.as_str()))
        .collect();
    // Templates are escaped before compiling, so this only fails on regex size limits.
    let patterns = formats.patterns().unwrap_or_default();

    references
        .iter()
        .map(|reference| validate_one(reference, index, formats, &patterns, &links))
        .collect()
}

fn validate_one(
    reference: &CrossReference,
    index: &ItemIndex,
    formats: &ReferenceFormats,
    patterns: &HashMap<ReferenceType, Regex>,
    links: &HashSet<(&str, &str)>,
) -> ValidationResult {
    if !index.contains(&reference.target_id) {
        return ValidationResult::invalid(
            reference,
            ValidationErrorType::MissingTarget,
            format!("Target '{}' does not exist", reference.target_id),
        );
    }

    if !index.contains(&reference.source_id) {
        return ValidationResult::invalid(
            reference,
            ValidationErrorType::BrokenLink,
            format!("Source '{}' does not exist", reference.source_id),
        );
    }

    if links.contains(&(reference.target_id.as_str(), reference.source_id.as_str())) {
        return ValidationResult::invalid(
            reference,
            ValidationErrorType::CircularReference,
            format!(
                "'{}' and '{}' reference each other",
                reference.source_id, reference.target_id
            ),
        );
    }

    let well_formed = patterns
        .get(&reference.reference_type)
        .is_some_and(|re| re.is_match(&reference.display_text));
    if !well_formed {
        return ValidationResult::invalid(
            reference,
            ValidationErrorType::InvalidFormat,
            format!(
                "Display text '{}' does not match the {} format '{}'",
                reference.display_text,
                reference.reference_type,
                formats.template(reference.reference_type)
            ),
        );
    }

    ValidationResult::valid(reference)
}
