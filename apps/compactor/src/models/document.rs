//! The structured academic document produced by the upstream extraction pipeline.
//!
//! This is read-only input for both the layout engine and the cross-reference
//! system. Extraction quality is not checked here beyond what the consumers need.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicDocument {
    pub title: String,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source_file: Option<String>,
    pub subject: Option<String>,
    pub extracted_at: Option<DateTime<Utc>>,
    pub page_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub part_number: u32,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Dotted section number, e.g. `"1.2"`. Doubles as the section's reference id.
    pub section_number: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub formulas: Vec<Formula>,
    #[serde(default)]
    pub examples: Vec<WorkedExample>,
    #[serde(default)]
    pub subsections: Vec<Section>,
}

/// What an extracted formula states. Unknown kinds fall back to `Formula`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum FormulaKind {
    #[default]
    Formula,
    Definition,
    Theorem,
    Identity,
    Property,
}

impl From<String> for FormulaKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "definition" => FormulaKind::Definition,
            "theorem" => FormulaKind::Theorem,
            "identity" => FormulaKind::Identity,
            "property" => FormulaKind::Property,
            _ => FormulaKind::Formula,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formula {
    /// Upstream-assigned id, e.g. `"1.1.1"`. Must be unique within the document.
    pub id: String,
    pub latex: String,
    #[serde(default)]
    pub context: String,
    #[serde(rename = "type", default)]
    pub kind: FormulaKind,
    #[serde(default)]
    pub is_key_formula: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkedExample {
    /// Upstream-assigned id, e.g. `"Ex.1.1.1"`. Must be unique within the document.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub solution: Vec<SolutionStep>,
    #[serde(default)]
    pub subtopic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionStep {
    pub step_number: u32,
    pub description: String,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub explanation: String,
}

impl AcademicDocument {
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw).map_err(AppError::Document)
    }

    pub fn from_json_slice(raw: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(raw).map_err(AppError::Document)
    }

    /// Total number of sections, subsections included.
    pub fn section_count(&self) -> usize {
        fn count(sections: &[Section]) -> usize {
            sections.iter().map(|s| 1 + count(&s.subsections)).sum()
        }
        self.parts.iter().map(|p| count(&p.sections)).sum()
    }
}

impl WorkedExample {
    /// Problem statement followed by every solution step, one per line.
    pub fn full_text(&self) -> String {
        let mut text = self.problem.clone();
        for step in &self.solution {
            text.push('\n');
            text.push_str(&step.description);
            if let Some(formula) = &step.formula {
                text.push(' ');
                text.push_str(formula);
            }
            if !step.explanation.is_empty() {
                text.push(' ');
                text.push_str(&step.explanation);
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "title": "Probability",
        "parts": [{
            "part_number": 1,
            "title": "Foundations",
            "sections": [{
                "section_number": "1.1",
                "title": "Events",
                "content": "Events are subsets.",
                "formulas": [
                    {"id": "1.1.1", "latex": "P(A \\cup B)", "context": "Union rule", "type": "theorem", "is_key_formula": true},
                    {"id": "1.1.2", "latex": "x", "type": "lemma"}
                ],
                "examples": [{
                    "id": "Ex.1.1.1",
                    "title": "Coin flip",
                    "problem": "Flip a coin.",
                    "solution": [{"step_number": 1, "description": "Count outcomes", "formula": "2", "explanation": "heads or tails"}]
                }],
                "subsections": [{"section_number": "1.1.a", "title": "Sub"}]
            }]
        }],
        "metadata": {"subject": "math", "extracted_at": "2024-05-01T10:00:00Z"}
    }"#;

    #[test]
    fn test_parse_sample_document() {
        let doc = AcademicDocument::from_json_str(SAMPLE).unwrap();
        assert_eq!(doc.parts.len(), 1);
        let section = &doc.parts[0].sections[0];
        assert_eq!(section.formulas[0].kind, FormulaKind::Theorem);
        assert!(section.formulas[0].is_key_formula);
        assert_eq!(doc.metadata.subject.as_deref(), Some("math"));
        assert!(doc.metadata.extracted_at.is_some());
    }

    #[test]
    fn test_unknown_formula_kind_falls_back() {
        let doc = AcademicDocument::from_json_str(SAMPLE).unwrap();
        assert_eq!(doc.parts[0].sections[0].formulas[1].kind, FormulaKind::Formula);
    }

    #[test]
    fn test_section_count_includes_subsections() {
        let doc = AcademicDocument::from_json_str(SAMPLE).unwrap();
        assert_eq!(doc.section_count(), 2);
    }

    #[test]
    fn test_example_full_text_joins_steps() {
        let doc = AcademicDocument::from_json_str(SAMPLE).unwrap();
        let text = doc.parts[0].sections[0].examples[0].full_text();
        assert_eq!(text, "Flip a coin.\nCount outcomes 2 heads or tails");
    }

    #[test]
    fn test_malformed_json_is_document_error() {
        let err = AcademicDocument::from_json_str("{\"title\": 3}").unwrap_err();
        assert!(matches!(err, AppError::Document(_)));
    }
}
