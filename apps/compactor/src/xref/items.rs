//! Referenceable Item Index: every document element a reference may target,
//! plus the text passages references are discovered in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::document::{AcademicDocument, FormulaKind, Section};
use crate::xref::{ReferenceType, XrefError};

/// Characters kept in an item's content snippet.
const SNIPPET_CHARS: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemLocation {
    pub part_index: usize,
    pub section_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceableItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ReferenceType,
    pub title: String,
    pub content: String,
    pub location: ItemLocation,
    pub section_number: String,
}

/// Items in document order with an id lookup.
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    items: Vec<ReferenceableItem>,
    by_id: HashMap<String, usize>,
}

impl ItemIndex {
    /// Rejects a second item with an id already in the index.
    pub fn insert(&mut self, item: ReferenceableItem) -> Result<(), XrefError> {
        if self.by_id.contains_key(&item.id) {
            return Err(XrefError::DuplicateItemId { id: item.id });
        }
        self.by_id.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceableItem> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceableItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A passage that may mention other items: a section body or a worked example.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSource {
    pub source_id: String,
    pub text: String,
    pub location: ItemLocation,
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Builds the index: one item per part (`part-<n>`), per section, per formula
/// and per worked example. Subsections share their parent's location.
pub fn extract_referenceable_items(document: &AcademicDocument) -> Result<ItemIndex, XrefError> {
    let mut index = ItemIndex::default();

    for (part_index, part) in document.parts.iter().enumerate() {
        index.insert(ReferenceableItem {
            id: format!("part-{}", part.part_number),
            item_type: ReferenceType::Section,
            title: part.title.clone(),
            content: snippet(&part.title),
            location: ItemLocation {
                part_index,
                section_index: 0,
            },
            section_number: part.part_number.to_string(),
        })?;

        for (section_index, section) in part.sections.iter().enumerate() {
            let location = ItemLocation {
                part_index,
                section_index,
            };
            insert_section_items(section, location, &mut index)?;
        }
    }

    Ok(index)
}

fn insert_section_items(
    section: &Section,
    location: ItemLocation,
    index: &mut ItemIndex,
) -> Result<(), XrefError> {
    index.insert(ReferenceableItem {
        id: section.section_number.clone(),
        item_type: ReferenceType::Section,
        title: section.title.clone(),
        content: snippet(&section.content),
        location,
        section_number: section.section_number.clone(),
    })?;

    for formula in &section.formulas {
        let title = if formula.context.trim().is_empty() {
            formula.latex.clone()
        } else {
            formula.context.clone()
        };
        index.insert(ReferenceableItem {
            id: formula.id.clone(),
            item_type: ReferenceType::from(formula.kind),
            title,
            content: snippet(&formula.latex),
            location,
            section_number: section.section_number.clone(),
        })?;
    }

    for example in &section.examples {
        index.insert(ReferenceableItem {
            id: example.id.clone(),
            item_type: ReferenceType::Example,
            title: example.title.clone(),
            content: snippet(&example.problem),
            location,
            section_number: section.section_number.clone(),
        })?;
    }

    for sub in &section.subsections {
        insert_section_items(sub, location, index)?;
    }
    Ok(())
}

/// Every section body and every worked example, in document order.
pub fn collect_sources(document: &AcademicDocument) -> Vec<ReferenceSource> {
    let mut sources = Vec::new();
    for (part_index, part) in document.parts.iter().enumerate() {
        for (section_index, section) in part.sections.iter().enumerate() {
            let location = ItemLocation {
                part_index,
                section_index,
            };
            push_section_sources(section, location, &mut sources);
        }
    }
    sources
}

fn push_section_sources(section: &Section, location: ItemLocation, out: &mut Vec<ReferenceSource>) {
    if !section.content.trim().is_empty() {
        out.push(ReferenceSource {
            source_id: section.section_number.clone(),
            text: section.content.clone(),
            location,
        });
    }
    for example in &section.examples {
        out.push(ReferenceSource {
            source_id: example.id.clone(),
            text: example.full_text(),
            location,
        });
    }
    for sub in &section.subsections {
        push_section_sources(sub, location, out);
    }
}

impl From<FormulaKind> for ReferenceType {
    fn from(kind: FormulaKind) -> Self {
        match kind {
            FormulaKind::Theorem => ReferenceType::Theorem,
            FormulaKind::Definition => ReferenceType::Definition,
            FormulaKind::Formula | FormulaKind::Identity | FormulaKind::Property => {
                ReferenceType::Formula
            }
        }
    }
}

fn snippet(text: &str) -> String {
    text.trim().chars().take(SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{Formula, Part, SolutionStep, WorkedExample};

    fn section(number: &str, title: &str, content: &str) -> Section {
        Section {
            section_number: number.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            formulas: vec![],
            examples: vec![],
            subsections: vec![],
        }
    }

    fn sample_document() -> AcademicDocument {
        let mut s11 = section("1.1", "Events", "Sample spaces and events.");
        s11.formulas.push(Formula {
            id: "1.1.1".to_string(),
            latex: "P(A^c) = 1 - P(A)".to_string(),
            context: "Complement rule".to_string(),
            kind: FormulaKind::Formula,
            is_key_formula: true,
        });
        s11.formulas.push(Formula {
            id: "1.1.2".to_string(),
            latex: "P(\\Omega) = 1".to_string(),
            context: String::new(),
            kind: FormulaKind::Definition,
            is_key_formula: false,
        });
        s11.examples.push(WorkedExample {
            id: "Ex.1.1.1".to_string(),
            title: "Die roll".to_string(),
            problem: "Roll a fair die.".to_string(),
            solution: vec![SolutionStep {
                step_number: 1,
                description: "List outcomes".to_string(),
                formula: None,
                explanation: String::new(),
            }],
            subtopic: None,
        });
        s11.subsections.push(section("1.1.a", "Notation", ""));

        AcademicDocument {
            title: "Probability".to_string(),
            parts: vec![
                Part {
                    part_number: 1,
                    title: "Foundations".to_string(),
                    sections: vec![s11, section("1.2", "Counting", "Permutations.")],
                },
                Part {
                    part_number: 2,
                    title: "Distributions".to_string(),
                    sections: vec![section("2.1", "Binomial", "")],
                },
            ],
            metadata: Default::default(),
        }
    }

    #[test]
    fn test_extract_items_in_document_order() {
        let index = extract_referenceable_items(&sample_document()).unwrap();
        let ids: Vec<&str> = index.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["part-1", "1.1", "1.1.1", "1.1.2", "Ex.1.1.1", "1.1.a", "1.2", "part-2", "2.1"]
        );
    }

    #[test]
    fn test_item_types_and_locations() {
        let index = extract_referenceable_items(&sample_document()).unwrap();
        assert_eq!(index.get("part-2").unwrap().item_type, ReferenceType::Section);
        assert_eq!(index.get("1.1.1").unwrap().item_type, ReferenceType::Formula);
        assert_eq!(index.get("1.1.2").unwrap().item_type, ReferenceType::Definition);
        assert_eq!(index.get("Ex.1.1.1").unwrap().item_type, ReferenceType::Example);

        let binomial = index.get("2.1").unwrap();
        assert_eq!(
            binomial.location,
            ItemLocation {
                part_index: 1,
                section_index: 0
            }
        );
        // Subsections inherit the parent's location.
        assert_eq!(index.get("1.1.a").unwrap().location, index.get("1.1").unwrap().location);
    }

    #[test]
    fn test_formula_title_falls_back_to_latex() {
        let index = extract_referenceable_items(&sample_document()).unwrap();
        assert_eq!(index.get("1.1.1").unwrap().title, "Complement rule");
        assert_eq!(index.get("1.1.2").unwrap().title, "P(\\Omega) = 1");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut doc = sample_document();
        doc.parts[0].sections[1].formulas.push(Formula {
            id: "1.1.1".to_string(),
            latex: "x".to_string(),
            context: String::new(),
            kind: FormulaKind::Formula,
            is_key_formula: false,
        });
        let err = extract_referenceable_items(&doc).unwrap_err();
        assert!(matches!(err, XrefError::DuplicateItemId { ref id } if id == "1.1.1"));
    }

    #[test]
    fn test_collect_sources_skips_empty_sections() {
        let sources = collect_sources(&sample_document());
        let ids: Vec<&str> = sources.iter().map(|s| s.source_id.as_str()).collect();
        assert_eq!(ids, vec!["1.1", "Ex.1.1.1", "1.2"]);
        assert_eq!(sources[1].text, "Roll a fair die.\nList outcomes");
    }

    #[test]
    fn test_snippet_truncates_on_chars() {
        let long = "é".repeat(SNIPPET_CHARS + 10);
        assert_eq!(snippet(&long).chars().count(), SNIPPET_CHARS);
    }
}
