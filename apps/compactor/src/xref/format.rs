//! Reference display templates.
//!
//! A template is plain text with one `{id}` placeholder, e.g. `"see Ex. {id}"`.
//! The placeholder receives a display id: known prefixes (`Ex.`, `part-`) are
//! stripped, dotted section-style ids pass through.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::xref::ReferenceType;

pub const ID_PLACEHOLDER: &str = "{id}";

const STRIPPED_PREFIXES: &[&str] = &["Ex.", "part-"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceFormats(BTreeMap<ReferenceType, String>);

impl Default for ReferenceFormats {
    fn default() -> Self {
        Self(BTreeMap::from([
            (ReferenceType::Section, "see Section {id}".to_string()),
            (ReferenceType::Formula, "see Formula {id}".to_string()),
            (ReferenceType::Example, "see Ex. {id}".to_string()),
            (ReferenceType::Theorem, "see Theorem {id}".to_string()),
            (ReferenceType::Definition, "see Definition {id}".to_string()),
        ]))
    }
}

impl ReferenceFormats {
    pub fn template(&self, reference_type: ReferenceType) -> &str {
        self.0
            .get(&reference_type)
            .map(String::as_str)
            .unwrap_or("see {id}")
    }

    pub fn set(&mut self, reference_type: ReferenceType, template: impl Into<String>) {
        self.0.insert(reference_type, template.into());
    }

    /// Merges `other` over `self`; types absent from `other` keep their template.
    pub fn merge(&mut self, other: ReferenceFormats) {
        self.0.extend(other.0);
    }

    pub fn format(&self, reference_type: ReferenceType, target_id: &str) -> String {
        self.template(reference_type)
            .replace(ID_PLACEHOLDER, display_id(target_id))
    }

    /// The template as an anchored regex with `{id}` as a non-empty wildcard.
    pub fn pattern(&self, reference_type: ReferenceType) -> Result<Regex, regex::Error> {
        let escaped: Vec<String> = self
            .template(reference_type)
            .split(ID_PLACEHOLDER)
            .map(regex::escape)
            .collect();
        Regex::new(&format!("^{}$", escaped.join(".+")))
    }

    /// One compiled pattern per reference type.
    pub fn patterns(&self) -> Result<HashMap<ReferenceType, Regex>, regex::Error> {
        ReferenceType::ALL
            .iter()
            .map(|&t| self.pattern(t).map(|re| (t, re)))
            .collect()
    }
}

pub fn display_id(id: &str) -> &str {
    STRIPPED_PREFIXES
        .iter()
        .find_map(|prefix| id.strip_prefix(prefix))
        .unwrap_or(id)
}
