//! Classifier label → canonical item key
//!
//! Exact, case-sensitive lookup against the classifier's fixed vocabulary.
//! No fuzzy or substring matching: an unknown raw label is simply unmapped,
//! and the logged predictions tell the operator what to add.

use std::collections::BTreeMap;

use super::knowledge_base::KnowledgeBase;

const BUILTIN_MAPPINGS: [(&str, &str); 11] = [
    ("water_bottle", "bottle"),
    ("soda_bottle", "bottle"),
    ("pop_bottle", "bottle"),
    ("beer_can", "can"),
    ("apple", "apple"),
    ("Granny_Smith", "apple"),
    ("banana", "banana"),
    ("plastic_bag", "bag"),
    ("shopping_bag", "bag"),
    ("coffee_mug", "cup"),
    ("paper_towel", "cup"),
];

/// A raw label whose target key is missing from the knowledge base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingMapping {
    pub raw_label: String,
    pub item_key: String,
}

/// Raw classifier label → canonical item key (many-to-one)
#[derive(Debug, Clone)]
pub struct LabelResolver {
    mappings: BTreeMap<String, String>,
}

impl Default for LabelResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LabelResolver {
    /// Resolver with the built-in mapping table
    pub fn builtin() -> Self {
        Self {
            mappings: BUILTIN_MAPPINGS
                .iter()
                .map(|(label, key)| (label.to_string(), key.to_string()))
                .collect(),
        }
    }

    /// Merge additional mappings over the current table
    ///
    /// An entry for a raw label that already exists replaces the old target.
    pub fn with_mappings<I, L, K>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (L, K)>,
        L: Into<String>,
        K: Into<String>,
    {
        for (label, key) in extra {
            self.mappings.insert(label.into(), key.into());
        }
        self
    }

    /// Canonical key for a raw label, if mapped
    pub fn resolve(&self, raw_label: &str) -> Option<&str> {
        self.mappings.get(raw_label).map(String::as_str)
    }

    /// Every mapping whose key the knowledge base does not know
    pub fn dangling_mappings(&self, knowledge_base: &KnowledgeBase) -> Vec<DanglingMapping> {
        self.mappings
            .iter()
            .filter(|(_, key)| !knowledge_base.contains(key))
            .map(|(label, key)| DanglingMapping {
                raw_label: label.clone(),
                item_key: key.clone(),
            })
            .collect()
    }

    /// Check that every mapped key exists in the knowledge base
    pub fn validate_against(
        &self,
        knowledge_base: &KnowledgeBase,
    ) -> Result<(), Vec<DanglingMapping>> {
        let dangling = self.dangling_mappings(knowledge_base);
        if dangling.is_empty() {
            Ok(())
        } else {
            Err(dangling)
        }
    }

    /// (raw label, item key) pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mappings.iter().map(|(l, k)| (l.as_str(), k.as_str()))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
