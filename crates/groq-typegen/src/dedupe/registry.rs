//! Building the shared-type registry from collected occurrences.

use std::sync::Arc;

use indexmap::IndexMap;

use super::Occurrence;
use crate::ir::{TypeNode, KEY_ATTRIBUTE, REFERENCE_ATTRIBUTE, TYPE_DISCRIMINATOR};
use crate::naming::{sanitize_identifier, IdentifierRegistry};

/// Shapes must occur at least this often to be worth sharing.
const MIN_OCCURRENCES: usize = 2;

/// Shapes must carry at least this many meaningful attributes.
const MIN_MEANINGFUL_ATTRIBUTES: usize = 2;

/// Base name for shapes with no usable candidate name.
const FALLBACK_BASE_NAME: &str = "InlineType";

/// A shared named type extracted from repeated inline shapes.
#[derive(Debug)]
pub struct RegistryEntry {
    pub identifier: String,
    pub node: Arc<TypeNode>,
}

/// Run-scoped mapping from fingerprint to the shared type that replaces it.
/// Immutable once built; consulted while lowering every query's type tree.
#[derive(Debug, Default)]
pub struct DedupeRegistry {
    entries: IndexMap<Arc<str>, RegistryEntry>,
}

impl DedupeRegistry {
    /// Selects occurrences worth sharing and assigns each a unique name.
    ///
    /// Records are visited in encounter order and names are reserved
    /// sequentially against `identifiers`, so collision numbering is
    /// deterministic for a fixed input order.
    pub fn build(
        occurrences: &IndexMap<Arc<str>, Occurrence>,
        identifiers: &mut IdentifierRegistry,
    ) -> Self {
        let mut entries = IndexMap::new();
        for (fingerprint, occurrence) in occurrences {
            if occurrence.count < MIN_OCCURRENCES {
                continue;
            }
            if meaningful_attribute_count(&occurrence.node) < MIN_MEANINGFUL_ATTRIBUTES {
                continue;
            }
            let base = match &occurrence.candidate_name {
                Some(candidate) => format!("Inline{}", sanitize_identifier(candidate)),
                None => FALLBACK_BASE_NAME.to_string(),
            };
            let identifier = identifiers.reserve(&base);
            entries.insert(
                fingerprint.clone(),
                RegistryEntry {
                    identifier,
                    node: occurrence.node.clone(),
                },
            );
        }
        Self { entries }
    }

    pub fn get(&self, fingerprint: &str) -> Option<&RegistryEntry> {
        self.entries.get(fingerprint)
    }

    /// Entries in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counts attributes that carry real shape information, ignoring the
/// structural bookkeeping keys.
fn meaningful_attribute_count(node: &TypeNode) -> usize {
    match node {
        TypeNode::Object { attributes, .. } => attributes
            .keys()
            .filter(|key| {
                let key = key.as_str();
                key != TYPE_DISCRIMINATOR && key != KEY_ATTRIBUTE && key != REFERENCE_ATTRIBUTE
            })
            .count(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedupe::{Fingerprinter, OccurrenceCollector};
    use crate::ir::ObjectAttribute;

    fn string() -> Arc<TypeNode> {
        Arc::new(TypeNode::String { value: None })
    }

    fn object(attributes: Vec<(&str, ObjectAttribute)>) -> Arc<TypeNode> {
        Arc::new(TypeNode::Object {
            attributes: attributes
                .into_iter()
                .map(|(key, attribute)| (key.to_string(), attribute))
                .collect(),
            rest: None,
            dereferences_to: None,
        })
    }

    fn two_field_object() -> Arc<TypeNode> {
        object(vec![
            ("title", ObjectAttribute::new(string())),
            ("url", ObjectAttribute::new(string())),
        ])
    }

    fn collect_all(nodes: &[Arc<TypeNode>]) -> (Fingerprinter, OccurrenceCollector) {
        let mut fingerprints = Fingerprinter::new();
        let mut collector = OccurrenceCollector::new();
        for node in nodes {
            collector.collect(&mut fingerprints, node);
        }
        (fingerprints, collector)
    }

    #[test]
    fn test_shape_occurring_twice_is_extracted() {
        let (_, collector) = collect_all(&[two_field_object(), two_field_object()]);
        let mut identifiers = IdentifierRegistry::new();
        let registry = DedupeRegistry::build(collector.occurrences(), &mut identifiers);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_shape_occurring_once_is_not_extracted() {
        let (_, collector) = collect_all(&[two_field_object()]);
        let mut identifiers = IdentifierRegistry::new();
        let registry = DedupeRegistry::build(collector.occurrences(), &mut identifiers);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_shape_with_one_meaningful_attribute_is_not_extracted() {
        let shape = || {
            object(vec![
                ("_type", ObjectAttribute::new(string())),
                ("_key", ObjectAttribute::new(string())),
                ("_ref", ObjectAttribute::new(string())),
                ("title", ObjectAttribute::new(string())),
            ])
        };
        let (_, collector) = collect_all(&[shape(), shape()]);
        let mut identifiers = IdentifierRegistry::new();
        let registry = DedupeRegistry::build(collector.occurrences(), &mut identifiers);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_candidate_name_becomes_inline_prefixed_identifier() {
        let shape = || {
            object(vec![(
                "slug",
                ObjectAttribute::new(object(vec![
                    ("current", ObjectAttribute::new(string())),
                    ("source", ObjectAttribute::new(string())),
                ])),
            )])
        };
        let (_, collector) = collect_all(&[shape(), shape()]);
        let mut identifiers = IdentifierRegistry::new();
        let registry = DedupeRegistry::build(collector.occurrences(), &mut identifiers);
        let entry = registry.iter().next().unwrap();
        assert_eq!(entry.identifier, "InlineSlug");
    }

    #[test]
    fn test_existing_identifier_forces_numbered_name() {
        let shape = || {
            object(vec![(
                "slug",
                ObjectAttribute::new(object(vec![
                    ("current", ObjectAttribute::new(string())),
                    ("source", ObjectAttribute::new(string())),
                ])),
            )])
        };
        let (_, collector) = collect_all(&[shape(), shape()]);
        let mut identifiers = IdentifierRegistry::new();
        identifiers.insert("InlineSlug");
        let registry = DedupeRegistry::build(collector.occurrences(), &mut identifiers);
        let entry = registry.iter().next().unwrap();
        assert_eq!(entry.identifier, "InlineSlug_2");
    }

    #[test]
    fn test_distinct_shapes_with_the_same_candidate_are_numbered() {
        let first = || {
            object(vec![(
                "item",
                ObjectAttribute::new(object(vec![
                    ("name", ObjectAttribute::new(string())),
                    ("url", ObjectAttribute::new(string())),
                ])),
            )])
        };
        let second = || {
            object(vec![(
                "item",
                ObjectAttribute::new(object(vec![
                    ("name", ObjectAttribute::new(string())),
                    ("price", ObjectAttribute::new(string())),
                ])),
            )])
        };
        let (_, collector) = collect_all(&[first(), first(), second(), second()]);
        let mut identifiers = IdentifierRegistry::new();
        let registry = DedupeRegistry::build(collector.occurrences(), &mut identifiers);
        let names: Vec<&str> = registry.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(names, vec!["InlineItem", "InlineItem_2"]);
    }

    #[test]
    fn test_shape_without_candidate_uses_fallback_base() {
        let shape = || two_field_object();
        let (_, collector) = collect_all(&[shape(), shape()]);
        let mut identifiers = IdentifierRegistry::new();
        let registry = DedupeRegistry::build(collector.occurrences(), &mut identifiers);
        let entry = registry.iter().next().unwrap();
        assert_eq!(entry.identifier, "InlineType");
    }
}
