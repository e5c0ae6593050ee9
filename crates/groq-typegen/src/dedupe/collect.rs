//! Counting distinct object shapes across inferred type trees.

use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;

use super::Fingerprinter;
use crate::ir::{TypeNode, TYPE_DISCRIMINATOR};
use crate::naming::singularize;

/// One distinct object shape seen during collection.
#[derive(Debug)]
pub struct Occurrence {
    /// A representative node for the shape. All nodes sharing the
    /// fingerprint are structurally identical, so any of them serves.
    pub node: Arc<TypeNode>,
    /// How many times the shape occurred in the batch.
    pub count: usize,
    /// Human-readable name hint captured at first sighting.
    pub candidate_name: Option<String>,
}

/// Walks inferred type trees and counts every distinct object shape,
/// tracking a parent-key hint used to derive candidate names.
///
/// Scoped to one generation run; occurrences are kept in first-sighted
/// order.
#[derive(Debug, Default)]
pub struct OccurrenceCollector {
    occurrences: IndexMap<Arc<str>, Occurrence>,
}

impl OccurrenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(&mut self, fingerprints: &mut Fingerprinter, node: &Arc<TypeNode>) {
        self.visit(fingerprints, node, None);
    }

    pub fn occurrences(&self) -> &IndexMap<Arc<str>, Occurrence> {
        &self.occurrences
    }

    fn visit(
        &mut self,
        fingerprints: &mut Fingerprinter,
        node: &Arc<TypeNode>,
        parent_key: Option<&str>,
    ) {
        match node.as_ref() {
            TypeNode::Array { of } => {
                let singular = parent_key.map(singularize);
                self.visit(fingerprints, of, singular.as_deref());
            }
            // A union does not introduce a new naming context.
            TypeNode::Union { of } => {
                for member in of {
                    self.visit(fingerprints, member, parent_key);
                }
            }
            TypeNode::Object {
                attributes, rest, ..
            } => {
                let fingerprint = fingerprints.fingerprint(node);
                match self.occurrences.entry(fingerprint) {
                    Entry::Occupied(mut entry) => entry.get_mut().count += 1,
                    Entry::Vacant(entry) => {
                        entry.insert(Occurrence {
                            node: node.clone(),
                            count: 1,
                            candidate_name: candidate_name(node.as_ref(), parent_key),
                        });
                    }
                }
                // Attribute keys are the most locally specific hint and
                // always override the inherited parent key.
                for (key, attribute) in attributes {
                    self.visit(fingerprints, &attribute.value, Some(key));
                }
                if let Some(rest) = rest {
                    self.visit(fingerprints, rest, None);
                }
            }
            _ => {}
        }
    }
}

/// Derives a name hint for an object shape: the literal value of a
/// non-optional discriminator attribute wins, then the enclosing key.
fn candidate_name(node: &TypeNode, parent_key: Option<&str>) -> Option<String> {
    if let TypeNode::Object { attributes, .. } = node {
        if let Some(attribute) = attributes.get(TYPE_DISCRIMINATOR) {
            if !attribute.optional {
                if let TypeNode::String { value: Some(value) } = attribute.value.as_ref() {
                    return Some(value.clone());
                }
            }
        }
    }
    parent_key.map(|key| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ObjectAttribute;

    fn string() -> Arc<TypeNode> {
        Arc::new(TypeNode::String { value: None })
    }

    fn string_literal(value: &str) -> Arc<TypeNode> {
        Arc::new(TypeNode::String {
            value: Some(value.to_string()),
        })
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

    #[test]
    fn test_repeated_shapes_are_counted_once_per_occurrence() {
        let mut fingerprints = Fingerprinter::new();
        let mut collector = OccurrenceCollector::new();
        let a = object(vec![("title", ObjectAttribute::new(string()))]);
        let b = object(vec![("title", ObjectAttribute::new(string()))]);
        collector.collect(&mut fingerprints, &a);
        collector.collect(&mut fingerprints, &b);
        assert_eq!(collector.occurrences().len(), 1);
        let occurrence = collector.occurrences().values().next().unwrap();
        assert_eq!(occurrence.count, 2);
    }

    #[test]
    fn test_discriminator_literal_wins_over_parent_key() {
        let mut fingerprints = Fingerprinter::new();
        let mut collector = OccurrenceCollector::new();
        let inner = object(vec![
            ("_type", ObjectAttribute::new(string_literal("image"))),
            ("url", ObjectAttribute::new(string())),
        ]);
        let outer = object(vec![("cover", ObjectAttribute::new(inner))]);
        collector.collect(&mut fingerprints, &outer);
        let occurrence = collector
            .occurrences()
            .values()
            .find(|o| o.candidate_name.is_some())
            .unwrap();
        assert_eq!(occurrence.candidate_name.as_deref(), Some("image"));
    }

    #[test]
    fn test_optional_discriminator_falls_back_to_parent_key() {
        let mut fingerprints = Fingerprinter::new();
        let mut collector = OccurrenceCollector::new();
        let inner = object(vec![(
            "_type",
            ObjectAttribute::optional(string_literal("image")),
        )]);
        let outer = object(vec![("cover", ObjectAttribute::new(inner))]);
        collector.collect(&mut fingerprints, &outer);
        let occurrence = collector
            .occurrences()
            .values()
            .find(|o| o.candidate_name.is_some())
            .unwrap();
        assert_eq!(occurrence.candidate_name.as_deref(), Some("cover"));
    }

    #[test]
    fn test_array_singularizes_the_parent_key() {
        let mut fingerprints = Fingerprinter::new();
        let mut collector = OccurrenceCollector::new();
        let element = object(vec![("name", ObjectAttribute::new(string()))]);
        let outer = object(vec![(
            "categories",
            ObjectAttribute::new(Arc::new(TypeNode::Array { of: element })),
        )]);
        collector.collect(&mut fingerprints, &outer);
        let occurrence = collector
            .occurrences()
            .values()
            .find(|o| o.candidate_name.as_deref() == Some("category"));
        assert!(occurrence.is_some());
    }

    #[test]
    fn test_union_preserves_the_parent_key() {
        let mut fingerprints = Fingerprinter::new();
        let mut collector = OccurrenceCollector::new();
        let member = object(vec![("name", ObjectAttribute::new(string()))]);
        let outer = object(vec![(
            "author",
            ObjectAttribute::new(Arc::new(TypeNode::Union {
                of: vec![member, Arc::new(TypeNode::Null)],
            })),
        )]);
        collector.collect(&mut fingerprints, &outer);
        let occurrence = collector
            .occurrences()
            .values()
            .find(|o| o.candidate_name.as_deref() == Some("author"));
        assert!(occurrence.is_some());
    }

    #[test]
    fn test_top_level_object_has_no_candidate_name() {
        let mut fingerprints = Fingerprinter::new();
        let mut collector = OccurrenceCollector::new();
        let node = object(vec![("name", ObjectAttribute::new(string()))]);
        collector.collect(&mut fingerprints, &node);
        let occurrence = collector.occurrences().values().next().unwrap();
        assert!(occurrence.candidate_name.is_none());
    }

    #[test]
    fn test_rest_clears_the_parent_key() {
        let mut fingerprints = Fingerprinter::new();
        let mut collector = OccurrenceCollector::new();
        let spread = object(vec![("width", ObjectAttribute::new(string()))]);
        let outer = Arc::new(TypeNode::Object {
            attributes: [(
                "images".to_string(),
                ObjectAttribute::new(Arc::new(TypeNode::Object {
                    attributes: IndexMap::new(),
                    rest: Some(spread),
                    dereferences_to: None,
                })),
            )]
            .into_iter()
            .collect(),
            rest: None,
            dereferences_to: None,
        });
        collector.collect(&mut fingerprints, &outer);
        let spread_occurrence = collector
            .occurrences()
            .values()
            .find(|o| match o.node.as_ref() {
                TypeNode::Object { attributes, .. } => attributes.contains_key("width"),
                _ => false,
            })
            .unwrap();
        assert!(spread_occurrence.candidate_name.is_none());
    }
}
