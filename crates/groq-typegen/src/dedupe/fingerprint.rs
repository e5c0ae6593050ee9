//! Canonical structural signatures for type trees.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::ir::TypeNode;

/// Computes order-independent structural fingerprints.
///
/// Two trees produce the same fingerprint iff they are structurally
/// identical: same kinds, same literal values, same attribute sets with the
/// same optionality, same rest/dereference markers. Object attribute order
/// and union member order never affect the result.
///
/// Results are memoized by node identity, so shared subtrees are only
/// walked once per generation run.
#[derive(Debug, Default)]
pub struct Fingerprinter {
    cache: HashMap<NodeKey, Arc<str>>,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fingerprint(&mut self, node: &Arc<TypeNode>) -> Arc<str> {
        if let Some(cached) = self.cache.get(&NodeKey(node.clone())) {
            return cached.clone();
        }
        let fingerprint: Arc<str> = self.compute(node).into();
        self.cache.insert(NodeKey(node.clone()), fingerprint.clone());
        fingerprint
    }

    fn compute(&mut self, node: &Arc<TypeNode>) -> String {
        match node.as_ref() {
            TypeNode::Unknown => "unknown".to_string(),
            TypeNode::Null => "null".to_string(),
            TypeNode::Boolean { value } => match value {
                Some(v) => format!("b:{}", v),
                None => "b".to_string(),
            },
            TypeNode::Number { value } => match value {
                Some(v) => format!("n:{}", v),
                None => "n".to_string(),
            },
            // String literals keep their quotes so `s:"5"` can never collide
            // with the number fingerprint `n:5`.
            TypeNode::String { value } => match value {
                Some(v) => format!("s:{:?}", v),
                None => "s".to_string(),
            },
            TypeNode::Array { of } => format!("[{}]", self.fingerprint(of)),
            // Named references stay unresolved, so recursive schemas cannot
            // send fingerprinting into a loop.
            TypeNode::Inline { name } => format!("inline:{}", name),
            TypeNode::Union { of } => {
                let mut members: Vec<String> = of
                    .iter()
                    .map(|member| self.fingerprint(member).to_string())
                    .collect();
                members.sort();
                format!("union({})", members.join("|"))
            }
            TypeNode::Object {
                attributes,
                rest,
                dereferences_to,
            } => {
                let mut entries: Vec<String> = attributes
                    .iter()
                    .map(|(key, attribute)| {
                        let optional = if attribute.optional { "?" } else { "" };
                        format!("{}{}:{}", key, optional, self.fingerprint(&attribute.value))
                    })
                    .collect();
                entries.sort();
                let mut body = entries.join(";");
                if let Some(rest) = rest {
                    body.push_str(&format!(";...{}", self.fingerprint(rest)));
                }
                if let Some(target) = dereferences_to {
                    body.push_str(&format!(";->{}", target));
                }
                format!("{{{}}}", body)
            }
        }
    }
}

/// Hashes and compares by `Arc` pointer identity, keeping the node alive so
/// an address is never reused while cached.
#[derive(Debug)]
struct NodeKey(Arc<TypeNode>);

impl PartialEq for NodeKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for NodeKey {}

impl Hash for NodeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ObjectAttribute;
    use indexmap::IndexMap;

    fn string() -> Arc<TypeNode> {
        Arc::new(TypeNode::String { value: None })
    }

    fn number() -> Arc<TypeNode> {
        Arc::new(TypeNode::Number { value: None })
    }

    fn object(attributes: Vec<(&str, ObjectAttribute)>) -> Arc<TypeNode> {
        Arc::new(TypeNode::Object {
            attributes: attributes
                .into_iter()
                .map(|(key, attribute)| (key.to_string(), attribute))
                .collect::<IndexMap<_, _>>(),
            rest: None,
            dereferences_to: None,
        })
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let mut fingerprints = Fingerprinter::new();
        let a = object(vec![
            ("title", ObjectAttribute::new(string())),
            ("count", ObjectAttribute::new(number())),
        ]);
        let b = object(vec![
            ("count", ObjectAttribute::new(number())),
            ("title", ObjectAttribute::new(string())),
        ]);
        assert_eq!(fingerprints.fingerprint(&a), fingerprints.fingerprint(&b));
    }

    #[test]
    fn test_union_member_order_does_not_matter() {
        let mut fingerprints = Fingerprinter::new();
        let a = Arc::new(TypeNode::Union {
            of: vec![string(), number()],
        });
        let b = Arc::new(TypeNode::Union {
            of: vec![number(), string()],
        });
        assert_eq!(fingerprints.fingerprint(&a), fingerprints.fingerprint(&b));
    }

    #[test]
    fn test_optionality_changes_the_fingerprint() {
        let mut fingerprints = Fingerprinter::new();
        let required = object(vec![("title", ObjectAttribute::new(string()))]);
        let optional = object(vec![("title", ObjectAttribute::optional(string()))]);
        assert_ne!(
            fingerprints.fingerprint(&required),
            fingerprints.fingerprint(&optional)
        );
    }

    #[test]
    fn test_literal_values_change_the_fingerprint() {
        let mut fingerprints = Fingerprinter::new();
        let plain = Arc::new(TypeNode::String { value: None });
        let literal = Arc::new(TypeNode::String {
            value: Some("image".to_string()),
        });
        assert_ne!(
            fingerprints.fingerprint(&plain),
            fingerprints.fingerprint(&literal)
        );
    }

    #[test]
    fn test_string_literal_never_collides_with_number_literal() {
        let mut fingerprints = Fingerprinter::new();
        let string_five = Arc::new(TypeNode::String {
            value: Some("5".to_string()),
        });
        let number_five = Arc::new(TypeNode::Number { value: Some(5.0) });
        assert_ne!(
            fingerprints.fingerprint(&string_five),
            fingerprints.fingerprint(&number_five)
        );
    }

    #[test]
    fn test_rest_and_dereference_markers_are_distinguished() {
        let mut fingerprints = Fingerprinter::new();
        let plain = object(vec![("name", ObjectAttribute::new(string()))]);
        let with_rest = Arc::new(TypeNode::Object {
            attributes: [("name".to_string(), ObjectAttribute::new(string()))]
                .into_iter()
                .collect(),
            rest: Some(Arc::new(TypeNode::Unknown)),
            dereferences_to: None,
        });
        let with_deref = Arc::new(TypeNode::Object {
            attributes: [("name".to_string(), ObjectAttribute::new(string()))]
                .into_iter()
                .collect(),
            rest: None,
            dereferences_to: Some("post".to_string()),
        });
        let a = fingerprints.fingerprint(&plain);
        let b = fingerprints.fingerprint(&with_rest);
        let c = fingerprints.fingerprint(&with_deref);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_inline_references_are_not_resolved() {
        let mut fingerprints = Fingerprinter::new();
        let node = Arc::new(TypeNode::Inline {
            name: "post".to_string(),
        });
        assert_eq!(&*fingerprints.fingerprint(&node), "inline:post");
    }

    #[test]
    fn test_same_node_returns_the_cached_string() {
        let mut fingerprints = Fingerprinter::new();
        let node = object(vec![("title", ObjectAttribute::new(string()))]);
        let first = fingerprints.fingerprint(&node);
        let second = fingerprints.fingerprint(&node);
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_structurally_equal_but_distinct_nodes_agree() {
        let mut fingerprints = Fingerprinter::new();
        let a = object(vec![("title", ObjectAttribute::new(string()))]);
        let b = object(vec![("title", ObjectAttribute::new(string()))]);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(fingerprints.fingerprint(&a), fingerprints.fingerprint(&b));
    }
}
