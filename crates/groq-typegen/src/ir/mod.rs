//! The inferred-type tree consumed from the query-language type system.
//!
//! `TypeNode` is the recursive, immutable tree the external evaluator
//! produces for a query (and that schema type declarations are expressed
//! in). Nodes are shared via `Arc` and never mutated after construction;
//! structural equality is defined by content, not identity.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute name that discriminates document and object variants.
pub const TYPE_DISCRIMINATOR: &str = "_type";

/// Attribute name carrying the per-element key inside arrays.
pub const KEY_ATTRIBUTE: &str = "_key";

/// Attribute name carrying a reference id.
pub const REFERENCE_ATTRIBUTE: &str = "_ref";

/// A node in an inferred or declared type tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeNode {
    Unknown,
    Null,
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<bool>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    /// Homogeneous array of one element type.
    Array { of: Arc<TypeNode> },
    /// Ordered union of member types.
    Union { of: Vec<Arc<TypeNode>> },
    /// Forward reference to a named type, by name. Never resolved while
    /// fingerprinting, so self-referential schemas cannot loop.
    Inline { name: String },
    Object {
        /// Attributes in their original declaration order.
        #[serde(default)]
        attributes: IndexMap<String, ObjectAttribute>,
        /// Additional attributes spread into the object.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rest: Option<Arc<TypeNode>>,
        /// Named schema type this object resolves to when dereferenced.
        #[serde(
            rename = "dereferencesTo",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        dereferences_to: Option<String>,
    },
}

/// An object attribute: a value type plus an optionality flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAttribute {
    pub value: Arc<TypeNode>,
    #[serde(default)]
    pub optional: bool,
}

impl ObjectAttribute {
    pub fn new(value: Arc<TypeNode>) -> Self {
        Self {
            value,
            optional: false,
        }
    }

    pub fn optional(value: Arc<TypeNode>) -> Self {
        Self {
            value,
            optional: true,
        }
    }
}

/// Node counts gathered from one inferred type tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    /// Every node in the tree, wrappers included.
    pub all_types: usize,
    /// Nodes of unknown type.
    pub unknown_types: usize,
    /// Unions with no members.
    pub empty_unions: usize,
}

impl UsageStats {
    /// Walks the tree and counts every node once. `inline` references are
    /// leaves; the referent is not visited.
    pub fn of(node: &TypeNode) -> Self {
        let mut stats = Self::default();
        stats.visit(node);
        stats
    }

    fn visit(&mut self, node: &TypeNode) {
        self.all_types += 1;
        match node {
            TypeNode::Unknown => self.unknown_types += 1,
            TypeNode::Array { of } => self.visit(of),
            TypeNode::Union { of } => {
                if of.is_empty() {
                    self.empty_unions += 1;
                }
                for member in of {
                    self.visit(member);
                }
            }
            TypeNode::Object {
                attributes, rest, ..
            } => {
                for attribute in attributes.values() {
                    self.visit(&attribute.value);
                }
                if let Some(rest) = rest {
                    self.visit(rest);
                }
            }
            _ => {}
        }
    }
}
