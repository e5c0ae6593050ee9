//! Schema model and the schema type compiler.

mod compiler;

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostic::TypegenError;
use crate::ir::{ObjectAttribute, TypeNode};

pub use compiler::{CompiledSchemaType, EvaluatedType, SchemaCompiler};

/// An ordered set of named type declarations extracted from a content
/// schema. This is the wire format the external schema extractor produces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    pub entries: Vec<SchemaEntry>,
}

impl Schema {
    pub fn new(entries: Vec<SchemaEntry>) -> Self {
        Self { entries }
    }

    /// Parses a schema from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, TypegenError> {
        serde_json::from_str(json).map_err(|e| TypegenError::InvalidSchema {
            message: e.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One named top-level declaration in a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaEntry {
    /// A document shape, declared as a named attribute map.
    Document {
        name: String,
        attributes: IndexMap<String, ObjectAttribute>,
    },
    /// A named type alias over an arbitrary type.
    Type { name: String, value: Arc<TypeNode> },
}

impl SchemaEntry {
    pub fn name(&self) -> &str {
        match self {
            SchemaEntry::Document { name, .. } => name,
            SchemaEntry::Type { name, .. } => name,
        }
    }

    /// The entry's declared shape as a type tree.
    pub fn to_type_node(&self) -> Arc<TypeNode> {
        match self {
            SchemaEntry::Document { attributes, .. } => Arc::new(TypeNode::Object {
                attributes: attributes.clone(),
                rest: None,
                dereferences_to: None,
            }),
            SchemaEntry::Type { value, .. } => value.clone(),
        }
    }
}
