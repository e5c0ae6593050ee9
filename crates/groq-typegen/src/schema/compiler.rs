//! Compiling a schema into named type declarations.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::codegen::{
    render_declaration, TsDeclaration, TypeLowerer, TypeResolver, ALL_SCHEMA_TYPES_NAME,
    KEYED_ARRAY_NAME, REFERENCE_MARKER_NAME,
};
use crate::diagnostic::{EvaluatorError, TypegenError};
use crate::evaluator::QueryTypeEvaluator;
use crate::ir::{TypeNode, UsageStats};
use crate::naming::IdentifierRegistry;

use super::Schema;

/// One compiled schema entry.
#[derive(Debug, Clone)]
pub struct CompiledSchemaType {
    /// The declared name from the schema.
    pub name: String,
    /// The generated, collision-free identifier.
    pub identifier: String,
    /// The entry's declared shape.
    pub node: Arc<TypeNode>,
    /// The compiled declaration.
    pub declaration: TsDeclaration,
    /// The declaration's rendered source.
    pub source: String,
}

/// A query's inferred result type plus the node counts of the tree.
#[derive(Debug, Clone)]
pub struct EvaluatedType {
    pub node: Arc<TypeNode>,
    pub stats: UsageStats,
}

/// Compiles a schema into a table of named type declarations and answers
/// type lookups during query lowering.
///
/// Identifiers are assigned once, in schema declaration order, at
/// construction; the tables never change for the lifetime of an instance.
/// Schema types are never deduplicated against each other — deduplication
/// only applies to inferred, unnamed query-result shapes.
#[derive(Debug)]
pub struct SchemaCompiler {
    schema: Schema,
    identifiers: IdentifierRegistry,
    entries: Vec<CompiledSchemaType>,
    by_name: HashMap<String, usize>,
}

impl SchemaCompiler {
    /// Compiles every schema entry. Duplicate declared names are a fatal
    /// configuration error.
    pub fn new(schema: Schema) -> Result<Self, TypegenError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for entry in schema.iter() {
            if !seen.insert(entry.name()) {
                return Err(TypegenError::DuplicateTypeName {
                    name: entry.name().to_string(),
                });
            }
        }

        // The fixed output names are reserved before any schema identifier,
        // so a colliding declared name deterministically gets a suffix.
        let mut identifiers = IdentifierRegistry::new();
        for fixed in [
            ALL_SCHEMA_TYPES_NAME,
            REFERENCE_MARKER_NAME,
            KEYED_ARRAY_NAME,
        ] {
            identifiers.insert(fixed);
        }

        let mut planned = Vec::with_capacity(schema.len());
        let mut resolver: HashMap<String, String> = HashMap::new();
        for entry in schema.iter() {
            let identifier = identifiers.reserve(entry.name());
            resolver.insert(entry.name().to_string(), identifier.clone());
            planned.push((entry.name().to_string(), identifier, entry.to_type_node()));
        }

        let mut entries = Vec::with_capacity(planned.len());
        let mut by_name = HashMap::new();
        let mut lowerer = TypeLowerer::new(&resolver);
        for (index, (name, identifier, node)) in planned.into_iter().enumerate() {
            let ty = lowerer.lower_alias(&node);
            let declaration = TsDeclaration::TypeAlias {
                name: identifier.clone(),
                ty,
                comments: Vec::new(),
            };
            let source = render_declaration(&declaration);
            by_name.insert(name.clone(), index);
            entries.push(CompiledSchemaType {
                name,
                identifier,
                node,
                declaration,
                source,
            });
        }

        Ok(Self {
            schema,
            identifiers,
            entries,
            by_name,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get_type(&self, name: &str) -> Option<&CompiledSchemaType> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }

    /// Declared names in original schema order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Compiled entries in original schema order.
    pub fn entries(&self) -> &[CompiledSchemaType] {
        &self.entries
    }

    /// Every identifier reserved so far, including the fixed output names.
    pub fn identifiers(&self) -> &IdentifierRegistry {
        &self.identifiers
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluates a query string against this schema via the external type
    /// system, pairing the inferred tree with its node counts.
    pub fn evaluate_query(
        &self,
        evaluator: &dyn QueryTypeEvaluator,
        query: &str,
    ) -> Result<EvaluatedType, EvaluatorError> {
        let node = evaluator.evaluate(query, &self.schema)?;
        let stats = UsageStats::of(&node);
        Ok(EvaluatedType { node, stats })
    }
}

impl TypeResolver for SchemaCompiler {
    fn resolve_identifier(&self, name: &str) -> Option<&str> {
        self.get_type(name).map(|entry| entry.identifier.as_str())
    }
}
