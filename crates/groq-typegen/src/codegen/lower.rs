//! Lowering inferred type trees into declaration syntax.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use super::ts::{TsProperty, TsPropertyKey, TsType};
use super::REFERENCE_MARKER_NAME;
use crate::dedupe::{DedupeRegistry, Fingerprinter};
use crate::ir::{ObjectAttribute, TypeNode};

/// Resolves a declared schema type name to its generated identifier.
pub trait TypeResolver {
    fn resolve_identifier(&self, name: &str) -> Option<&str>;
}

impl TypeResolver for HashMap<String, String> {
    fn resolve_identifier(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Lowers [`TypeNode`] trees to [`TsType`] expressions.
///
/// With a dedupe registry active, any object subtree whose fingerprint is
/// registered is emitted as a reference to the shared name instead of being
/// inlined.
pub struct TypeLowerer<'a> {
    resolver: &'a dyn TypeResolver,
    registry: Option<&'a DedupeRegistry>,
    fingerprints: Fingerprinter,
    keyed_array_used: bool,
}

impl<'a> TypeLowerer<'a> {
    pub fn new(resolver: &'a dyn TypeResolver) -> Self {
        Self {
            resolver,
            registry: None,
            fingerprints: Fingerprinter::new(),
            keyed_array_used: false,
        }
    }

    pub fn with_registry(
        resolver: &'a dyn TypeResolver,
        registry: &'a DedupeRegistry,
        fingerprints: Fingerprinter,
    ) -> Self {
        Self {
            resolver,
            registry: Some(registry),
            fingerprints,
            keyed_array_used: false,
        }
    }

    /// Whether any lowered tree needed the keyed-array generic alias.
    pub fn keyed_array_used(&self) -> bool {
        self.keyed_array_used
    }

    pub fn lower(&mut self, node: &Arc<TypeNode>) -> TsType {
        if let TypeNode::Object { .. } = node.as_ref() {
            if let Some(reference) = self.registry_reference(node) {
                return reference;
            }
        }
        self.lower_unregistered(node)
    }

    /// Lowers the root of a named declaration. The root itself is never
    /// replaced by its own registry reference; nested registered shapes
    /// still are.
    pub fn lower_alias(&mut self, node: &Arc<TypeNode>) -> TsType {
        self.lower_unregistered(node)
    }

    fn lower_unregistered(&mut self, node: &Arc<TypeNode>) -> TsType {
        match node.as_ref() {
            TypeNode::Unknown => TsType::Unknown,
            TypeNode::Null => TsType::Null,
            TypeNode::Boolean { value } => match value {
                Some(v) => TsType::BooleanLiteral(*v),
                None => TsType::Boolean,
            },
            TypeNode::Number { value } => match value {
                Some(v) => TsType::NumberLiteral(*v),
                None => TsType::Number,
            },
            TypeNode::String { value } => match value {
                Some(v) => TsType::StringLiteral(v.clone()),
                None => TsType::String,
            },
            TypeNode::Array { of } => self.lower_array(of),
            TypeNode::Union { of } => self.lower_union(of),
            TypeNode::Inline { name } => self.lower_inline(name),
            TypeNode::Object {
                attributes,
                rest,
                dereferences_to,
            } => self.lower_object(attributes, rest.as_ref(), dereferences_to.as_deref()),
        }
    }

    fn registry_reference(&mut self, node: &Arc<TypeNode>) -> Option<TsType> {
        let registry = self.registry?;
        let fingerprint = self.fingerprints.fingerprint(node);
        registry
            .get(&fingerprint)
            .map(|entry| TsType::Reference(entry.identifier.clone()))
    }

    /// Arrays are `Array<element>`, unless the element union contains
    /// registered object shapes: those carry an implicit per-element key,
    /// so they move into the shared keyed-array generic.
    fn lower_array(&mut self, of: &Arc<TypeNode>) -> TsType {
        if self.registry.is_some() {
            if let TypeNode::Union { of: members } = of.as_ref() {
                let mut keyed = Vec::new();
                let mut plain = Vec::new();
                for member in members {
                    if matches!(member.as_ref(), TypeNode::Object { .. }) {
                        if let Some(reference) = self.registry_reference(member) {
                            keyed.push(reference);
                            continue;
                        }
                    }
                    plain.push(self.lower(member));
                }
                if !keyed.is_empty() {
                    self.keyed_array_used = true;
                    let keyed_arm = TsType::KeyedArray(Box::new(union_of(keyed)));
                    if plain.is_empty() {
                        return keyed_arm;
                    }
                    return TsType::Union(vec![
                        TsType::Array(Box::new(union_of(plain))),
                        keyed_arm,
                    ]);
                }
            }
        }
        TsType::Array(Box::new(self.lower(of)))
    }

    fn lower_union(&mut self, members: &[Arc<TypeNode>]) -> TsType {
        union_of(members.iter().map(|member| self.lower(member)).collect())
    }

    fn lower_inline(&mut self, name: &str) -> TsType {
        match self.resolver.resolve_identifier(name) {
            Some(identifier) => TsType::Reference(identifier.to_string()),
            None => TsType::UnknownWithComment(unresolved_reference_comment(name)),
        }
    }

    fn lower_object(
        &mut self,
        attributes: &IndexMap<String, ObjectAttribute>,
        rest: Option<&Arc<TypeNode>>,
        dereferences_to: Option<&str>,
    ) -> TsType {
        let shape = match rest.map(Arc::as_ref) {
            None => ObjectShape::Literal(self.lower_attributes(attributes)),
            Some(TypeNode::Object {
                attributes: rest_attributes,
                rest: rest_rest,
                ..
            }) => {
                let mut properties = self.lower_attributes(attributes);
                properties.extend(self.flatten_rest(rest_attributes, rest_rest.as_ref()));
                ObjectShape::Literal(properties)
            }
            Some(TypeNode::Inline { name }) => match self.resolver.resolve_identifier(name) {
                Some(identifier) => ObjectShape::Extends(
                    self.lower_attributes(attributes),
                    identifier.to_string(),
                ),
                // The spread target is unknowable, so nothing more specific
                // than unknown can be claimed for the whole object.
                None => return TsType::UnknownWithComment(unresolved_reference_comment(name)),
            },
            Some(_) => return TsType::Unknown,
        };

        match shape {
            ObjectShape::Literal(mut properties) => {
                if let Some(target) = dereferences_to {
                    properties.push(self.dereference_property(target));
                }
                TsType::Object(properties)
            }
            ObjectShape::Extends(mut properties, identifier) => {
                if let Some(target) = dereferences_to {
                    properties.push(self.dereference_property(target));
                }
                TsType::Intersection(vec![
                    TsType::Object(properties),
                    TsType::Reference(identifier),
                ])
            }
        }
    }

    fn lower_attributes(
        &mut self,
        attributes: &IndexMap<String, ObjectAttribute>,
    ) -> Vec<TsProperty> {
        attributes
            .iter()
            .map(|(key, attribute)| TsProperty {
                key: TsPropertyKey::Ident(key.clone()),
                optional: attribute.optional,
                value: self.lower(&attribute.value),
            })
            .collect()
    }

    /// Appends a spread object's attributes as trailing siblings, following
    /// nested object spreads all the way down.
    fn flatten_rest(
        &mut self,
        attributes: &IndexMap<String, ObjectAttribute>,
        rest: Option<&Arc<TypeNode>>,
    ) -> Vec<TsProperty> {
        let mut properties = self.lower_attributes(attributes);
        if let Some(TypeNode::Object {
            attributes: nested,
            rest: nested_rest,
            ..
        }) = rest.map(Arc::as_ref)
        {
            properties.extend(self.flatten_rest(nested, nested_rest.as_ref()));
        }
        properties
    }

    /// The always-optional symbol-keyed attribute that records which named
    /// schema type a reference resolves to.
    fn dereference_property(&mut self, target: &str) -> TsProperty {
        let value = if self.resolver.resolve_identifier(target).is_some() {
            TsType::StringLiteral(target.to_string())
        } else {
            TsType::UnknownWithComment(unresolved_reference_comment(target))
        };
        TsProperty {
            key: TsPropertyKey::Computed(REFERENCE_MARKER_NAME.to_string()),
            optional: true,
            value,
        }
    }
}

enum ObjectShape {
    Literal(Vec<TsProperty>),
    Extends(Vec<TsProperty>, String),
}

/// An empty union is the bottom type; a singleton union is its member.
pub fn union_of(mut members: Vec<TsType>) -> TsType {
    match members.len() {
        0 => TsType::Never,
        1 => members.remove(0),
        _ => TsType::Union(members),
    }
}

fn unresolved_reference_comment(name: &str) -> String {
    format!("Unable to locate the referenced type \"{}\" in schema", name)
}
