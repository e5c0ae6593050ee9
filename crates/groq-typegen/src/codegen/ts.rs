//! TypeScript declaration AST and source rendering.

use super::{KEYED_ARRAY_NAME, REFERENCE_MARKER_NAME};

/// A TypeScript type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    Unknown,
    /// `unknown` annotated with an explanation, e.g. an unresolved
    /// reference.
    UnknownWithComment(String),
    Null,
    Boolean,
    BooleanLiteral(bool),
    Number,
    NumberLiteral(f64),
    String,
    StringLiteral(String),
    Never,
    Array(Box<TsType>),
    /// `ArrayOfKeyed<T>`: an array whose elements are shared named types
    /// carrying an implicit `_key` attribute.
    KeyedArray(Box<TsType>),
    Union(Vec<TsType>),
    Intersection(Vec<TsType>),
    Reference(String),
    Object(Vec<TsProperty>),
}

/// A property in a structural object type.
#[derive(Debug, Clone, PartialEq)]
pub struct TsProperty {
    pub key: TsPropertyKey,
    pub optional: bool,
    pub value: TsType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TsPropertyKey {
    /// A plain attribute name, quoted on render when not identifier-shaped.
    Ident(String),
    /// A computed symbol key, e.g. `[internalGroqTypeReferenceTo]`.
    Computed(String),
}

/// A top-level declaration in the generated output.
#[derive(Debug, Clone, PartialEq)]
pub enum TsDeclaration {
    /// A standalone `// ...` line.
    Comment(String),
    TypeAlias {
        name: String,
        ty: TsType,
        /// Leading `// ...` lines attached to the declaration.
        comments: Vec<String>,
    },
    /// `export declare const <name>: unique symbol;`
    UniqueSymbol { name: String },
    /// The generic alias backing [`TsType::KeyedArray`].
    KeyedArrayAlias,
    /// The aggregate map from query source strings to result type names.
    QueryMap { entries: Vec<(String, Vec<String>)> },
}

/// Renders a type expression at the given indentation depth.
pub fn render_type(ty: &TsType, indent: usize) -> String {
    match ty {
        TsType::Unknown => "unknown".to_string(),
        TsType::UnknownWithComment(comment) => {
            format!("unknown /* {} */", escape_comment(comment))
        }
        TsType::Null => "null".to_string(),
        TsType::Boolean => "boolean".to_string(),
        TsType::BooleanLiteral(value) => value.to_string(),
        TsType::Number => "number".to_string(),
        TsType::NumberLiteral(value) => format!("{}", value),
        TsType::String => "string".to_string(),
        TsType::StringLiteral(value) => format!("{:?}", value),
        TsType::Never => "never".to_string(),
        TsType::Array(element) => format!("Array<{}>", render_type(element, indent)),
        TsType::KeyedArray(element) => {
            format!("{}<{}>", KEYED_ARRAY_NAME, render_type(element, indent))
        }
        TsType::Union(members) => members
            .iter()
            .map(|member| render_union_member(member, indent))
            .collect::<Vec<_>>()
            .join(" | "),
        TsType::Intersection(members) => members
            .iter()
            .map(|member| render_intersection_member(member, indent))
            .collect::<Vec<_>>()
            .join(" & "),
        TsType::Reference(name) => name.clone(),
        TsType::Object(properties) => render_object(properties, indent),
    }
}

fn render_union_member(member: &TsType, indent: usize) -> String {
    match member {
        TsType::Union(_) => format!("({})", render_type(member, indent)),
        _ => render_type(member, indent),
    }
}

fn render_intersection_member(member: &TsType, indent: usize) -> String {
    match member {
        TsType::Union(_) => format!("({})", render_type(member, indent)),
        _ => render_type(member, indent),
    }
}

fn render_object(properties: &[TsProperty], indent: usize) -> String {
    if properties.is_empty() {
        return "{}".to_string();
    }
    let pad = "  ".repeat(indent + 1);
    let lines: Vec<String> = properties
        .iter()
        .map(|property| {
            let optional = if property.optional { "?" } else { "" };
            format!(
                "{}{}{}: {};",
                pad,
                render_key(&property.key),
                optional,
                render_type(&property.value, indent + 1)
            )
        })
        .collect();
    format!("{{\n{}\n{}}}", lines.join("\n"), "  ".repeat(indent))
}

fn render_key(key: &TsPropertyKey) -> String {
    match key {
        TsPropertyKey::Ident(name) => {
            if is_identifier(name) {
                name.clone()
            } else {
                format!("{:?}", name)
            }
        }
        TsPropertyKey::Computed(name) => format!("[{}]", name),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
        }
        _ => false,
    }
}

fn escape_comment(comment: &str) -> String {
    comment.replace("*/", "*\\/")
}

/// Renders one top-level declaration, including its trailing newline.
pub fn render_declaration(declaration: &TsDeclaration) -> String {
    match declaration {
        TsDeclaration::Comment(text) => format!("// {}\n", text),
        TsDeclaration::TypeAlias { name, ty, comments } => {
            let mut out = String::new();
            for comment in comments {
                out.push_str(&format!("// {}\n", comment));
            }
            out.push_str(&format!("export type {} = {};\n", name, render_type(ty, 0)));
            out
        }
        TsDeclaration::UniqueSymbol { name } => {
            format!("export declare const {}: unique symbol;\n", name)
        }
        TsDeclaration::KeyedArrayAlias => format!(
            "export type {}<T> = Array<T & {{ _key: string }}>;\n",
            KEYED_ARRAY_NAME
        ),
        TsDeclaration::QueryMap { entries } => {
            let mut out = String::new();
            out.push_str("// Query TypeMap\n");
            out.push_str("import \"@sanity/client\";\n");
            out.push_str("declare module \"@sanity/client\" {\n");
            out.push_str("  interface SanityQueries {\n");
            for (query, result_names) in entries {
                out.push_str(&format!(
                    "    {:?}: {};\n",
                    query,
                    result_names.join(" | ")
                ));
            }
            out.push_str("  }\n");
            out.push_str("}\n");
            out
        }
    }
}

/// Renders a whole declaration list with one blank line between entries.
pub fn render_declarations(declarations: &[TsDeclaration]) -> String {
    declarations
        .iter()
        .map(render_declaration)
        .collect::<Vec<_>>()
        .join("\n")
}
