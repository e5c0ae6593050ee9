//! TypeScript declaration generation.
//!
//! The lowering step turns inferred type trees into a small declaration AST;
//! rendering that AST to source text is kept separate so the output format
//! stays in one place.

mod lower;
mod ts;

pub use lower::{union_of, TypeLowerer, TypeResolver};
pub use ts::{
    render_declaration, render_declarations, TsDeclaration, TsProperty, TsPropertyKey, TsType,
};

/// Name of the union alias covering every schema type.
pub const ALL_SCHEMA_TYPES_NAME: &str = "AllSanitySchemaTypes";

/// Name of the unique symbol used to mark dereference targets on reference
/// shapes.
pub const REFERENCE_MARKER_NAME: &str = "internalGroqTypeReferenceTo";

/// Name of the generic alias for arrays whose elements are shared named
/// types carrying an implicit per-element key.
pub const KEYED_ARRAY_NAME: &str = "ArrayOfKeyed";

/// Suffix appended to a query's source variable to name its result type.
pub const RESULT_SUFFIX: &str = "Result";
