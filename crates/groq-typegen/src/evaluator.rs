//! The seam to the external query-language type system.

use std::sync::Arc;

use crate::diagnostic::EvaluatorError;
use crate::ir::TypeNode;
use crate::schema::Schema;

/// Statically evaluates a query string against a schema, producing the
/// query's inferred result type.
///
/// Implementations wrap an external query-language type checker; this crate
/// only consumes the returned tree. Evaluation must be pure with respect to
/// the given schema and query.
pub trait QueryTypeEvaluator: Send + Sync {
    fn evaluate(&self, query: &str, schema: &Schema) -> Result<Arc<TypeNode>, EvaluatorError>;
}
