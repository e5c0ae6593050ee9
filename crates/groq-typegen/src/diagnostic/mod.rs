//! Diagnostic types for error reporting.

mod error;

pub use error::{
    EvaluationError, EvaluatorError, ExtractionError, ModuleError, TypegenError,
};
