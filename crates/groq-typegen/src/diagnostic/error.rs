//! Generation error types.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort a generation run.
///
/// Per-query failures are not represented here; they are collected as
/// [`ModuleError`] values on the module that produced them and never abort
/// the run.
#[derive(Error, Diagnostic, Debug)]
pub enum TypegenError {
    // =========================================================================
    // Schema Errors
    // =========================================================================
    #[error("duplicate schema type name '{name}'")]
    #[diagnostic(
        code(groq_typegen::schema::duplicate_type_name),
        help("schema type names must be unique; rename one of the conflicting types")
    )]
    DuplicateTypeName { name: String },

    #[error("failed to parse schema: {message}")]
    #[diagnostic(code(groq_typegen::schema::invalid_schema))]
    InvalidSchema { message: String },
}

/// Failure reported by the external query type evaluator.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct EvaluatorError {
    pub message: String,
}

impl EvaluatorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A query string failed to evaluate against the schema.
///
/// Carries the originating file and variable so callers can build an
/// actionable message; the offending query is simply absent from the output.
#[derive(Error, Diagnostic, Debug)]
#[error("failed to evaluate query '{variable}' in {}", filename.display())]
#[diagnostic(code(groq_typegen::query::evaluation_failed))]
pub struct EvaluationError {
    pub filename: PathBuf,
    pub variable: String,
    pub query: String,
    #[source]
    pub source: EvaluatorError,
}

/// A query could not be extracted from its source location.
///
/// Produced upstream by the file-discovery collaborator and passed through
/// unchanged.
#[derive(Error, Diagnostic, Debug, Clone)]
#[error("failed to extract query from {}: {message}", filename.display())]
#[diagnostic(code(groq_typegen::query::extraction_failed))]
pub struct ExtractionError {
    pub filename: PathBuf,
    pub variable: Option<String>,
    pub message: String,
}

/// A non-fatal error attached to one input module.
#[derive(Error, Diagnostic, Debug)]
pub enum ModuleError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Evaluation(#[from] EvaluationError),
}
