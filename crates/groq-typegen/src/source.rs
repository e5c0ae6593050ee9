//! Query-source input model.
//!
//! Query modules are produced incrementally by an external file-discovery
//! collaborator and consumed as an asynchronous sequence. The generator
//! suspends only between modules, never mid-computation.

use std::path::PathBuf;

use futures::stream::BoxStream;

use crate::diagnostic::ExtractionError;

/// A query string bound to a source variable.
#[derive(Debug, Clone)]
pub struct ExtractedQuery {
    /// The variable the query string was assigned to.
    pub variable: String,
    /// The raw query source text.
    pub query: String,
}

/// All queries extracted from one source file, along with any errors the
/// extractor hit while scanning it.
#[derive(Debug)]
pub struct QueryModule {
    pub filename: PathBuf,
    pub queries: Vec<ExtractedQuery>,
    pub errors: Vec<ExtractionError>,
}

/// An asynchronous sequence of query modules.
pub type QuerySource<'a> = BoxStream<'a, QueryModule>;
