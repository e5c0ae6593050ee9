//! # GROQ Typegen
//!
//! This crate generates static TypeScript declarations from a Sanity content
//! schema and a set of extracted GROQ query strings. Every query is statically
//! evaluated against the schema to infer its result shape, and structurally
//! identical inferred object shapes are hoisted into shared named aliases.
//!
//! ## Architecture
//!
//! ```text
//! Schema (JSON)           Query modules (async stream)
//!        │                        │
//!        ▼                        ▼
//! ┌──────────────┐         ┌──────────────┐
//! │    Schema    │────────▶│   Evaluate   │  External GROQ type checker
//! │   Compiler   │ lookup  │ (per query)  │
//! └──────┬───────┘         └──────┬───────┘
//!        │                        │
//!        │                        ▼
//!        │                 ┌──────────────┐
//!        │                 │   Collect    │  Fingerprint object shapes,
//!        │                 │ + Registry   │  extract repeated ones
//!        │                 └──────┬───────┘
//!        │                        │
//!        ▼                        ▼
//! ┌─────────────────────────────────────────┐
//! │                Lowering                 │  TypeNode → TS declarations
//! └─────────────────────────────────────────┘
//! ```
//!
//! Registry construction needs every query's inferred tree, so the query
//! source is fully drained before any query declaration is emitted. Partial
//! input is fine: per-query evaluation failures are collected on their module
//! and the run continues; only a schema compilation failure is fatal.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use groq_typegen::{GenerateRequest, GeneratorConfig, TypeGenerator};
//!
//! let mut generator = TypeGenerator::new(GeneratorConfig::default(), evaluator);
//! let generated = generator
//!     .generate(GenerateRequest {
//!         schema,
//!         query_source: Some(modules),
//!         progress: None,
//!     })
//!     .await?;
//! println!("{}", generated.source);
//! ```

pub mod config;
pub mod diagnostic;
pub mod ir;
pub mod naming;
pub mod dedupe;
pub mod schema;
pub mod codegen;
pub mod evaluator;
pub mod source;

use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;
use indexmap::IndexMap;

use codegen::{
    render_declarations, union_of, TsDeclaration, TsType, TypeLowerer, ALL_SCHEMA_TYPES_NAME,
    REFERENCE_MARKER_NAME, RESULT_SUFFIX,
};
use dedupe::{DedupeRegistry, Fingerprinter, OccurrenceCollector};
use diagnostic::{EvaluationError, ModuleError};
use ir::{TypeNode, UsageStats};

pub use config::GeneratorConfig;
pub use diagnostic::TypegenError;
pub use evaluator::QueryTypeEvaluator;
pub use schema::{Schema, SchemaCompiler, SchemaEntry};
pub use source::{ExtractedQuery, QueryModule, QuerySource};

/// One generation run's input.
pub struct GenerateRequest<'a> {
    /// The content schema to compile and evaluate queries against.
    pub schema: Schema,
    /// Incrementally produced query modules; `None` generates schema types
    /// only.
    pub query_source: Option<QuerySource<'a>>,
    /// Receives typed notifications as each generation phase completes.
    pub progress: Option<&'a mut dyn ProgressSink>,
}

/// A query that evaluated successfully against the schema.
#[derive(Debug, Clone)]
pub struct EvaluatedQuery {
    pub variable: String,
    pub query: String,
    /// The inferred result type tree.
    pub node: Arc<TypeNode>,
    /// Node counts of the inferred tree.
    pub stats: UsageStats,
}

/// Evaluation outcome for one input module.
#[derive(Debug)]
pub struct ModuleResult {
    pub filename: PathBuf,
    /// Successfully evaluated queries, in source order.
    pub queries: Vec<EvaluatedQuery>,
    /// Extraction errors passed through from the module plus evaluation
    /// failures hit here. Neither aborts the run.
    pub errors: Vec<ModuleError>,
}

impl ModuleResult {
    /// Combined node counts across every evaluated query in this module.
    pub fn stats(&self) -> UsageStats {
        self.queries
            .iter()
            .fold(UsageStats::default(), |acc, query| UsageStats {
                all_types: acc.all_types + query.stats.all_types,
                unknown_types: acc.unknown_types + query.stats.unknown_types,
                empty_unions: acc.empty_unions + query.stats.empty_unions,
            })
    }
}

/// Result of a successful generation run.
#[derive(Debug)]
pub struct GeneratedTypes {
    /// Every emitted declaration, in output order.
    pub declarations: Vec<TsDeclaration>,
    /// The rendered declaration source text.
    pub source: String,
    /// Per-module evaluation results, in encounter order.
    pub modules: Vec<ModuleResult>,
}

/// A notification pushed to a [`ProgressSink`] as it becomes available.
#[derive(Debug)]
pub enum GenerationEvent<'a> {
    /// The schema declarations, the all-schema-types union, and the
    /// reference-marker symbol declaration are ready.
    SchemaTypesGenerated { declarations: &'a [TsDeclaration] },
    /// One input module finished evaluating.
    ModuleEvaluated { module: &'a ModuleResult },
    /// The aggregate query map is ready.
    QueryTypesGenerated { query_map: &'a TsDeclaration },
}

/// Receives [`GenerationEvent`]s during a run, e.g. from a watch-mode driver.
pub trait ProgressSink {
    fn event(&mut self, event: GenerationEvent<'_>);
}

/// The main generator struct that orchestrates the generation pipeline.
pub struct TypeGenerator {
    config: GeneratorConfig,
    evaluator: Box<dyn QueryTypeEvaluator>,
    compiler: Option<Arc<SchemaCompiler>>,
}

impl TypeGenerator {
    /// Creates a new generator with the given configuration and external
    /// query evaluator.
    pub fn new(config: GeneratorConfig, evaluator: Box<dyn QueryTypeEvaluator>) -> Self {
        Self {
            config,
            evaluator,
            compiler: None,
        }
    }

    /// Returns the compiled schema for `schema`, reusing the cached compiler
    /// when the schema value is unchanged since the last call.
    ///
    /// An unchanged schema yields the same `Arc`, so downstream consumers can
    /// detect that regeneration is unnecessary by pointer comparison. A
    /// changed schema value recompiles and replaces the cache.
    pub fn schema_compiler(&mut self, schema: Schema) -> Result<Arc<SchemaCompiler>, TypegenError> {
        if let Some(cached) = &self.compiler {
            if *cached.schema() == schema {
                return Ok(Arc::clone(cached));
            }
        }
        let compiler = Arc::new(SchemaCompiler::new(schema)?);
        self.compiler = Some(Arc::clone(&compiler));
        Ok(compiler)
    }

    /// Generates declarations for the schema and every query in the source.
    ///
    /// This runs the full pipeline:
    /// 1. Compile the schema (fatal on duplicate declared names)
    /// 2. Drain the query source, evaluating each query as it arrives
    /// 3. Collect object shapes across all queries and build the registry
    /// 4. Lower registry entries, then each query's result type
    /// 5. Assemble the declaration list in the fixed output order
    pub async fn generate(
        &mut self,
        request: GenerateRequest<'_>,
    ) -> Result<GeneratedTypes, TypegenError> {
        let GenerateRequest {
            schema,
            query_source,
            mut progress,
        } = request;

        // Phase 1: compile the schema.
        let compiler = self.schema_compiler(schema)?;

        let mut schema_decls: Vec<TsDeclaration> = Vec::new();
        if let Some(path) = &self.config.schema_path {
            schema_decls.push(TsDeclaration::Comment(format!(
                "Schema: {}",
                path.display()
            )));
        }
        for entry in compiler.entries() {
            schema_decls.push(entry.declaration.clone());
        }
        schema_decls.push(TsDeclaration::TypeAlias {
            name: ALL_SCHEMA_TYPES_NAME.to_string(),
            ty: union_of(
                compiler
                    .entries()
                    .iter()
                    .map(|entry| TsType::Reference(entry.identifier.clone()))
                    .collect(),
            ),
            comments: Vec::new(),
        });
        schema_decls.push(TsDeclaration::UniqueSymbol {
            name: REFERENCE_MARKER_NAME.to_string(),
        });
        emit(
            &mut progress,
            GenerationEvent::SchemaTypesGenerated {
                declarations: &schema_decls,
            },
        );

        // Phase 2: fully drain and evaluate the query source. The registry
        // needs every inferred tree, so no query declaration is emitted yet.
        let mut modules: Vec<ModuleResult> = Vec::new();
        if let Some(mut query_source) = query_source {
            while let Some(module) = query_source.next().await {
                let mut result = ModuleResult {
                    filename: module.filename,
                    queries: Vec::new(),
                    errors: module.errors.into_iter().map(ModuleError::from).collect(),
                };
                for extracted in module.queries {
                    match compiler.evaluate_query(self.evaluator.as_ref(), &extracted.query) {
                        Ok(evaluated) => result.queries.push(EvaluatedQuery {
                            variable: extracted.variable,
                            query: extracted.query,
                            node: evaluated.node,
                            stats: evaluated.stats,
                        }),
                        Err(source) => {
                            result.errors.push(ModuleError::Evaluation(EvaluationError {
                                filename: result.filename.clone(),
                                variable: extracted.variable,
                                query: extracted.query,
                                source,
                            }));
                        }
                    }
                }
                emit(
                    &mut progress,
                    GenerationEvent::ModuleEvaluated { module: &result },
                );
                modules.push(result);
            }
        }

        // Phase 3: collect object shapes across every evaluated query, then
        // build the shared-type registry. Seeding with the schema's
        // identifiers keeps generated names from colliding with schema types.
        let mut fingerprints = Fingerprinter::new();
        let mut collector = OccurrenceCollector::new();
        for module in &modules {
            for query in &module.queries {
                collector.collect(&mut fingerprints, &query.node);
            }
        }
        let mut identifiers = compiler.identifiers().clone();
        let registry = DedupeRegistry::build(collector.occurrences(), &mut identifiers);

        // Phase 4: lower registry entries first, registry active, so nested
        // duplicates-of-duplicates also resolve to references.
        let mut lowerer = TypeLowerer::with_registry(compiler.as_ref(), &registry, fingerprints);
        let mut dedupe_decls = Vec::with_capacity(registry.len());
        for entry in registry.iter() {
            let ty = lowerer.lower_alias(&entry.node);
            dedupe_decls.push(TsDeclaration::TypeAlias {
                name: entry.identifier.clone(),
                ty,
                comments: Vec::new(),
            });
        }

        let mut query_decls = Vec::new();
        let mut query_map: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut evaluated_queries = 0usize;
        for module in &modules {
            let relative = pathdiff::diff_paths(&module.filename, &self.config.root_dir)
                .unwrap_or_else(|| module.filename.clone());
            for query in &module.queries {
                evaluated_queries += 1;
                let ty = lowerer.lower(&query.node);
                let identifier =
                    identifiers.reserve(&format!("{}{}", query.variable, RESULT_SUFFIX));
                query_decls.push(TsDeclaration::TypeAlias {
                    name: identifier.clone(),
                    ty,
                    comments: vec![
                        format!("Source: {}", relative.display()),
                        format!("Variable: {}", query.variable),
                        format!("Query: {}", flatten_query(&query.query)),
                    ],
                });
                query_map
                    .entry(query.query.clone())
                    .or_default()
                    .push(identifier);
            }
        }

        // Phase 5: assemble in the fixed output order. The keyed-array alias
        // is only emitted when some lowered tree needed it.
        let mut declarations = schema_decls;
        if lowerer.keyed_array_used() {
            declarations.push(TsDeclaration::KeyedArrayAlias);
        }
        declarations.extend(dedupe_decls);
        declarations.extend(query_decls);
        if self.config.emit_query_map && evaluated_queries > 0 {
            let map = TsDeclaration::QueryMap {
                entries: query_map.into_iter().collect(),
            };
            emit(
                &mut progress,
                GenerationEvent::QueryTypesGenerated { query_map: &map },
            );
            declarations.push(map);
        }

        let source = render_declarations(&declarations);
        Ok(GeneratedTypes {
            declarations,
            source,
            modules,
        })
    }
}

fn emit(progress: &mut Option<&mut dyn ProgressSink>, event: GenerationEvent<'_>) {
    if let Some(sink) = progress {
        sink.event(event);
    }
}

/// Strips line breaks from a query and trims it, for the leading comment.
fn flatten_query(query: &str) -> String {
    query
        .chars()
        .filter(|ch| *ch != '\n' && *ch != '\r')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_query_strips_line_breaks_and_trims() {
        assert_eq!(
            flatten_query("\n*[_type == \"post\"]{\r\n  title\n}\n"),
            "*[_type == \"post\"]{  title}"
        );
        assert_eq!(flatten_query("*"), "*");
    }
}
