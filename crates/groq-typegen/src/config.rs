//! Generator configuration.

use std::path::PathBuf;

/// Configuration for the type generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Root directory that query file paths are reported relative to.
    pub root_dir: PathBuf,

    /// Schema source path, emitted as a leading comment when set.
    pub schema_path: Option<PathBuf>,

    /// Emit the aggregate map from query source strings to result types.
    pub emit_query_map: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            schema_path: None,
            emit_query_map: true,
        }
    }
}
