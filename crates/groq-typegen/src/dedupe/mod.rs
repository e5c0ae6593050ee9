//! Structural deduplication of inferred object shapes.
//!
//! Repeated object shapes across query result types are recognized by a
//! canonical structural fingerprint, counted in a single collection pass,
//! and hoisted into shared named aliases by the registry builder.

mod collect;
mod fingerprint;
mod registry;

pub use collect::{Occurrence, OccurrenceCollector};
pub use fingerprint::Fingerprinter;
pub use registry::{DedupeRegistry, RegistryEntry};
