//! Identifier and naming helpers for generated declarations.

mod ident;
mod singular;

pub use ident::{sanitize_identifier, unique_identifier, IdentifierRegistry};
pub use singular::singularize;
