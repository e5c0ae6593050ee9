//! Collision-free identifier generation for emitted type names.

use std::collections::HashSet;

/// TypeScript keywords that generated identifiers must never shadow.
const RESERVED_IDENTIFIERS: &[&str] = &[
    "any", "boolean", "declare", "interface", "module", "never", "null",
    "number", "object", "string", "symbol", "type", "undefined", "unknown",
];

/// Turns an arbitrary name into a PascalCase identifier.
///
/// A leading digit is replaced with `_`. Every run of characters outside
/// `[A-Za-z0-9_$]` is dropped and the first valid character after the run is
/// upper-cased, camel-casing across separators. The first character of the
/// result is upper-cased. Returns `"_"` when no usable characters remain.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut uppercase_next = false;

    for (i, ch) in name.chars().enumerate() {
        if i == 0 && ch.is_ascii_digit() {
            out.push('_');
            continue;
        }
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
            if uppercase_next {
                out.extend(ch.to_uppercase());
                uppercase_next = false;
            } else {
                out.push(ch);
            }
        } else {
            uppercase_next = true;
        }
    }

    if out.is_empty() {
        return "_".to_string();
    }

    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "_".to_string(),
    }
}

/// Returns a sanitized identifier that is not present in `current` and is not
/// a reserved word, appending `_2`, `_3`, ... until unique.
///
/// Does not mutate `current`; the caller is responsible for reserving the
/// returned name before requesting the next one.
pub fn unique_identifier(desired: &str, current: &HashSet<String>) -> String {
    let base = sanitize_identifier(desired);
    if is_available(&base, current) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if is_available(&candidate, current) {
            return candidate;
        }
        n += 1;
    }
}

fn is_available(name: &str, current: &HashSet<String>) -> bool {
    !current.contains(name) && !RESERVED_IDENTIFIERS.contains(&name)
}

/// Sequential, single-writer reservation set for generated identifiers.
///
/// Insertion order matters: collision numbering is determined by which names
/// were reserved first.
#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
    used: HashSet<String>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitizes `desired`, resolves collisions, and reserves the result.
    pub fn reserve(&mut self, desired: &str) -> String {
        let name = unique_identifier(desired, &self.used);
        self.used.insert(name.clone());
        name
    }

    /// Marks a name as used verbatim, without sanitization.
    ///
    /// Used for the fixed output names whose exact spelling is part of the
    /// generated declaration format.
    pub fn insert(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }
}
