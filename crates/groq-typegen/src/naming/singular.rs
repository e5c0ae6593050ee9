//! Plural-to-singular heuristics for collection key names.

/// Converts a plural attribute key to a singular noun.
///
/// Mechanical suffix rules, first match wins; words that match no rule are
/// returned unchanged. Doubled-z plurals lose the doubled consonant
/// (`"quizzes"` becomes `"quiz"`).
pub fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if word.ends_with("zzes") && word.len() > 4 {
        return word[..word.len() - 3].to_string();
    }
    if ["sses", "shes", "ches", "xes", "zes"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return word[..word.len() - 2].to_string();
    }
    if word.ends_with('s') && !word.ends_with("ss") && word.len() > 2 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_s() {
        assert_eq!(singularize("posts"), "post");
        assert_eq!(singularize("authors"), "author");
    }

    #[test]
    fn test_ies_becomes_y() {
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("entries"), "entry");
    }

    #[test]
    fn test_es_clusters() {
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("dishes"), "dish");
        assert_eq!(singularize("matches"), "match");
        assert_eq!(singularize("boxes"), "box");
    }

    #[test]
    fn test_doubled_z_loses_doubled_consonant() {
        assert_eq!(singularize("quizzes"), "quiz");
        assert_eq!(singularize("buzzes"), "buz");
    }

    #[test]
    fn test_single_z_strips_es_only() {
        assert_eq!(singularize("blazes"), "blaz");
    }

    #[test]
    fn test_double_s_guard() {
        assert_eq!(singularize("boss"), "boss");
        assert_eq!(singularize("address"), "address");
    }

    #[test]
    fn test_length_guard() {
        assert_eq!(singularize("us"), "us");
        assert_eq!(singularize("is"), "is");
    }

    #[test]
    fn test_no_rule_matches() {
        assert_eq!(singularize("person"), "person");
    }
}
