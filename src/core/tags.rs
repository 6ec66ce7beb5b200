//! Comma-encoded multi-value fields
//!
//! Curriculum tags and feature lists travel as comma-joined strings in seed
//! files and in the flat JSON representation. Everything inside the crate
//! works with `Vec<String>`; these helpers are the only place that splits or
//! joins.

/// Split a comma-joined string into trimmed, non-empty tags
///
/// # Example
/// ```
/// use nursery::core::tags::split_tags;
///
/// assert_eq!(
///     split_tags("Montessori, International,,"),
///     vec!["Montessori".to_string(), "International".to_string()]
/// );
/// ```
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

/// Join tags back into the comma-joined wire form
pub fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

/// Serde adapter for fields stored as comma-joined strings
///
/// Accepts either a JSON/YAML sequence or a single comma-joined string when
/// deserializing, and always serializes as a comma-joined string.
pub mod comma_joined {
    use super::{join_tags, split_tags};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Joined(String),
        List(Vec<String>),
    }

    pub fn serialize<S>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&join_tags(tags))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(match raw {
            None => Vec::new(),
            Some(Raw::Joined(s)) => split_tags(&s),
            Some(Raw::List(items)) => items
                .iter()
                .flat_map(|item| split_tags(item))
                .collect(),
        })
    }
}
