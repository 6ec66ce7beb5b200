//! Catalog query parameters and the parsed query descriptor

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Curriculum filter value meaning "no filter"
pub const ALL_CURRICULA: &str = "All";

/// Ordering applied to a catalog result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Rating, highest first
    #[default]
    RatingDesc,
    /// Monthly fee, lowest first
    FeeAsc,
    /// Monthly fee, highest first
    FeeDesc,
    /// Name, lexicographic ascending
    Name,
}

impl SortKey {
    /// All keys, in the order they are offered to users
    pub const ALL: [SortKey; 4] = [
        SortKey::RatingDesc,
        SortKey::FeeAsc,
        SortKey::FeeDesc,
        SortKey::Name,
    ];

    /// Parse a sort key, falling back to [`SortKey::RatingDesc`] for anything
    /// unrecognized
    ///
    /// Accepts the canonical names as well as the `rating`, `price_low` and
    /// `price_high` spellings used by the catalog page.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::RatingDesc => "rating_desc",
            SortKey::FeeAsc => "fee_asc",
            SortKey::FeeDesc => "fee_desc",
            SortKey::Name => "name",
        }
    }
}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rating_desc" | "rating" => Ok(SortKey::RatingDesc),
            "fee_asc" | "price_low" => Ok(SortKey::FeeAsc),
            "fee_desc" | "price_high" => Ok(SortKey::FeeDesc),
            "name" => Ok(SortKey::Name),
            other => Err(UnknownSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by strict [`SortKey`] parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl fmt::Display for UnknownSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown sort key: {}", self.0)
    }
}

impl std::error::Error for UnknownSortKey {}

/// Raw catalog parameters as they arrive in the query string
///
/// Every field is optional; missing or malformed values are defaulted when
/// converted into a [`CatalogQuery`], never rejected.
///
/// # Example
/// ```rust,ignore
/// GET /api/nurseries?q=berlin&curriculum=Montessori&sort=fee_asc
/// GET /nurseries?sort=price_low
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogParams {
    /// Free-text search term
    pub q: Option<String>,

    /// Curriculum tag to filter by, or `All`
    pub curriculum: Option<String>,

    /// Sort key name
    pub sort: Option<String>,
}

impl CatalogParams {
    /// Normalize into a query descriptor
    pub fn to_query(&self) -> CatalogQuery {
        CatalogQuery::new(
            self.q.as_deref().unwrap_or_default(),
            self.curriculum.as_deref().unwrap_or_default(),
            SortKey::parse_lenient(self.sort.as_deref().unwrap_or_default()),
        )
    }
}

/// A normalized catalog browse request
///
/// The term is trimmed and lower-cased, the curriculum filter is trimmed and
/// the sentinel [`ALL_CURRICULA`] (in any case) is folded into "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    term: String,
    curriculum: Option<String>,
    sort: SortKey,
}

impl CatalogQuery {
    pub fn new(term: &str, curriculum: &str, sort: SortKey) -> Self {
        let curriculum = curriculum.trim();
        let curriculum = if curriculum.is_empty() || curriculum.eq_ignore_ascii_case(ALL_CURRICULA) {
            None
        } else {
            Some(curriculum.to_string())
        };

        Self {
            term: term.trim().to_lowercase(),
            curriculum,
            sort,
        }
    }

    /// Lower-cased search term, empty when not searching
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Curriculum tag to match, `None` when not filtering
    pub fn curriculum(&self) -> Option<&str> {
        self.curriculum.as_deref()
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_defaults() {
        let query = CatalogParams::default().to_query();
        assert_eq!(query.term(), "");
        assert_eq!(query.curriculum(), None);
        assert_eq!(query.sort(), SortKey::RatingDesc);
    }

    #[test]
    fn test_term_is_trimmed_and_lowercased() {
        let params = CatalogParams {
            q: Some("  Sunny KIDS ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.to_query().term(), "sunny kids");
    }

    #[test]
    fn test_all_sentinel_means_no_filter() {
        for raw in ["All", "all", "  ALL ", "", "   "] {
            let query = CatalogQuery::new("", raw, SortKey::default());
            assert_eq!(query.curriculum(), None, "raw value {:?}", raw);
        }

        let query = CatalogQuery::new("", " Montessori ", SortKey::default());
        assert_eq!(query.curriculum(), Some("Montessori"));
    }

    #[test]
    fn test_sort_key_aliases() {
        assert_eq!(SortKey::parse_lenient("rating"), SortKey::RatingDesc);
        assert_eq!(SortKey::parse_lenient("rating_desc"), SortKey::RatingDesc);
        assert_eq!(SortKey::parse_lenient("fee_asc"), SortKey::FeeAsc);
        assert_eq!(SortKey::parse_lenient("price_low"), SortKey::FeeAsc);
        assert_eq!(SortKey::parse_lenient("fee_desc"), SortKey::FeeDesc);
        assert_eq!(SortKey::parse_lenient("price_high"), SortKey::FeeDesc);
        assert_eq!(SortKey::parse_lenient("name"), SortKey::Name);
    }

    #[test]
    fn test_unknown_sort_key_falls_back() {
        assert_eq!(SortKey::parse_lenient("bogus"), SortKey::RatingDesc);
        assert_eq!(SortKey::parse_lenient(""), SortKey::RatingDesc);
        assert!("bogus".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_sort_key_round_trips_through_display() {
        for key in SortKey::ALL {
            assert_eq!(key.to_string().parse::<SortKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_params_deserialize_from_query_string() {
        let params: CatalogParams =
            serde_json::from_value(serde_json::json!({"q": "berlin", "sort": "fee_desc"})).unwrap();
        let query = params.to_query();
        assert_eq!(query.term(), "berlin");
        assert_eq!(query.sort(), SortKey::FeeDesc);
    }
}
