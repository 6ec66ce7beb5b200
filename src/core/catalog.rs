//! Catalog query engine
//!
//! [`query`] turns a dataset and a [`CatalogQuery`] into an ordered view of
//! the matching facilities. It borrows the dataset, never mutates it and
//! performs no I/O, so it can be called from any number of request handlers
//! at once.
//!
//! # Stages
//!
//! 1. Search: a non-empty term must be a case-insensitive substring of the
//!    name, the city or the country.
//! 2. Curriculum: a filter must equal one of the facility's curriculum tags,
//!    ignoring case.
//! 3. Ordering by the requested [`SortKey`]. The sort is stable, so
//!    facilities that compare equal keep their input order.

use crate::core::facility::Facility;
use crate::core::query::{CatalogQuery, SortKey};
use std::cmp::Ordering;

/// Run a catalog query over `dataset`
///
/// # Example
/// ```
/// use nursery::core::catalog::query;
/// use nursery::core::facility::Facility;
/// use nursery::core::query::{CatalogQuery, SortKey};
///
/// let dataset = vec![
///     Facility::new("Sunny Kids", "Berlin", 4.5, 800),
///     Facility::new("Happy Stars", "Munich", 4.8, 600),
/// ];
///
/// let result = query(&dataset, &CatalogQuery::new("", "", SortKey::FeeAsc));
/// let names: Vec<&str> = result.iter().map(|f| f.name.as_str()).collect();
/// assert_eq!(names, ["Happy Stars", "Sunny Kids"]);
/// ```
pub fn query<'a>(dataset: &'a [Facility], descriptor: &CatalogQuery) -> Vec<&'a Facility> {
    let term = descriptor.term();
    let curriculum = descriptor.curriculum().map(str::to_lowercase);

    let mut result: Vec<&Facility> = dataset
        .iter()
        .filter(|facility| term.is_empty() || matches_term(facility, term))
        .filter(|facility| curriculum
                .as_deref()
                .is_none_or(|tag| has_curriculum(facility, tag)))
        .collect();

    // sort_by is stable
    result.sort_by(|a, b| compare(a, b, descriptor.sort()));

    tracing::debug!(
        total = dataset.len(),
        matched = result.len(),
        sort = %descriptor.sort(),
        "Catalog query evaluated"
    );

    result
}

/// Distinct curriculum tags across the dataset, in first-seen order
///
/// Used to populate the curriculum filter choices. Tags that differ only
/// in case are listed once, with the spelling seen first.
pub fn curricula(dataset: &[Facility]) -> Vec<&str> {
    let mut folded: Vec<String> = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    for tag in dataset.iter().flat_map(|f| f.curriculum.iter()) {
        let key = tag.to_lowercase();
        if !folded.contains(&key) {
            folded.push(key);
            seen.push(tag);
        }
    }
    seen
}

/// `term` must already be lower-cased
fn matches_term(facility: &Facility, term: &str) -> bool {
    contains_lowered(&facility.name, term)
        || contains_lowered(&facility.city, term)
        || facility
            .country
            .as_deref()
            .is_some_and(|country| contains_lowered(country, term))
}

fn contains_lowered(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(term)
}

/// `tag` must already be lower-cased
fn has_curriculum(facility: &Facility, tag: &str) -> bool {
    facility
        .curriculum
        .iter()
        .any(|own| own.to_lowercase() == tag)
}

fn compare(a: &Facility, b: &Facility, sort: SortKey) -> Ordering {
    match sort {
        SortKey::RatingDesc => b.rating.total_cmp(&a.rating),
        SortKey::FeeAsc => a.monthly_fee.cmp(&b.monthly_fee),
        SortKey::FeeDesc => b.monthly_fee.cmp(&a.monthly_fee),
        SortKey::Name => a.name.cmp(&b.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(result: &[&'a Facility]) -> Vec<&'a str> {
        result.iter().map(|f| f.name.as_str()).collect()
    }

    fn sample() -> Vec<Facility> {
        vec![
            Facility::new("Sunny Kids", "Berlin", 4.5, 800),
            Facility::new("Happy Stars", "Munich", 4.8, 600),
            Facility::new("Sunny Hills", "Berlin", 4.5, 900),
        ]
    }

    fn descriptor(term: &str, curriculum: &str, sort: &str) -> CatalogQuery {
        CatalogQuery::new(term, curriculum, SortKey::parse_lenient(sort))
    }

    #[test]
    fn test_empty_descriptor_sorts_by_rating_and_keeps_everything() {
        let data = sample();
        let result = query(&data, &CatalogQuery::default());

        assert_eq!(result.len(), data.len());
        assert_eq!(names(&result), ["Happy Stars", "Sunny Kids", "Sunny Hills"]);
    }

    #[test]
    fn test_term_matches_name_in_dataset_order() {
        let data = sample();
        let result = query(&data, &descriptor("sunny", "", "rating_desc"));
        assert_eq!(names(&result), ["Sunny Kids", "Sunny Hills"]);
    }

    #[test]
    fn test_term_is_case_insensitive() {
        let data = sample();
        let result = query(&data, &descriptor("SUNNY", "", ""));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_term_matches_city_and_country() {
        let data = vec![
            Facility::new("Alpha", "Berlin", 4.0, 100).with_country("Germany"),
            Facility::new("Beta", "Dubai", 4.0, 100).with_country("UAE"),
            Facility::new("Gamma", "Vienna", 4.0, 100),
        ];

        assert_eq!(names(&query(&data, &descriptor("munich", "", ""))), Vec::<&str>::new());
        assert_eq!(names(&query(&data, &descriptor("berl", "", ""))), ["Alpha"]);
        assert_eq!(names(&query(&data, &descriptor("uae", "", ""))), ["Beta"]);
        // Missing country is simply no match
        assert_eq!(names(&query(&data, &descriptor("germ", "", ""))), ["Alpha"]);
    }

    #[test]
    fn test_term_filter_property() {
        let data = vec![
            Facility::new("Sunny Kids", "Berlin", 4.5, 800),
            Facility::new("Moon Garden", "Sunnyvale", 4.1, 700),
            Facility::new("Star House", "Paris", 3.9, 500).with_country("Sunnyland"),
            Facility::new("Rain Drops", "Oslo", 4.0, 650).with_country("Norway"),
        ];
        let result = query(&data, &descriptor("sunny", "", ""));

        let hit = |f: &Facility| {
            f.name.to_lowercase().contains("sunny")
                || f.city.to_lowercase().contains("sunny")
                || f
                    .country
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains("sunny"))
        };

        assert!(result.iter().all(|&f| hit(f)));
        let excluded: Vec<&Facility> = data
            .iter()
            .filter(|f| !result.iter().any(|r| r.id == f.id))
            .collect();
        assert!(excluded.iter().all(|&f| !hit(f)));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_fee_ascending() {
        let data = sample();
        let result = query(&data, &descriptor("", "", "fee_asc"));
        assert_eq!(names(&result), ["Happy Stars", "Sunny Kids", "Sunny Hills"]);
    }

    #[test]
    fn test_fee_descending() {
        let data = sample();
        let result = query(&data, &descriptor("", "", "fee_desc"));
        assert_eq!(names(&result), ["Sunny Hills", "Sunny Kids", "Happy Stars"]);
    }

    #[test]
    fn test_name_is_case_sensitive_lexicographic() {
        let data = vec![
            Facility::new("bee Hive", "X", 4.0, 1),
            Facility::new("Apple Tree", "X", 4.0, 1),
            Facility::new("Zebra", "X", 4.0, 1),
        ];
        let result = query(&data, &descriptor("", "", "name"));
        assert_eq!(names(&result), ["Apple Tree", "Zebra", "bee Hive"]);
    }

    #[test]
    fn test_unknown_sort_key_behaves_like_rating_desc() {
        let data = sample();
        let bogus = query(&data, &descriptor("", "", "bogus"));
        let rating = query(&data, &descriptor("", "", "rating_desc"));
        assert_eq!(names(&bogus), names(&rating));
    }

    #[test]
    fn test_curriculum_filter_matches_any_tag() {
        let data = vec![
            Facility::new("Joined", "Berlin", 4.0, 100).with_curriculum(["Montessori", "International"]),
            Facility::new("Other", "Berlin", 4.0, 100).with_curriculum(["International"]),
            Facility::new("Second", "Berlin", 4.0, 100).with_curriculum(["Bilingual", "Montessori"]),
        ];

        let result = query(&data, &descriptor("", "Montessori", ""));
        assert_eq!(names(&result), ["Joined", "Second"]);

        let result = query(&data, &descriptor("", "montessori", ""));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_curriculum_sentinel_and_empty_disable_filter() {
        let data = vec![
            Facility::new("A", "Berlin", 4.0, 100).with_curriculum(["Montessori"]),
            Facility::new("B", "Berlin", 4.0, 100),
        ];
        assert_eq!(query(&data, &descriptor("", "All", "")).len(), 2);
        assert_eq!(query(&data, &descriptor("", "", "")).len(), 2);
    }

    #[test]
    fn test_curriculum_does_not_match_partial_tag() {
        let data = vec![Facility::new("A", "Berlin", 4.0, 100).with_curriculum(["International"])];
        assert!(query(&data, &descriptor("", "Inter", "")).is_empty());
    }

    #[test]
    fn test_term_and_curriculum_combine() {
        let data = vec![
            Facility::new("Sunny Kids", "Berlin", 4.5, 800).with_curriculum(["Montessori"]),
            Facility::new("Sunny Hills", "Berlin", 4.5, 900).with_curriculum(["Waldorf"]),
            Facility::new("Happy Stars", "Munich", 4.8, 600).with_curriculum(["Montessori"]),
        ];
        let result = query(&data, &descriptor("sunny", "Montessori", ""));
        assert_eq!(names(&result), ["Sunny Kids"]);
    }

    #[test]
    fn test_empty_dataset() {
        let data: Vec<Facility> = Vec::new();
        assert!(query(&data, &descriptor("anything", "Montessori", "name")).is_empty());
    }

    #[test]
    fn test_stable_for_every_sort_key() {
        // Every facility ties on every key
        let data: Vec<Facility> = (0..6)
            .map(|i| Facility::new("Same", format!("City {}", i), 4.0, 500))
            .collect();

        for key in SortKey::ALL {
            let result = query(&data, &CatalogQuery::new("", "", key));
            let cities: Vec<&str> = result.iter().map(|f| f.city.as_str()).collect();
            let expected: Vec<String> = (0..6).map(|i| format!("City {}", i)).collect();
            assert_eq!(cities, expected, "sort key {}", key);
        }
    }

    #[test]
    fn test_idempotent() {
        let data = sample();
        let q = descriptor("s", "", "fee_desc");
        let first: Vec<_> = query(&data, &q).iter().map(|f| f.id).collect();
        let second: Vec<_> = query(&data, &q).iter().map(|f| f.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dataset_is_untouched() {
        let data = sample();
        let before = data.clone();
        let _ = query(&data, &descriptor("sunny", "", "name"));
        assert_eq!(data, before);
    }

    #[test]
    fn test_curricula_are_distinct_in_first_seen_order() {
        let data = vec![
            Facility::new("A", "X", 4.0, 1).with_curriculum(["Montessori", "International"]),
            Facility::new("B", "X", 4.0, 1).with_curriculum(["international", "Waldorf"]),
        ];
        assert_eq!(curricula(&data), ["Montessori", "International", "Waldorf"]);
    }

    #[test]
    fn test_curricula_fold_non_ascii_like_the_filter() {
        let data = vec![
            Facility::new("A", "X", 4.0, 1).with_curriculum(["Éveil"]),
            Facility::new("B", "X", 3.0, 1).with_curriculum(["éveil"]),
        ];
        assert_eq!(curricula(&data), ["Éveil"]);

        let result = query(&data, &descriptor("", "ÉVEIL", ""));
        assert_eq!(names(&result), ["A", "B"]);
    }

    #[test]
    fn test_term_spanning_city_and_country_does_not_match() {
        use crate::core::facility::FacilityRecord;

        let record: FacilityRecord = serde_json::from_value(serde_json::json!({
            "name": "Sunshine House",
            "location": "Berlin, Germany",
            "curriculum": "Montessori",
            "rating": 4.9,
            "price": 1200
        }))
        .unwrap();
        let data = vec![record.into_facility()];

        assert!(query(&data, &descriptor("berlin, germany", "", "")).is_empty());
        assert_eq!(names(&query(&data, &descriptor("berlin", "", ""))), ["Sunshine House"]);
        assert_eq!(names(&query(&data, &descriptor("germany", "", ""))), ["Sunshine House"]);
    }
}
