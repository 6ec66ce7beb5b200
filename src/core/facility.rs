//! Facility records
//!
//! [`Facility`] is the one canonical shape every other module works with.
//! Seed files and older exports describe facilities in two other shapes
//! ([`StructuredRecord`] and [`CombinedRecord`]); both are converted into the
//! canonical form by [`FacilityRecord::into_facility`] at the storage
//! boundary.

use crate::core::tags::{comma_joined, join_tags, split_tags};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A childcare facility in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,

    /// Curriculum tags, primary first
    #[serde(default)]
    pub curriculum: Vec<String>,

    pub rating: f64,
    #[serde(default)]
    pub reviews_count: u32,
    #[serde(default)]
    pub capacity: u32,

    /// Monthly fee in EUR
    pub monthly_fee: u32,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(flatten)]
    pub details: FacilityDetails,
}

/// Descriptive attributes shown on the detail page only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityDetails {
    pub phone: String,
    pub age_groups: String,
    pub total_children: u32,
    pub staff_ratio: String,
    pub parent_satisfaction: u8,
    pub teacher_quality: u8,
    pub facilities_rating: u8,
    pub safety_rating: u8,
    pub description: String,
    pub google_maps_url: Option<String>,
}

impl Facility {
    /// Create a facility with a fresh id and empty optional attributes
    pub fn new(name: impl Into<String>, city: impl Into<String>, rating: f64, monthly_fee: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            city: city.into(),
            country: None,
            curriculum: Vec::new(),
            rating,
            reviews_count: 0,
            capacity: 0,
            monthly_fee,
            features: Vec::new(),
            details: FacilityDetails::default(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_curriculum<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.curriculum = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn primary_curriculum(&self) -> Option<&str> {
        self.curriculum.first().map(String::as_str)
    }

    pub fn secondary_curriculum(&self) -> Option<&str> {
        self.curriculum.get(1).map(String::as_str)
    }

    /// Human readable location, "City, Country" or just "City"
    pub fn location(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.city, country),
            None => self.city.clone(),
        }
    }

    /// Flat wire representation used by the JSON API
    pub fn summary(&self) -> FacilitySummary {
        FacilitySummary {
            id: self.id,
            name: self.name.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            curriculum_main: self.primary_curriculum().map(String::from),
            curriculum_second: self.secondary_curriculum().map(String::from),
            curriculum: join_tags(&self.curriculum),
            rating: self.rating,
            reviews_count: self.reviews_count,
            capacity: self.capacity,
            monthly_fee: self.monthly_fee,
            features: join_tags(&self.features),
        }
    }
}

/// Flat JSON object returned by the catalog API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilitySummary {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub country: Option<String>,
    pub curriculum_main: Option<String>,
    pub curriculum_second: Option<String>,
    pub curriculum: String,
    pub rating: f64,
    pub reviews_count: u32,
    pub capacity: u32,
    pub monthly_fee: u32,
    pub features: String,
}

// =============================================================================
// Legacy record shapes
// =============================================================================

/// Record with separate city/country and up to two curriculum columns
#[derive(Debug, Clone, Deserialize)]
pub struct StructuredRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
    pub curriculum_main: String,
    #[serde(default)]
    pub curriculum_second: Option<String>,
    pub rating: f64,
    #[serde(default)]
    pub reviews_count: u32,
    #[serde(default)]
    pub capacity: u32,
    pub monthly_fee: u32,
    #[serde(default, with = "comma_joined")]
    pub features: Vec<String>,
    #[serde(flatten)]
    pub details: FacilityDetails,
}

/// Record with a single location string and comma-joined curriculum
#[derive(Debug, Clone, Deserialize)]
pub struct CombinedRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub location: String,
    #[serde(with = "comma_joined")]
    pub curriculum: Vec<String>,
    pub rating: f64,
    #[serde(default)]
    pub reviews_count: u32,
    #[serde(default)]
    pub capacity: u32,
    #[serde(alias = "monthly_fee")]
    pub price: u32,
    #[serde(default, with = "comma_joined")]
    pub features: Vec<String>,
    #[serde(flatten)]
    pub details: FacilityDetails,
}

/// Any facility shape accepted at the storage boundary
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FacilityRecord {
    Structured(StructuredRecord),
    Combined(CombinedRecord),
}

impl FacilityRecord {
    /// Normalize into the canonical shape, assigning an id when absent
    pub fn into_facility(self) -> Facility {
        match self {
            FacilityRecord::Structured(record) => record.into(),
            FacilityRecord::Combined(record) => record.into(),
        }
    }
}

impl From<StructuredRecord> for Facility {
    fn from(record: StructuredRecord) -> Self {
        let mut curriculum = split_tags(&record.curriculum_main);
        if let Some(second) = &record.curriculum_second {
            curriculum.extend(split_tags(second));
        }

        Facility {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            name: record.name,
            city: record.city.trim().to_string(),
            country: non_empty(record.country),
            curriculum,
            rating: record.rating,
            reviews_count: record.reviews_count,
            capacity: record.capacity,
            monthly_fee: record.monthly_fee,
            features: record.features,
            details: record.details,
        }
    }
}

impl From<CombinedRecord> for Facility {
    fn from(record: CombinedRecord) -> Self {
        let (city, country) = split_location(&record.location);

        Facility {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            name: record.name,
            city,
            country,
            curriculum: record.curriculum,
            rating: record.rating,
            reviews_count: record.reviews_count,
            capacity: record.capacity,
            monthly_fee: record.price,
            features: record.features,
            details: record.details,
        }
    }
}

/// Split "City, Country" at the first comma
fn split_location(location: &str) -> (String, Option<String>) {
    match location.split_once(',') {
        Some((city, country)) => (
            city.trim().to_string(),
            non_empty(Some(country.to_string())),
        ),
        None => (location.trim().to_string(), None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_record_normalizes() {
        let record: FacilityRecord = serde_json::from_value(json!({
            "name": "Little Explorers",
            "city": "Berlin",
            "country": "Germany",
            "curriculum_main": "Montessori",
            "curriculum_second": "Bilingual",
            "rating": 4.7,
            "reviews_count": 12,
            "capacity": 40,
            "monthly_fee": 850,
            "features": "Outdoor Garden,Art Studio"
        }))
        .unwrap();

        let facility = record.into_facility();
        assert_eq!(facility.city, "Berlin");
        assert_eq!(facility.country.as_deref(), Some("Germany"));
        assert_eq!(facility.curriculum, vec!["Montessori", "Bilingual"]);
        assert_eq!(facility.features, vec!["Outdoor Garden", "Art Studio"]);
        assert_eq!(facility.monthly_fee, 850);
    }

    #[test]
    fn test_structured_record_without_second_tag() {
        let record: FacilityRecord = serde_json::from_value(json!({
            "name": "Tiny Steps",
            "city": "Munich",
            "curriculum_main": "Waldorf",
            "curriculum_second": null,
            "rating": 4,
            "monthly_fee": 600
        }))
        .unwrap();

        let facility = record.into_facility();
        assert_eq!(facility.curriculum, vec!["Waldorf"]);
        assert_eq!(facility.country, None);
        assert_eq!(facility.rating, 4.0);
        assert!(facility.features.is_empty());
    }

    #[test]
    fn test_combined_record_splits_location_and_curriculum() {
        let record: FacilityRecord = serde_json::from_value(json!({
            "name": "Sunshine House",
            "location": "Dubai, UAE",
            "curriculum": "Montessori,International",
            "rating": 4.9,
            "reviews_count": 128,
            "capacity": 60,
            "price": 1200,
            "features": "Pool,Music Classes",
            "phone": "+971 4 000 0000",
            "staff_ratio": "1:4",
            "parent_satisfaction": 96
        }))
        .unwrap();

        let facility = record.into_facility();
        assert_eq!(facility.city, "Dubai");
        assert_eq!(facility.country.as_deref(), Some("UAE"));
        assert_eq!(facility.curriculum, vec!["Montessori", "International"]);
        assert_eq!(facility.monthly_fee, 1200);
        assert_eq!(facility.details.staff_ratio, "1:4");
        assert_eq!(facility.details.parent_satisfaction, 96);
    }

    #[test]
    fn test_combined_record_single_location() {
        let record: FacilityRecord = serde_json::from_value(json!({
            "name": "Garden Kids",
            "location": "Hamburg",
            "curriculum": "Reggio Emilia",
            "rating": 4.2,
            "price": 700
        }))
        .unwrap();

        let facility = record.into_facility();
        assert_eq!(facility.city, "Hamburg");
        assert_eq!(facility.country, None);
    }

    #[test]
    fn test_record_keeps_given_id() {
        let id = Uuid::new_v4();
        let record: FacilityRecord = serde_json::from_value(json!({
            "id": id,
            "name": "Garden Kids",
            "location": "Hamburg",
            "curriculum": "Reggio Emilia",
            "rating": 4.2,
            "price": 700
        }))
        .unwrap();

        assert_eq!(record.into_facility().id, id);
    }

    #[test]
    fn test_summary_flattens_tags() {
        let facility = Facility::new("Happy Stars", "Munich", 4.8, 600)
            .with_country("Germany")
            .with_curriculum(["Montessori", "International"])
            .with_features(["Garden", "Library"]);

        let summary = facility.summary();
        assert_eq!(summary.curriculum_main.as_deref(), Some("Montessori"));
        assert_eq!(summary.curriculum_second.as_deref(), Some("International"));
        assert_eq!(summary.curriculum, "Montessori,International");
        assert_eq!(summary.features, "Garden,Library");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["monthly_fee"], 600);
        assert_eq!(json["country"], "Germany");
    }

    #[test]
    fn test_location_display() {
        let facility = Facility::new("A", "Berlin", 4.0, 100);
        assert_eq!(facility.location(), "Berlin");
        assert_eq!(facility.with_country("Germany").location(), "Berlin, Germany");
    }
}
