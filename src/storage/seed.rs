//! Loading facility seed data from YAML
//!
//! A seed file holds a `facilities:` list whose entries may use any
//! [`FacilityRecord`] shape. Records are normalized into [`Facility`] here so
//! nothing past the storage boundary sees the legacy shapes.

use crate::core::error::ConfigError;
use crate::core::facility::{Facility, FacilityRecord};
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

const DEMO_CATALOG: &str = include_str!("../../data/facilities.yaml");

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    facilities: Vec<FacilityRecord>,
}

/// Parse seed records from a YAML string
pub fn from_yaml_str(yaml: &str) -> Result<Vec<Facility>> {
    parse(yaml, None)
}

/// Load seed records from a YAML file
pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Vec<Facility>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })?;

    let facilities = parse(&content, Some(path.display().to_string()))?;

    tracing::info!(
        path = %path.display(),
        count = facilities.len(),
        "Loaded facility seed file"
    );
    Ok(facilities)
}

fn parse(content: &str, file: Option<String>) -> Result<Vec<Facility>> {
    let seed: SeedFile = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
        file,
        message: e.to_string(),
    })?;

    let facilities: Vec<Facility> = seed
        .facilities
        .into_iter()
        .map(FacilityRecord::into_facility)
        .collect();

    // Sorting by rating needs finite values
    if let Some((index, facility)) = facilities
        .iter()
        .enumerate()
        .find(|(_, f)| !f.rating.is_finite())
    {
        return Err(ConfigError::InvalidValue {
            field: format!("facilities[{}].rating", index),
            value: facility.rating.to_string(),
            message: format!("rating of '{}' must be a finite number", facility.name),
        }
        .into());
    }

    Ok(facilities)
}

/// The bundled demo catalog
pub fn demo_facilities() -> Result<Vec<Facility>> {
    from_yaml_str(DEMO_CATALOG)
}
