//! Perenual API client
//!
//! Perenual's schema diverges from the canonical record in several
//! ways, so search responses are reshaped here: the scientific name
//! may arrive as a list, the image sits in a nested structure, and a
//! handful of fields Perenual never returns are set to explicit nulls
//! so downstream code can treat both sources uniformly.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use plantarium_common::records::{CareGuide, PlantRecord, PlantSource};

use super::care_guide::{extract_care_guide, CareSection};

const PERENUAL_BASE_URL: &str = "https://perenual.com/api";
const USER_AGENT: &str = "Plantarium/0.1.0 (personal plant catalogue)";

/// Perenual client errors
#[derive(Debug, Error)]
pub enum PerenualError {
    /// API key missing from configuration; checked before any network call
    #[error("Perenual API key not configured")]
    NotConfigured,

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Perenual returned a non-success status
    #[error("API error {0}")]
    Api(u16),

    /// Failed to parse the response JSON
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Perenual species-list response
#[derive(Debug, Deserialize)]
struct SpeciesListResponse {
    #[serde(default)]
    data: Vec<PerenualSpecies>,
}

/// String-or-list field; Perenual has returned both over time
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_first(self) -> Option<String> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.into_iter().next(),
        }
    }
}

/// One species entry as Perenual returns it
#[derive(Debug, Deserialize)]
struct PerenualSpecies {
    id: i64,
    common_name: Option<String>,
    scientific_name: Option<OneOrMany>,
    family: Option<String>,
    genus: Option<String>,
    default_image: Option<PerenualImage>,
}

#[derive(Debug, Deserialize)]
struct PerenualImage {
    regular_url: Option<String>,
    original_url: Option<String>,
}

/// Perenual care-guide list response
#[derive(Debug, Deserialize)]
struct CareGuideListResponse {
    #[serde(default)]
    data: Vec<CareGuideEntry>,
}

#[derive(Debug, Deserialize)]
struct CareGuideEntry {
    #[serde(default)]
    section: Vec<CareSection>,
}

/// Perenual API client
#[derive(Clone)]
pub struct PerenualClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl PerenualClient {
    pub fn new(api_key: Option<String>) -> Result<Self, PerenualError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PerenualError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: PERENUAL_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (tests use a local mock)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search species by an already-sanitized query
    pub async fn search(&self, query: &str) -> Result<Vec<PlantRecord>, PerenualError> {
        let key = self.api_key.as_deref().ok_or(PerenualError::NotConfigured)?;

        tracing::debug!(query = %query, "Querying Perenual");

        let response = self
            .http
            .get(format!("{}/v2/species-list", self.base_url))
            .query(&[("key", key), ("q", query)])
            .send()
            .await
            .map_err(|e| PerenualError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PerenualError::Api(status.as_u16()));
        }

        let parsed: SpeciesListResponse = response
            .json()
            .await
            .map_err(|e| PerenualError::Parse(e.to_string()))?;

        let records: Vec<PlantRecord> = parsed
            .data
            .into_iter()
            .filter_map(normalize_species)
            .collect();

        tracing::info!(query = %query, results = records.len(), "Perenual search complete");

        Ok(records)
    }

    /// Fetch and parse the care guide for a species.
    ///
    /// The care-guide endpoint is not under /v2. Species without a
    /// guide yield None.
    pub async fn fetch_care_guide(
        &self,
        species_id: i64,
    ) -> Result<Option<CareGuide>, PerenualError> {
        let key = self.api_key.as_deref().ok_or(PerenualError::NotConfigured)?;

        tracing::debug!(species_id, "Fetching Perenual care guide");

        let species_id = species_id.to_string();
        let response = self
            .http
            .get(format!("{}/species-care-guide-list", self.base_url))
            .query(&[
                ("species_id", species_id.as_str()),
                ("page", "1"),
                ("key", key),
            ])
            .send()
            .await
            .map_err(|e| PerenualError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PerenualError::Api(status.as_u16()));
        }

        let parsed: CareGuideListResponse = response
            .json()
            .await
            .map_err(|e| PerenualError::Parse(e.to_string()))?;

        let Some(entry) = parsed.data.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(extract_care_guide(&entry.section)))
    }
}

/// Reshape a Perenual species onto the canonical record. Fields the
/// species-list response never carries become explicit nulls rather
/// than being left out.
fn normalize_species(species: PerenualSpecies) -> Option<PlantRecord> {
    let scientific_name = species
        .scientific_name
        .and_then(OneOrMany::into_first)
        .filter(|name| !name.is_empty())?;

    let image_url = species
        .default_image
        .and_then(|image| image.regular_url.or(image.original_url));

    Some(PlantRecord {
        id: Some(species.id),
        source: Some(PlantSource::Perenual),
        trefle_id: None,
        perenual_id: Some(species.id),
        // Perenual has no slugs
        slug: None,
        scientific_name,
        common_name: species.common_name,
        family: species.family,
        // Not provided by Perenual
        family_common_name: None,
        genus: species.genus,
        image_url,
        // Not in the species-list response
        author: None,
        bibliography: None,
        year: None,
        synonyms: None,
        care_guide: None,
        metadata: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scientific_name_list_takes_first_element() {
        let species: PerenualSpecies = serde_json::from_value(json!({
            "id": 3,
            "common_name": "monstera",
            "scientific_name": ["Monstera deliciosa", "Monstera borsigiana"],
            "default_image": {
                "regular_url": "https://perenual.com/storage/regular/m.jpg",
                "original_url": "https://perenual.com/storage/og/m.jpg"
            }
        }))
        .unwrap();

        let record = normalize_species(species).unwrap();

        assert_eq!(record.scientific_name, "Monstera deliciosa");
        assert_eq!(record.source, Some(PlantSource::Perenual));
        assert_eq!(record.perenual_id, Some(3));
        assert!(record.trefle_id.is_none());
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://perenual.com/storage/regular/m.jpg")
        );
    }

    #[test]
    fn scientific_name_string_is_accepted_too() {
        let species: PerenualSpecies = serde_json::from_value(json!({
            "id": 4,
            "scientific_name": "Ficus lyrata"
        }))
        .unwrap();

        let record = normalize_species(species).unwrap();
        assert_eq!(record.scientific_name, "Ficus lyrata");
        assert!(record.image_url.is_none());
    }

    #[test]
    fn image_falls_back_to_original_resolution() {
        let species: PerenualSpecies = serde_json::from_value(json!({
            "id": 5,
            "scientific_name": ["Alocasia macrorrhiza"],
            "default_image": { "original_url": "https://perenual.com/storage/og/a.jpg" }
        }))
        .unwrap();

        let record = normalize_species(species).unwrap();
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://perenual.com/storage/og/a.jpg")
        );
    }

    #[test]
    fn fields_perenual_never_returns_are_explicit_nulls() {
        let species: PerenualSpecies = serde_json::from_value(json!({
            "id": 6,
            "scientific_name": "Ficus lyrata"
        }))
        .unwrap();

        let record = normalize_species(species).unwrap();
        let serialized = serde_json::to_value(&record).unwrap();

        for field in ["year", "bibliography", "author", "synonyms", "family_common_name", "slug"] {
            assert_eq!(serialized[field], serde_json::Value::Null, "{}", field);
        }
    }

    #[test]
    fn records_without_scientific_name_are_dropped() {
        let species: PerenualSpecies = serde_json::from_value(json!({
            "id": 7,
            "common_name": "nameless"
        }))
        .unwrap();

        assert!(normalize_species(species).is_none());
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_network_call() {
        let client = PerenualClient::new(None).unwrap();
        assert!(matches!(
            client.search("monstera").await,
            Err(PerenualError::NotConfigured)
        ));
        assert!(matches!(
            client.fetch_care_guide(3).await,
            Err(PerenualError::NotConfigured)
        ));
    }
}
