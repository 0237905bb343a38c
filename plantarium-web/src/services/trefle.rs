//! Trefle API client
//!
//! Proxies species search to trefle.io. Trefle's schema is the model
//! for the canonical record, so the mapping is near 1:1.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use plantarium_common::records::{PlantRecord, PlantSource};

const TREFLE_BASE_URL: &str = "https://trefle.io/api/v1";
const USER_AGENT: &str = "Plantarium/0.1.0 (personal plant catalogue)";

/// Query sent when the sanitized input collapsed to nothing
const FALLBACK_QUERY: &str = "alocasia";

/// Trefle client errors
#[derive(Debug, Error)]
pub enum TrefleError {
    /// API key missing from configuration; checked before any network call
    #[error("Trefle API key not configured")]
    NotConfigured,

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Trefle returned a non-success status
    #[error("API error {0}")]
    Api(u16),

    /// Failed to parse the response JSON
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Trefle species search response
#[derive(Debug, Deserialize)]
struct TrefleSearchResponse {
    #[serde(default)]
    data: Vec<TrefleSpecies>,
}

/// One species entry as Trefle returns it
#[derive(Debug, Deserialize)]
struct TrefleSpecies {
    id: i64,
    slug: Option<String>,
    scientific_name: Option<String>,
    common_name: Option<String>,
    family: Option<String>,
    family_common_name: Option<String>,
    genus: Option<String>,
    image_url: Option<String>,
    author: Option<String>,
    bibliography: Option<String>,
    year: Option<i32>,
    synonyms: Option<Vec<String>>,
}

/// Trefle API client
#[derive(Clone)]
pub struct TrefleClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TrefleClient {
    pub fn new(api_key: Option<String>) -> Result<Self, TrefleError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TrefleError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: TREFLE_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (tests use a local mock)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search species by an already-sanitized query
    pub async fn search(&self, query: &str) -> Result<Vec<PlantRecord>, TrefleError> {
        let token = self.api_key.as_deref().ok_or(TrefleError::NotConfigured)?;
        let query = if query.is_empty() { FALLBACK_QUERY } else { query };

        tracing::debug!(query = %query, "Querying Trefle");

        let response = self
            .http
            .get(format!("{}/plants/search", self.base_url))
            .query(&[("token", token), ("q", query)])
            .send()
            .await
            .map_err(|e| TrefleError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrefleError::Api(status.as_u16()));
        }

        let parsed: TrefleSearchResponse = response
            .json()
            .await
            .map_err(|e| TrefleError::Parse(e.to_string()))?;

        let records: Vec<PlantRecord> = parsed
            .data
            .into_iter()
            .filter_map(normalize_species)
            .collect();

        tracing::info!(query = %query, results = records.len(), "Trefle search complete");

        Ok(records)
    }
}

/// Map a Trefle species onto the canonical record. Entries without a
/// scientific name are dropped rather than surfaced half-formed.
fn normalize_species(species: TrefleSpecies) -> Option<PlantRecord> {
    let scientific_name = species.scientific_name.filter(|name| !name.is_empty())?;

    Some(PlantRecord {
        id: Some(species.id),
        source: Some(PlantSource::Trefle),
        trefle_id: Some(species.id),
        perenual_id: None,
        slug: species.slug,
        scientific_name,
        common_name: species.common_name,
        family: species.family,
        family_common_name: species.family_common_name,
        genus: species.genus,
        image_url: species.image_url,
        author: species.author,
        bibliography: species.bibliography,
        year: species.year,
        synonyms: species.synonyms,
        care_guide: None,
        metadata: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn species_maps_near_one_to_one() {
        let species: TrefleSpecies = serde_json::from_value(json!({
            "id": 192740,
            "slug": "monstera-deliciosa",
            "scientific_name": "Monstera deliciosa",
            "common_name": "Swiss cheese plant",
            "family": "Araceae",
            "family_common_name": "Arum family",
            "genus": "Monstera",
            "image_url": "https://bs.plantnet.org/image/o/abc",
            "author": "Liebm.",
            "bibliography": "Vidensk. Meddel. 1849",
            "year": 1849,
            "synonyms": ["Philodendron pertusum"]
        }))
        .unwrap();

        let record = normalize_species(species).unwrap();

        assert_eq!(record.id, Some(192740));
        assert_eq!(record.source, Some(PlantSource::Trefle));
        assert_eq!(record.trefle_id, Some(192740));
        assert!(record.perenual_id.is_none());
        assert_eq!(record.scientific_name, "Monstera deliciosa");
        assert_eq!(record.family_common_name.as_deref(), Some("Arum family"));
        assert_eq!(record.year, Some(1849));
        assert_eq!(
            record.synonyms,
            Some(vec!["Philodendron pertusum".to_string()])
        );
    }

    #[test]
    fn entries_without_scientific_name_are_dropped() {
        let species: TrefleSpecies = serde_json::from_value(json!({
            "id": 1,
            "common_name": "Mystery plant"
        }))
        .unwrap();

        assert!(normalize_species(species).is_none());
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_network_call() {
        let client = TrefleClient::new(None).unwrap();
        let result = client.search("monstera").await;
        assert!(matches!(result, Err(TrefleError::NotConfigured)));
    }
}
