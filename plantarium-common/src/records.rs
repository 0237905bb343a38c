//! Canonical plant record types
//!
//! Both upstream sources are normalized into [`PlantRecord`] so the
//! rest of the system never sees a source-specific shape. Optional
//! fields serialize as explicit nulls: a field Perenual never returns
//! looks exactly like a Trefle field that happened to be empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which third-party plant database a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantSource {
    Trefle,
    Perenual,
}

impl PlantSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantSource::Trefle => "trefle",
            PlantSource::Perenual => "perenual",
        }
    }
}

/// Canonical, source-normalized plant record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    /// Source-assigned id for search results, catalogue row id otherwise
    pub id: Option<i64>,
    /// Originating database; absent for locally created records
    pub source: Option<PlantSource>,
    pub trefle_id: Option<i64>,
    pub perenual_id: Option<i64>,
    pub slug: Option<String>,
    /// Always present and non-empty for any persisted record
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub family: Option<String>,
    pub family_common_name: Option<String>,
    pub genus: Option<String>,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub bibliography: Option<String>,
    pub year: Option<i32>,
    pub synonyms: Option<Vec<String>>,
    pub care_guide: Option<CareGuide>,
    /// Free-form key-value document; always a JSON object when set
    pub metadata: Option<serde_json::Value>,
}

impl PlantRecord {
    /// An empty record carrying only a scientific name
    pub fn named(scientific_name: impl Into<String>) -> Self {
        Self {
            id: None,
            source: None,
            trefle_id: None,
            perenual_id: None,
            slug: None,
            scientific_name: scientific_name.into(),
            common_name: None,
            family: None,
            family_common_name: None,
            genus: None,
            image_url: None,
            author: None,
            bibliography: None,
            year: None,
            synonyms: None,
            care_guide: None,
            metadata: None,
        }
    }
}

/// Structured care attributes parsed from unstructured section text.
/// Never persisted as its own column; clients fold it into
/// `metadata.care` on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareGuide {
    pub watering: Option<String>,
    pub sunlight: Option<Vec<String>>,
    pub pruning: Option<String>,
    pub hardiness: HardinessRange,
}

/// Zone range tokens keep their letter suffix ("9b")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardinessRange {
    pub min: Option<String>,
    pub max: Option<String>,
}

/// Outcome of comparing a record against its counterpart from the
/// other source. Request-scoped; discarded once the user accepts or
/// cancels the merge.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub original: PlantRecord,
    pub matched: Option<PlantRecord>,
    pub merged: PlantRecord,
    /// Names of the fields whose raw values disagreed
    pub differences: BTreeSet<String>,
}
