//! Two-source record merging
//!
//! Combines a record with its counterpart from the other source into
//! one canonical record, reporting which fields disagreed so the user
//! can audit the result instead of reconciling every field by hand.
//! Field-wise selection with fixed tie-breaks; no I/O, no randomness.

use std::collections::BTreeSet;

use serde_json::json;

use crate::records::{ComparisonResult, PlantRecord, PlantSource};

/// Merge `a` with `b`, treating `a` as the base record.
///
/// Selection rules per field:
/// - plain text: the only non-empty side wins; when both are present
///   the longer string wins and ties keep `a`
/// - image: `b` wins when it has one
/// - synonyms: order-stable union of both lists
/// - care guide: `b` wins when it has one
///
/// A field is reported in `differences` whenever the two raw values
/// disagree, regardless of which side was chosen.
pub fn merge_records(a: &PlantRecord, b: &PlantRecord) -> ComparisonResult {
    let mut merged = a.clone();
    let mut differences = BTreeSet::new();

    if let Some(name) = merge_text(
        "scientific_name",
        Some(a.scientific_name.as_str()),
        Some(b.scientific_name.as_str()),
        &mut differences,
    ) {
        merged.scientific_name = name;
    }

    merged.common_name = merge_text(
        "common_name",
        a.common_name.as_deref(),
        b.common_name.as_deref(),
        &mut differences,
    );
    merged.family = merge_text(
        "family",
        a.family.as_deref(),
        b.family.as_deref(),
        &mut differences,
    );
    merged.family_common_name = merge_text(
        "family_common_name",
        a.family_common_name.as_deref(),
        b.family_common_name.as_deref(),
        &mut differences,
    );
    merged.genus = merge_text(
        "genus",
        a.genus.as_deref(),
        b.genus.as_deref(),
        &mut differences,
    );
    merged.bibliography = merge_text(
        "bibliography",
        a.bibliography.as_deref(),
        b.bibliography.as_deref(),
        &mut differences,
    );
    merged.author = merge_text(
        "author",
        a.author.as_deref(),
        b.author.as_deref(),
        &mut differences,
    );

    if a.image_url != b.image_url {
        differences.insert("image_url".to_string());
        merged.image_url = b
            .image_url
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| a.image_url.clone());
    }

    if a.synonyms.is_some() || b.synonyms.is_some() {
        let mut combined: Vec<String> = Vec::new();
        for synonym in a.synonyms.iter().flatten().chain(b.synonyms.iter().flatten()) {
            if !combined.contains(synonym) {
                combined.push(synonym.clone());
            }
        }
        merged.synonyms = (!combined.is_empty()).then_some(combined);
        if a.synonyms != b.synonyms {
            differences.insert("synonyms".to_string());
        }
    }

    if a.care_guide.is_some() || b.care_guide.is_some() {
        merged.care_guide = b.care_guide.clone().or_else(|| a.care_guide.clone());
        if a.care_guide != b.care_guide {
            differences.insert("care_guide".to_string());
        }
    }

    merged.trefle_id = source_id(a, b, PlantSource::Trefle);
    merged.perenual_id = source_id(a, b, PlantSource::Perenual);
    merged.metadata = Some(json!({ "merged_from": [a.source, b.source] }));

    tracing::debug!(
        differences = differences.len(),
        scientific_name = %merged.scientific_name,
        "Merged plant records"
    );

    ComparisonResult {
        original: a.clone(),
        matched: Some(b.clone()),
        merged,
        differences,
    }
}

/// Merge one text field, recording a difference whenever the raw
/// values disagree. Empty strings count as absent for selection but
/// still participate in the difference check.
fn merge_text(
    field: &str,
    a_raw: Option<&str>,
    b_raw: Option<&str>,
    differences: &mut BTreeSet<String>,
) -> Option<String> {
    if a_raw != b_raw {
        differences.insert(field.to_string());
    }

    let a = a_raw.filter(|s| !s.is_empty());
    let b = b_raw.filter(|s| !s.is_empty());

    match (a, b) {
        (None, Some(b_val)) => Some(b_val.to_string()),
        (Some(a_val), Some(b_val)) => {
            if b_val.chars().count() > a_val.chars().count() {
                Some(b_val.to_string())
            } else {
                Some(a_val.to_string())
            }
        }
        (Some(a_val), None) => Some(a_val.to_string()),
        (None, None) => a_raw.map(str::to_string),
    }
}

/// The id contributed by whichever record came from `source`
fn source_id(a: &PlantRecord, b: &PlantRecord, source: PlantSource) -> Option<i64> {
    if a.source == Some(source) {
        a.id
    } else if b.source == Some(source) {
        b.id
    } else {
        None
    }
}
