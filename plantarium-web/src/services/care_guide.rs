//! Care-guide section parsing
//!
//! Perenual's care guides arrive as loosely labeled prose sections.
//! Extraction pulls the structured attributes out of them; a missing
//! section yields a missing field, never an error.

use serde::Deserialize;

use plantarium_common::records::{CareGuide, HardinessRange};

/// One labeled text section from the care-guide endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CareSection {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
}

/// Build a structured care guide from labeled sections
pub fn extract_care_guide(sections: &[CareSection]) -> CareGuide {
    let watering = section_description(sections, "watering").map(str::to_string);
    let sunlight = section_description(sections, "sunlight").map(|description| {
        description
            .split(',')
            .map(|token| token.trim().to_string())
            .collect()
    });
    let pruning = section_description(sections, "pruning").map(str::to_string);
    let hardiness = section_description(sections, "hardiness")
        .map(parse_hardiness)
        .unwrap_or_default();

    CareGuide {
        watering,
        sunlight,
        pruning,
        hardiness,
    }
}

fn section_description<'a>(sections: &'a [CareSection], kind: &str) -> Option<&'a str> {
    sections
        .iter()
        .find(|section| section.kind.as_deref() == Some(kind))
        .and_then(|section| section.description.as_deref())
}

/// Parse a zone range out of free text. The first digit run (plus one
/// optional trailing letter) is the minimum; a digit run immediately
/// after the word "to" is the maximum.
fn parse_hardiness(text: &str) -> HardinessRange {
    HardinessRange {
        min: first_zone_token(text),
        max: zone_token_after_to(text),
    }
}

fn first_zone_token(text: &str) -> Option<String> {
    let start = text.bytes().position(|b| b.is_ascii_digit())?;
    Some(zone_token_at(text, start))
}

fn zone_token_after_to(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    for i in 0..bytes.len().saturating_sub(3) {
        if bytes[i].eq_ignore_ascii_case(&b't')
            && bytes[i + 1].eq_ignore_ascii_case(&b'o')
            && bytes[i + 2] == b' '
            && bytes[i + 3].is_ascii_digit()
        {
            return Some(zone_token_at(text, i + 3));
        }
    }
    None
}

/// Read the digit run starting at `start`, plus one trailing ASCII letter
fn zone_token_at(text: &str, start: usize) -> String {
    let bytes = text.as_bytes();
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end].is_ascii_alphabetic() {
        end += 1;
    }
    text[start..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(kind: &str, description: &str) -> CareSection {
        CareSection {
            kind: Some(kind.to_string()),
            description: Some(description.to_string()),
        }
    }

    #[test]
    fn full_guide_extracts_every_attribute() {
        let sections = vec![
            section("watering", "Water when the top inch of soil is dry."),
            section("sunlight", "part shade, full sun"),
            section("pruning", "Prune in early spring."),
            section("hardiness", "Hardy in USDA zones 7 to 9b."),
        ];

        let guide = extract_care_guide(&sections);

        assert_eq!(
            guide.watering.as_deref(),
            Some("Water when the top inch of soil is dry.")
        );
        assert_eq!(
            guide.sunlight,
            Some(vec!["part shade".to_string(), "full sun".to_string()])
        );
        assert_eq!(guide.pruning.as_deref(), Some("Prune in early spring."));
        assert_eq!(guide.hardiness.min.as_deref(), Some("7"));
        assert_eq!(guide.hardiness.max.as_deref(), Some("9b"));
    }

    #[test]
    fn missing_sections_yield_missing_fields() {
        let sections = vec![section("watering", "Average")];

        let guide = extract_care_guide(&sections);

        assert_eq!(guide.watering.as_deref(), Some("Average"));
        assert!(guide.sunlight.is_none());
        assert!(guide.pruning.is_none());
        assert!(guide.hardiness.min.is_none());
        assert!(guide.hardiness.max.is_none());
    }

    #[test]
    fn empty_sections_are_fine() {
        let guide = extract_care_guide(&[]);
        assert!(guide.watering.is_none());
        assert!(guide.sunlight.is_none());
    }

    #[test]
    fn unlabeled_sections_are_skipped() {
        let sections = vec![CareSection {
            kind: None,
            description: Some("stray text".to_string()),
        }];
        let guide = extract_care_guide(&sections);
        assert!(guide.watering.is_none());
    }

    #[test]
    fn hardiness_single_zone_has_no_max() {
        let sections = vec![section("hardiness", "Zone 10a")];
        let guide = extract_care_guide(&sections);
        assert_eq!(guide.hardiness.min.as_deref(), Some("10a"));
        assert!(guide.hardiness.max.is_none());
    }

    #[test]
    fn hardiness_range_is_case_insensitive_on_to() {
        let sections = vec![section("hardiness", "8 TO 11")];
        let guide = extract_care_guide(&sections);
        assert_eq!(guide.hardiness.min.as_deref(), Some("8"));
        assert_eq!(guide.hardiness.max.as_deref(), Some("11"));
    }

    #[test]
    fn hardiness_without_digits_is_empty() {
        let sections = vec![section("hardiness", "unknown")];
        let guide = extract_care_guide(&sections);
        assert!(guide.hardiness.min.is_none());
        assert!(guide.hardiness.max.is_none());
    }

    #[test]
    fn sunlight_tokens_are_trimmed() {
        let sections = vec![section("sunlight", " full sun ,  part shade")];
        let guide = extract_care_guide(&sections);
        assert_eq!(
            guide.sunlight,
            Some(vec!["full sun".to_string(), "part shade".to_string()])
        );
    }
}
