//! Input validation for untrusted request data
//!
//! Pure functions, no I/O. Invalid input is reported as a value
//! (`None`, an empty string, a missing-field list), never as an error
//! or a panic; callers translate rejections into client-facing 400s.

use serde_json::Value;

/// Default cap for free-form string fields
pub const MAX_STRING_LEN: usize = 255;
/// Cap for URL-valued fields
pub const MAX_URL_LEN: usize = 2048;
/// Cap for long-form note fields
pub const MAX_NOTES_LEN: usize = 4096;
/// Default cap for search queries forwarded upstream
pub const MAX_QUERY_LEN: usize = 100;
/// Default serialized-size cap for metadata documents, in bytes
pub const MAX_METADATA_BYTES: usize = 10 * 1024;

/// Parse an id parameter. Accepts ASCII digits only, with no
/// surrounding whitespace, and the parsed value must be positive.
pub fn validate_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let parsed = raw.parse::<i64>().ok()?;
    (parsed > 0).then_some(parsed)
}

/// Trim and length-cap a string field. Empty after trimming is
/// invalid; over-long content is truncated to `max_len` characters,
/// not rejected.
pub fn validate_string(raw: &str, max_len: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_len).collect())
}

/// Sanitize a search query before it is forwarded upstream. Total:
/// anything unusable collapses to an empty string. Trims, truncates
/// to `max_len`, then strips every character outside letters, digits,
/// underscore, whitespace, hyphen and apostrophe.
pub fn validate_search_query(raw: Option<&str>, max_len: usize) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    raw.trim()
        .chars()
        .take(max_len)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-' | '\''))
        .collect()
}

/// Deep-copy a metadata document through a serialize/re-parse round
/// trip. Only objects are accepted (arrays and scalars are invalid),
/// and only under the serialized-size cap.
pub fn sanitize_metadata(raw: &Value, max_bytes: usize) -> Option<Value> {
    if !raw.is_object() {
        return None;
    }
    let serialized = serde_json::to_string(raw).ok()?;
    if serialized.len() > max_bytes {
        return None;
    }
    serde_json::from_str(&serialized).ok()
}

/// Result of a required-field presence check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields {
    pub valid: bool,
    pub missing: Vec<String>,
}

/// Check that every field in `fields` is present in `body`. A field
/// counts as missing when absent, null, or an empty string; `0` and
/// `false` count as present.
pub fn validate_required(body: &Value, fields: &[&str]) -> RequiredFields {
    let mut missing = Vec::new();
    for field in fields {
        let present = match body.get(*field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        };
        if !present {
            missing.push((*field).to_string());
        }
    }
    RequiredFields {
        valid: missing.is_empty(),
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_id_accepts_positive_integers() {
        assert_eq!(validate_id("123"), Some(123));
        assert_eq!(validate_id("1"), Some(1));
        assert_eq!(validate_id("999999999"), Some(999999999));
    }

    #[test]
    fn validate_id_rejects_everything_else() {
        assert_eq!(validate_id(""), None);
        assert_eq!(validate_id("abc"), None);
        assert_eq!(validate_id("0"), None);
        assert_eq!(validate_id("-1"), None);
        assert_eq!(validate_id("1.5"), None);
        assert_eq!(validate_id("12abc"), None);
        // No trimming for ids
        assert_eq!(validate_id("  42  "), None);
    }

    #[test]
    fn validate_id_admits_leading_zeros() {
        // Digits-only rule; "007" parses to 7
        assert_eq!(validate_id("007"), Some(7));
    }

    #[test]
    fn validate_string_trims() {
        assert_eq!(validate_string("hello", MAX_STRING_LEN), Some("hello".to_string()));
        assert_eq!(
            validate_string("  hello  ", MAX_STRING_LEN),
            Some("hello".to_string())
        );
    }

    #[test]
    fn validate_string_rejects_empty() {
        assert_eq!(validate_string("", MAX_STRING_LEN), None);
        assert_eq!(validate_string("   ", MAX_STRING_LEN), None);
    }

    #[test]
    fn validate_string_truncates_to_exact_length() {
        assert_eq!(validate_string("hello world", 5), Some("hello".to_string()));
        assert_eq!(validate_string("abc", 10), Some("abc".to_string()));

        let long = "a".repeat(300);
        let validated = validate_string(&long, MAX_STRING_LEN).unwrap();
        assert_eq!(validated.chars().count(), MAX_STRING_LEN);
    }

    #[test]
    fn validate_search_query_sanitizes() {
        assert_eq!(validate_search_query(Some("alocasia"), MAX_QUERY_LEN), "alocasia");
        assert_eq!(
            validate_search_query(Some("  monstera  "), MAX_QUERY_LEN),
            "monstera"
        );
    }

    #[test]
    fn validate_search_query_is_total() {
        assert_eq!(validate_search_query(None, MAX_QUERY_LEN), "");
        assert_eq!(validate_search_query(Some(""), MAX_QUERY_LEN), "");
    }

    #[test]
    fn validate_search_query_strips_dangerous_characters() {
        assert_eq!(
            validate_search_query(Some("plant<script>"), MAX_QUERY_LEN),
            "plantscript"
        );
        assert_eq!(
            validate_search_query(Some("test&param=1"), MAX_QUERY_LEN),
            "testparam1"
        );
    }

    #[test]
    fn validate_search_query_keeps_plant_name_punctuation() {
        assert_eq!(
            validate_search_query(Some("Bird's Nest"), MAX_QUERY_LEN),
            "Bird's Nest"
        );
        assert_eq!(
            validate_search_query(Some("Alocasia-hybrid"), MAX_QUERY_LEN),
            "Alocasia-hybrid"
        );
    }

    #[test]
    fn validate_search_query_truncates() {
        let long = "a".repeat(150);
        assert_eq!(validate_search_query(Some(&long), MAX_QUERY_LEN).len(), 100);
    }

    #[test]
    fn sanitize_metadata_round_trips_objects() {
        let metadata = json!({ "care": { "water": "weekly" } });
        assert_eq!(
            sanitize_metadata(&metadata, MAX_METADATA_BYTES),
            Some(metadata)
        );
    }

    #[test]
    fn sanitize_metadata_is_idempotent() {
        let metadata = json!({ "a": 1, "b": [true, null], "c": { "d": "e" } });
        let once = sanitize_metadata(&metadata, MAX_METADATA_BYTES).unwrap();
        let twice = sanitize_metadata(&once, MAX_METADATA_BYTES).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn sanitize_metadata_rejects_non_objects() {
        assert_eq!(sanitize_metadata(&json!(null), MAX_METADATA_BYTES), None);
        assert_eq!(sanitize_metadata(&json!("string"), MAX_METADATA_BYTES), None);
        assert_eq!(sanitize_metadata(&json!(123), MAX_METADATA_BYTES), None);
        assert_eq!(sanitize_metadata(&json!([1, 2, 3]), MAX_METADATA_BYTES), None);
    }

    #[test]
    fn sanitize_metadata_enforces_size_cap() {
        let large = json!({ "data": "x".repeat(20000) });
        assert_eq!(sanitize_metadata(&large, MAX_METADATA_BYTES), None);

        let small = json!({ "data": "x".repeat(100) });
        assert_eq!(sanitize_metadata(&small, 50), None);
        assert!(sanitize_metadata(&small, 200).is_some());
    }

    #[test]
    fn validate_required_passes_complete_bodies() {
        let body = json!({ "name": "Plant", "id": 1 });
        let result = validate_required(&body, &["name", "id"]);
        assert!(result.valid);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn validate_required_reports_missing_fields() {
        let body = json!({ "name": "Plant", "empty": "", "null": null });
        let result = validate_required(&body, &["name", "empty", "null", "absent"]);
        assert!(!result.valid);
        assert_eq!(result.missing, vec!["empty", "null", "absent"]);
    }

    #[test]
    fn validate_required_treats_zero_and_false_as_present() {
        let body = json!({ "count": 0, "flag": false });
        let result = validate_required(&body, &["count", "flag"]);
        assert!(result.valid);
    }
}
