//! Field access over raw tweet records (`serde_json::Value`), including the
//! canonical id form used as the uniqueness key throughout the pipeline.

use serde_json::Value;

/// Render a scalar id field to its canonical string form.
///
/// Upstream exports are inconsistent about id types: the search client emits
/// string ids, older dumps carry them as JSON numbers. Both spellings of the
/// same post must land on one key, so string ids are trimmed and numeric ids
/// are rendered in plain decimal before any set membership test.
fn canonical_scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Canonical uniqueness key of a record, or `None` if `id` is missing or not
/// a scalar.
pub fn canonical_id(record: &Value) -> Option<String> {
    record.get("id").and_then(canonical_scalar)
}

/// Canonical author id (same normalization as `canonical_id`).
pub fn author_id(record: &Value) -> Option<String> {
    record.get("author_id").and_then(canonical_scalar)
}

/// ISO language code of the record, as reported by the search API
/// (may be `"und"` for undetermined).
pub fn lang(record: &Value) -> Option<&str> {
    record.get("lang").and_then(|v| v.as_str())
}

/// Post text.
pub fn text(record: &Value) -> Option<&str> {
    record.get("text").and_then(|v| v.as_str())
}

/// RFC3339 creation timestamp string, when present.
pub fn created_at(record: &Value) -> Option<&str> {
    record.get("created_at").and_then(|v| v.as_str())
}
