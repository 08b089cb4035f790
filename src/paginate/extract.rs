//! Cursor and sub-record extraction from page records
//!
//! Simple dot-notation paths are walked by hand; patterns containing a `*`
//! wildcard go through jsonpath-rust.

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record, RecordSequence};
use tracing::warn;

/// Find the pagination token at `path` inside the page's records
///
/// Records are scanned in order; the first record where the path resolves
/// decides the outcome. String and numeric tokens are accepted; any other
/// shape is unparsable and treated as termination (fail closed).
pub(super) fn cursor(records: &[Record], path: &str) -> Option<String> {
    for record in records {
        let Some(value) = value_at(record, path) else {
            continue;
        };

        return match value {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            other => {
                warn!(
                    path,
                    found = %shape_of(other),
                    "cursor field present but unparsable, terminating pagination"
                );
                None
            }
        };
    }

    None
}

/// Extract the qualifying sub-records of a page at `path`
///
/// A path the page does not contain yields no records; only an invalid path
/// expression is an error (a caller programming mistake).
pub(super) fn sub_records(records: &[Record], path: &str) -> Result<RecordSequence> {
    let mut matched = RecordSequence::new();

    for record in records {
        if path.contains('*') {
            matched.extend(jsonpath_matches(record, path)?);
        } else if let Some(value) = value_at(record, path) {
            match value {
                JsonValue::Array(items) => matched.extend(items.iter().cloned()),
                other => matched.push(other.clone()),
            }
        }
    }

    Ok(matched)
}

/// Walk a simple dot-notation path
fn value_at<'a>(record: &'a Record, path: &str) -> Option<&'a JsonValue> {
    let mut current = record;
    for part in path.split('.') {
        match current {
            JsonValue::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Evaluate a wildcard pattern with jsonpath-rust
fn jsonpath_matches(record: &Record, path: &str) -> Result<RecordSequence> {
    use jsonpath_rust::JsonPath;

    let normalized = if path.starts_with('$') {
        path.to_string()
    } else {
        format!("$.{path}")
    };

    let jp = JsonPath::try_from(normalized.as_str())
        .map_err(|e| Error::record_extraction(path, format!("invalid path: {e}")))?;

    match jp.find(record) {
        JsonValue::Array(items) => Ok(items),
        JsonValue::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

fn shape_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
