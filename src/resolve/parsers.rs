//! Fallible parsers composing the fallback chain
//!
//! Each parser is strict about its own format and returns an error for the
//! resolver to fall through; only the resolver decides what failure means.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, Record, RecordSequence};

/// Strict JSON array parse; records are the array's elements
pub(super) fn parse_json_array(raw: &str) -> Result<RecordSequence> {
    let records: Vec<JsonValue> = serde_json::from_str(raw)?;
    Ok(records)
}

/// Strict JSON object parse, wrapped as a one-element sequence
pub(super) fn parse_json_object(raw: &str) -> Result<RecordSequence> {
    let object: JsonObject = serde_json::from_str(raw)?;
    Ok(vec![JsonValue::Object(object)])
}

/// Delimited-table parse: header row then positional value rows
///
/// The first line defines column names (split on `,`, trimmed). Each
/// subsequent non-blank line is split on `,`; values pair positionally with
/// the columns, short rows fill trailing columns with the empty string, and
/// values beyond the column count are dropped. Cell values stay strings.
pub(super) fn parse_table(raw: &str) -> Result<RecordSequence> {
    let mut lines = raw.lines();

    let header = lines
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| Error::resolve("empty body, no header row"))?;

    let columns: Vec<String> = header.split(',').map(|c| c.trim().to_string()).collect();

    let mut records = RecordSequence::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(',').map(str::trim).collect();
        let mut row = JsonObject::new();
        for (i, column) in columns.iter().enumerate() {
            let value = values.get(i).copied().unwrap_or_default();
            row.insert(column.clone(), JsonValue::String(value.to_string()));
        }
        records.push(Record::Object(row));
    }

    if records.is_empty() {
        return Err(Error::resolve("no data rows after the header"));
    }

    Ok(records)
}
