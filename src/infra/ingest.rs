//! Feed ingest boundary: a local CSV or JSON file becomes raw rows.
//!
//! The engine treats feed retrieval as an external collaborator, so this
//! stays a thin reader: a small RFC-4180-ish CSV pass (quoted fields,
//! doubled quotes, CRLF) and a serde_json pass for an array of objects.
//! Malformed cells degrade to text; only an unreadable file is an error.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::model::RawRow;

/// Read rows from a feed file, dispatching on the extension.
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read feed file {}", path.display()))?;

    let rows = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        parse_json(&text)?
    } else {
        parse_csv(&text)
    };
    info!(file = %path.display(), rows = rows.len(), "feed ingested");
    Ok(rows)
}

/// Parse a JSON array of flat objects; non-string scalars are
/// stringified, null becomes empty.
pub fn parse_json(text: &str) -> Result<Vec<RawRow>> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse JSON feed")?;
    let items = value
        .as_array()
        .context("JSON feed must be an array of objects")?;

    let mut rows = Vec::new();
    for item in items {
        let Some(object) = item.as_object() else { continue };
        let mut row = RawRow::new();
        for (key, val) in object {
            let cell = match val {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            row.insert(key.clone(), cell);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parse CSV text with a header row into raw rows. Cells beyond the
/// header width are dropped; short records leave the trailing headers
/// empty.
pub fn parse_csv(text: &str) -> Vec<RawRow> {
    let mut records = csv_records(text);
    if records.is_empty() {
        return Vec::new();
    }
    let headers = records.remove(0);

    records
        .into_iter()
        .map(|record| {
            headers
                .iter()
                .cloned()
                .zip(record.into_iter().chain(std::iter::repeat(String::new())))
                .collect()
        })
        .collect()
}

/// Split CSV text into records of cells, honoring quoted fields with
/// embedded commas/newlines and doubled quotes.
fn csv_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut cell)),
            '\r' => {} // swallowed; \n terminates the record
            '\n' => {
                record.push(std::mem::take(&mut cell));
                if record.iter().any(|c| !c.trim().is_empty()) {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            _ => cell.push(c),
        }
    }

    // trailing record without a final newline
    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        if record.iter().any(|c| !c.trim().is_empty()) {
            records.push(record);
        }
    }
    records
}
