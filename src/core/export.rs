//! Flat-record export of query results or the full issue table.
//!
//! Records are insertion-ordered maps; the header row of the serialized
//! CSV is the field order of the first record.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use owo_colors::OwoColorize;

use crate::core::model::Issue;

/// One flat exportable record.
pub type Record = IndexMap<String, String>;

/// Flatten an issue into an export record. Field insertion order here is
/// the CSV column order.
pub fn issue_record(issue: &Issue) -> Record {
    let mut r = Record::new();
    r.insert("id".into(), issue.id.clone());
    r.insert("module".into(), issue.module_norm.clone());
    r.insert("priority".into(), issue.priority_norm.clone());
    r.insert("status".into(), issue.status_norm.clone());
    r.insert("type".into(), issue.kind_norm.clone());
    r.insert("title".into(), issue.title.clone());
    r.insert(
        "date".into(),
        issue.date.map(|d| d.to_rfc3339()).unwrap_or_default(),
    );
    r.insert(
        "age_days".into(),
        issue.age_days.map(|a| a.to_string()).unwrap_or_default(),
    );
    r.insert("risk_score".into(), format!("{:.1}", issue.risk_score));
    r.insert("category".into(), issue.category.clone());
    r.insert("keywords".into(), issue.keywords.join(" "));
    r.insert("closed".into(), issue.is_closed.to_string());
    r
}

fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Serialize records to CSV text. Header order follows the first
/// record's insertion order; later records are emitted in that order too.
pub fn to_csv(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut out = String::new();
    out.push_str(
        &headers.iter().map(|h| escape_cell(h)).collect::<Vec<_>>().join(","),
    );
    out.push('\n');

    for record in records {
        let line = headers
            .iter()
            .map(|h| escape_cell(record.get(*h).map(String::as_str).unwrap_or("")))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Push exported text onto the system clipboard.
pub fn copy_to_clipboard(content: &str) -> Result<()> {
    use arboard::Clipboard;

    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(content.to_string())
        .context("Failed to copy to clipboard")?;
    println!("{} Copied to clipboard", "✓".green());
    Ok(())
}
