// src/source/records.rs
// =============================================================================
// This module reads and writes the intermediate records file (urls.csv).
//
// Format: a header row `description,url,category`, then one row per link.
// The `extract` command writes it; the `check` command reads it back, so the
// table can be hand-edited between the two steps.
// =============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::checker::InputRecord;

// A row as it appears on disk; missing columns read as empty
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordRow {
    description: Option<String>,
    url: Option<String>,
    category: Option<String>,
}

impl From<RecordRow> for InputRecord {
    fn from(row: RecordRow) -> Self {
        let description = row.description.unwrap_or_default();
        InputRecord {
            description: description.trim().trim_matches('"').to_string(),
            url: row.url.unwrap_or_default().trim().to_string(),
            category: row.category.unwrap_or_default(),
        }
    }
}

pub fn write_records_csv(path: &Path, records: &[InputRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    // serialize() only writes the header once a row exists
    if records.is_empty() {
        writer.write_record(["description", "url", "category"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn read_records_csv(path: &Path) -> Result<Vec<InputRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<RecordRow>().enumerate() {
        // +2: one for the header, one because rows are 1-based
        let row = row.with_context(|| format!("{}: bad row {}", path.display(), index + 2))?;
        records.push(InputRecord::from(row));
    }

    Ok(records)
}
