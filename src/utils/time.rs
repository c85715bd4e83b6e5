//! Index-to-time tables produced by scene detection

use std::path::Path;

use serde::Deserialize;

use crate::domain::model::TimeCode;
use crate::error::{ArchiverError, ArchiverResult};

/// A table entry is written either as a number or as a numeric string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TableEntry {
    Seconds(f64),
    Text(String),
}

impl TableEntry {
    fn to_time_code(&self) -> ArchiverResult<TimeCode> {
        match self {
            TableEntry::Seconds(seconds) => TimeCode::from_secs_f64(*seconds),
            TableEntry::Text(text) => {
                TimeCode::parse_seconds(text.trim()).ok_or_else(|| ArchiverError::MalformedTimeString {
                    input: text.clone(),
                })
            }
        }
    }
}

/// Parse a JSON array of seconds, e.g. `["0", "4.004", 9.5]`
pub fn parse_time_table(json: &str) -> ArchiverResult<Vec<TimeCode>> {
    let entries: Vec<TableEntry> = serde_json::from_str(json)?;
    entries.iter().map(TableEntry::to_time_code).collect()
}

/// Load a time table file
pub fn load_time_table(path: &Path) -> ArchiverResult<Vec<TimeCode>> {
    if !path.exists() {
        return Err(ArchiverError::source_not_found(path));
    }
    parse_time_table(&std::fs::read_to_string(path)?)
}
