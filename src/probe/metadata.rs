//! Probed program/stream metadata

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::ArchiverResult;

/// Metadata tree as reported by the prober: `programs` (each with
/// `program_id`, nested `streams` and optional `tags`) and top-level `streams`
/// (each with `index` and optional `tags`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataTree(Value);

/// Program a stream belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramSummary {
    pub program_id: i64,
    pub stream_indices: Vec<i64>,
    pub tags: BTreeMap<String, String>,
}

/// One stream with its tags and owning program, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    pub index: i64,
    pub codec_type: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub program: Option<ProgramSummary>,
}

impl MetadataTree {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse the prober's JSON output
    pub fn from_json(json: &str) -> ArchiverResult<Self> {
        Ok(Self(serde_json::from_str(json)?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Streams ordered by index, each joined with the program that lists it
    pub fn stream_summaries(&self) -> Vec<StreamSummary> {
        let mut by_stream: BTreeMap<i64, ProgramSummary> = BTreeMap::new();
        for program in array(&self.0, "programs") {
            let summary = ProgramSummary {
                program_id: program.get("program_id").and_then(Value::as_i64).unwrap_or_default(),
                stream_indices: array(program, "streams")
                    .filter_map(|stream| stream.get("index").and_then(Value::as_i64))
                    .collect(),
                tags: tags(program),
            };
            for index in &summary.stream_indices {
                by_stream.insert(*index, summary.clone());
            }
        }

        let mut streams: Vec<StreamSummary> = array(&self.0, "streams")
            .filter_map(|stream| {
                let index = stream.get("index").and_then(Value::as_i64)?;
                Some(StreamSummary {
                    index,
                    codec_type: stream
                        .get("codec_type")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    tags: tags(stream),
                    program: by_stream.get(&index).cloned(),
                })
            })
            .collect();
        streams.sort_by_key(|stream| stream.index);
        streams
    }
}

impl From<Value> for MetadataTree {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn array<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter())
        .into_iter()
        .flatten()
}

fn tags(value: &Value) -> BTreeMap<String, String> {
    value
        .get("tags")
        .and_then(Value::as_object)
        .map(|tags| {
            tags.iter()
                .map(|(key, value)| {
                    let text = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), text)
                })
                .collect()
        })
        .unwrap_or_default()
}
