// Domain rules - Business logic and policies

use regex::Regex;
use serde_json::Value;

use crate::error::{ArchiverError, ArchiverResult};

/// Paths the remuxer legitimately rewrites on a stream-copy cut.
///
/// Paths are written the way the metadata differ reports them, e.g.
/// `root['programs'][0]['streams'][1]['index']`.
const REMUX_VOLATILE_PATHS: &[&str] = &[
    // Physical identifiers and computed timing of program streams
    r"root\['programs'\]\[\d+\]\['pcr_pid'\]",
    r"root\['programs'\]\[\d+\]\['streams'\]\[\d+\]\['index'\]",
    r"root\['programs'\]\[\d+\]\['streams'\]\[\d+\]\['ts_id'\]",
    r"root\['programs'\]\[\d+\]\['streams'\]\[\d+\]\['id'\]",
    r"root\['programs'\]\[\d+\]\['streams'\]\[\d+\]\['start_pts'\]",
    r"root\['programs'\]\[\d+\]\['streams'\]\[\d+\]\['start_time'\]",
    r"root\['programs'\]\[\d+\]\['streams'\]\[\d+\]\['duration_ts'\]",
    r"root\['programs'\]\[\d+\]\['streams'\]\[\d+\]\['duration'\]",
    r"root\['programs'\]\[\d+\]\['streams'\]\[\d+\]\['bit_rate'\]",
    // Same fields on the top-level stream list
    r"root\['streams'\]\[\d+\]\['index'\]",
    r"root\['streams'\]\[\d+\]\['ts_id'\]",
    r"root\['streams'\]\[\d+\]\['id'\]",
    r"root\['streams'\]\[\d+\]\['r_frame_rate'\]",
    r"root\['streams'\]\[\d+\]\['avg_frame_rate'\]",
    r"root\['streams'\]\[\d+\]\['start_pts'\]",
    r"root\['streams'\]\[\d+\]\['start_time'\]",
    r"root\['streams'\]\[\d+\]\['duration_ts'\]",
    r"root\['streams'\]\[\d+\]\['duration'\]",
    r"root\['streams'\]\[\d+\]\['bit_rate'\]",
    // Broadcasters leave this tag empty and the remuxer drops it
    r"root\['programs'\]\[\d+\]\['tags'\]\['service_provider'\]",
];

const RECOGNIZED_CODEC_TYPES: &[&str] = &["video", "audio", "subtitle", "attachment"];

/// Allow-list of metadata paths the differ must not report
#[derive(Debug, Clone)]
pub struct MetadataIgnoreRules {
    patterns: Vec<Regex>,
}

impl MetadataIgnoreRules {
    /// Only the fixed remux-volatile fields
    pub fn remux_defaults() -> ArchiverResult<Self> {
        let mut rules = Self {
            patterns: Vec::with_capacity(REMUX_VOLATILE_PATHS.len()),
        };
        for pattern in REMUX_VOLATILE_PATHS {
            rules.push(pattern)?;
        }
        Ok(rules)
    }

    /// Fixed fields plus codec identification of input streams whose codec
    /// the remuxer does not recognize.
    pub fn for_input(input: &Value) -> ArchiverResult<Self> {
        let mut rules = Self::remux_defaults()?;

        if let Some(streams) = input.get("streams").and_then(Value::as_array) {
            for (index, stream) in streams.iter().enumerate() {
                if !is_recognized_codec(stream) {
                    rules.push(&format!(
                        r"root\['streams'\]\[{index}\]\['codec_(name|long_name|type)'\]"
                    ))?;
                }
            }
        }

        Ok(rules)
    }

    /// Add a caller-supplied pattern
    pub fn with_pattern(mut self, pattern: &str) -> ArchiverResult<Self> {
        self.push(pattern)?;
        Ok(self)
    }

    /// True when the path, or one of its ancestors, is on the allow-list
    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(path))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn push(&mut self, pattern: &str) -> ArchiverResult<()> {
        // Anchored at the root so a rule also covers the subtree below it
        let regex = Regex::new(&format!("^{pattern}(\\[|$)"))
            .map_err(|e| ArchiverError::config(format!("invalid ignore pattern {pattern:?}: {e}")))?;
        self.patterns.push(regex);
        Ok(())
    }
}

/// The tree with every program that has no streams removed.
///
/// The remuxer cannot write an empty program, so later programs move up one
/// slot in its output; both trees are compared without them.
pub fn without_empty_programs(mut tree: Value) -> Value {
    if let Some(programs) = tree.get_mut("programs").and_then(Value::as_array_mut) {
        programs.retain(|program| {
            program
                .get("streams")
                .and_then(Value::as_array)
                .is_some_and(|streams| !streams.is_empty())
        });
    }
    tree
}

fn is_recognized_codec(stream: &Value) -> bool {
    let has_codec_name = stream
        .get("codec_name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.is_empty());
    let codec_type = stream.get("codec_type").and_then(Value::as_str);

    has_codec_name && codec_type.is_some_and(|t| RECOGNIZED_CODEC_TYPES.contains(&t))
}

#[cfg(test)]
mod tests;
