//! Structural metadata comparison between a cut's input and output

use std::collections::BTreeSet;
use std::fmt;

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::rules::{without_empty_programs, MetadataIgnoreRules};
use crate::error::{ArchiverError, ArchiverResult};
use crate::probe::MetadataTree;

/// How a path differs between input and output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DiffKind {
    Changed { input: Value, output: Value },
    Added { output: Value },
    Removed { input: Value },
}

/// One unexplained difference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub path: String,
    #[serde(flatten)]
    pub kind: DiffKind,
}

/// Line of the human-readable diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Same(String),
    Added(String),
    Removed(String),
}

/// Structured differences plus a line diff of both trees for an operator
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataReport {
    entries: Vec<DiffEntry>,
    lines: Vec<DiffLine>,
}

impl MetadataReport {
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    /// Paths of every reported difference
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.path.as_str())
    }
}

impl fmt::Display for MetadataReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                DiffLine::Same(text) => writeln!(f, "  {}", text)?,
                DiffLine::Added(text) => writeln!(f, "{}", format!("+ {}", text).green())?,
                DiffLine::Removed(text) => writeln!(f, "{}", format!("- {}", text).red())?,
            }
        }
        let structured =
            serde_json::to_string_pretty(&self.entries).map_err(|_| fmt::Error)?;
        write!(f, "{}", structured)
    }
}

/// Compares probed metadata of an input file and its stream-copied output
#[derive(Debug, Clone, Default)]
pub struct MetadataDiffer {
    extra_ignores: Vec<String>,
}

impl MetadataDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore an additional path pattern on top of the remux-volatile fields
    pub fn with_ignored(mut self, pattern: impl Into<String>) -> Self {
        self.extra_ignores.push(pattern.into());
        self
    }

    /// Fail with `MetadataNotPreserved` unless the trees are equivalent
    pub fn ensure_preserved(&self, input: &MetadataTree, output: &MetadataTree) -> ArchiverResult<()> {
        match self.diff(input, output)? {
            None => {
                info!("Metadata is preserved");
                Ok(())
            }
            Some(report) => Err(ArchiverError::MetadataNotPreserved(Box::new(report))),
        }
    }

    /// `None` when equivalent, otherwise every unexplained difference
    pub fn diff(
        &self,
        input: &MetadataTree,
        output: &MetadataTree,
    ) -> ArchiverResult<Option<MetadataReport>> {
        let input = without_empty_programs(input.as_value().clone());
        let output = normalize_stream_order(without_empty_programs(output.as_value().clone()));

        let mut rules = MetadataIgnoreRules::for_input(&input)?;
        for pattern in &self.extra_ignores {
            rules = rules.with_pattern(pattern)?;
        }

        let mut entries = Vec::new();
        walk("root".to_string(), Some(&input), Some(&output), &rules, &mut entries);
        if entries.is_empty() {
            return Ok(None);
        }
        debug!("{} metadata differences", entries.len());

        let lines = line_diff(
            &serde_json::to_string_pretty(&input)?,
            &serde_json::to_string_pretty(&output)?,
        );
        Ok(Some(MetadataReport { entries, lines }))
    }
}

/// The remuxer writes the first input stream last even with explicit mapping
fn normalize_stream_order(mut output: Value) -> Value {
    if let Some(streams) = output.get_mut("streams").and_then(Value::as_array_mut) {
        if let Some(last) = streams.pop() {
            streams.insert(0, last);
        }
    }
    output
}

fn walk(
    path: String,
    input: Option<&Value>,
    output: Option<&Value>,
    rules: &MetadataIgnoreRules,
    entries: &mut Vec<DiffEntry>,
) {
    if rules.is_ignored(&path) {
        return;
    }

    let kind = match (input, output) {
        (None, None) => return,
        (Some(input), None) => DiffKind::Removed {
            input: input.clone(),
        },
        (None, Some(output)) => DiffKind::Added {
            output: output.clone(),
        },
        (Some(Value::Object(a)), Some(Value::Object(b))) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                walk(format!("{path}['{key}']"), a.get(key), b.get(key), rules, entries);
            }
            return;
        }
        (Some(Value::Array(a)), Some(Value::Array(b))) => {
            for index in 0..a.len().max(b.len()) {
                walk(format!("{path}[{index}]"), a.get(index), b.get(index), rules, entries);
            }
            return;
        }
        (Some(input), Some(output)) if input == output => return,
        (Some(input), Some(output)) => DiffKind::Changed {
            input: input.clone(),
            output: output.clone(),
        },
    };

    entries.push(DiffEntry { path, kind });
}

/// Longest-common-subsequence diff of two texts, line by line
fn line_diff(old: &str, new: &str) -> Vec<DiffLine> {
    let old: Vec<&str> = old.lines().collect();
    let new: Vec<&str> = new.lines().collect();

    // lcs[i][j] = length of the common subsequence of old[i..] and new[j..]
    let mut lcs = vec![vec![0usize; new.len() + 1]; old.len() + 1];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut lines = Vec::with_capacity(old.len().max(new.len()));
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            lines.push(DiffLine::Same(old[i].to_string()));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            lines.push(DiffLine::Removed(old[i].to_string()));
            i += 1;
        } else {
            lines.push(DiffLine::Added(new[j].to_string()));
            j += 1;
        }
    }
    lines.extend(old[i..].iter().map(|line| DiffLine::Removed(line.to_string())));
    lines.extend(new[j..].iter().map(|line| DiffLine::Added(line.to_string())));
    lines
}
