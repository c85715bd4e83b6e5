//! Error handling module for TS Archiver

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::output::MetadataReport;

/// Which end of an output file the cadence check inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CadencePhase {
    Start,
    End,
}

impl fmt::Display for CadencePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CadencePhase::Start => write!(f, "start"),
            CadencePhase::End => write!(f, "end"),
        }
    }
}

/// Main error type for TS Archiver operations
#[derive(Error, Debug)]
pub enum ArchiverError {
    /// Referenced media file does not exist
    #[error("Source file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// External tool could not be located
    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// Child process exited non-zero or its expected output is missing
    #[error("External tool failed: {tool}: {message}")]
    ExternalToolFailure { tool: String, message: String },

    /// Time string does not match HH:MM:SS.mmm
    #[error("Malformed time string: {input:?}. Expected HH:MM:SS.mmm")]
    MalformedTimeString { input: String },

    /// GOP spacing check failed
    #[error(
        "Key frame cadence violated at {phase}: frame {frame_index} should {}be a key frame",
        negation(.expected_key)
    )]
    KeyFrameCadenceViolation {
        phase: CadencePhase,
        frame_index: usize,
        expected_key: bool,
    },

    /// No key frame in the last GOP-sized window of the timeline
    #[error("Key frame is not found in last {window} frames")]
    KeyFrameNotFoundInTail { window: usize },

    /// A frame after the last key frame is presented later than that key frame
    #[error(
        "Presentation reordering detected: frame {offset_from_end} from the end has pts {frame_time} later than last key frame at {key_frame_time}"
    )]
    ReorderingDetected {
        key_frame_time: String,
        frame_time: String,
        offset_from_end: usize,
    },

    /// Timeline shorter than the cadence check needs
    #[error("Not enough frames for the {phase} check: need {required}, probed {available}")]
    InsufficientFrames {
        phase: CadencePhase,
        required: usize,
        available: usize,
    },

    /// Probe produced no key frames
    #[error("No key frames found in {}", .path.display())]
    NoKeyFrames { path: PathBuf },

    /// Selected sample index has no entry in the index-to-time table
    #[error("Sample index {index} is outside the time table (length {len})")]
    TimeTableIndexOutOfRange { index: usize, len: usize },

    /// Structural diff found an unexplained change
    #[error("Metadata is not preserved.\n{0}")]
    MetadataNotPreserved(Box<MetadataReport>),

    /// Both offset strategies ran and reported different base offsets
    #[error("Offset strategies disagree: remux reports {remux}, player reports {player} (tolerance {tolerance_ms} ms)")]
    OffsetStrategiesDisagree {
        remux: String,
        player: String,
        tolerance_ms: u64,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ArchiverError {
    /// Create an external tool failure
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalToolFailure {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a source-not-found error
    pub fn source_not_found(path: impl Into<PathBuf>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

fn negation(expected_key: &bool) -> &'static str {
    if *expected_key {
        ""
    } else {
        "not "
    }
}

/// Result type alias for TS Archiver operations
pub type ArchiverResult<T> = std::result::Result<T, ArchiverError>;
