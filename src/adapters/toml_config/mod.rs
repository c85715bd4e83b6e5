// TOML config adapter - Application configuration from TOML files and environment

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::model::TimeCode;
use crate::error::{ArchiverError, ArchiverResult};
use crate::output::DEFAULT_GOP_CADENCE;
use crate::planner::DEFAULT_KEYFRAME_GAP;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "tsarchiver.toml";

/// Prefix of environment overrides, e.g. `TSARCHIVER_GOP_CADENCE`
pub const ENV_PREFIX: &str = "TSARCHIVER_";

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub encoder: EncoderConfig,
    pub probe: ProbeConfig,
    pub tools: ToolsConfig,
    pub offset: OffsetConfig,
    pub subtitle: SubtitleConfig,
    pub logging: LoggingConfig,
}

/// Constants of the source encoder profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Frames from one key frame to the next, counting the leading key frame.
    /// An encoder emitting 14 non-key frames between key frames is `15`.
    pub gop_cadence: usize,
    /// Key frames the cutter overshoots an upper bound by
    pub keyframe_gap: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            gop_cadence: DEFAULT_GOP_CADENCE,
            keyframe_gap: DEFAULT_KEYFRAME_GAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// How far before the end of a file the tail read starts
    pub tail_window_seconds: f64,
    /// Extra packets read past one GOP for the start check
    pub head_margin_frames: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            tail_window_seconds: 2.0,
            head_margin_frames: 2,
        }
    }
}

/// Executable names or paths of the external tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub mpv: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            mpv: PathBuf::from("mpv"),
        }
    }
}

/// How the base presentation offset of a recording is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OffsetStrategy {
    /// Rebase a short lead clip to zero and read its first frame
    #[default]
    Remux,
    /// Ask the player for its resolved start position
    Player,
}

impl FromStr for OffsetStrategy {
    type Err = ArchiverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remux" => Ok(OffsetStrategy::Remux),
            "player" => Ok(OffsetStrategy::Player),
            other => Err(ArchiverError::config(format!(
                "invalid offset strategy {:?}, expected remux or player",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetConfig {
    pub strategy: OffsetStrategy,
    /// Length of the lead clip the remux strategy rebases
    pub lead_clip: String,
    /// Largest disagreement a cross-check accepts
    pub cross_check_tolerance_ms: u64,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            strategy: OffsetStrategy::Remux,
            lead_clip: "00:00:01.000".to_string(),
            cross_check_tolerance_ms: 50,
        }
    }
}

impl OffsetConfig {
    pub fn lead_clip(&self) -> ArchiverResult<TimeCode> {
        TimeCode::parse(&self.lead_clip)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleConfig {
    /// ISO 639-2 tag written on imported subtitle streams
    pub language: String,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            language: "jpn".to_string(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ArchiverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(ArchiverError::config(format!(
                "invalid log format {:?}, expected pretty, compact or json",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive; `RUST_LOG` takes precedence when set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> ArchiverResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> ArchiverResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ArchiverError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `TSARCHIVER_*` overrides read through `lookup`; returns how many
    /// were applied
    pub fn apply_env<F>(&mut self, lookup: F) -> ArchiverResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        let var = |name: &str| {
            let key = format!("{}{}", ENV_PREFIX, name);
            lookup(&key).map(|value| (key, value))
        };

        if let Some((key, value)) = var("GOP_CADENCE") {
            self.encoder.gop_cadence = parse_env(&key, &value)?;
            applied += 1;
        }
        if let Some((key, value)) = var("KEYFRAME_GAP") {
            self.encoder.keyframe_gap = parse_env(&key, &value)?;
            applied += 1;
        }
        if let Some((key, value)) = var("TAIL_WINDOW_SECONDS") {
            self.probe.tail_window_seconds = parse_env(&key, &value)?;
            applied += 1;
        }
        if let Some((_, value)) = var("FFMPEG") {
            self.tools.ffmpeg = PathBuf::from(value);
            applied += 1;
        }
        if let Some((_, value)) = var("FFPROBE") {
            self.tools.ffprobe = PathBuf::from(value);
            applied += 1;
        }
        if let Some((_, value)) = var("MPV") {
            self.tools.mpv = PathBuf::from(value);
            applied += 1;
        }
        if let Some((_, value)) = var("OFFSET_STRATEGY") {
            self.offset.strategy = value.parse()?;
            applied += 1;
        }
        if let Some((_, value)) = var("SUBTITLE_LANGUAGE") {
            self.subtitle.language = value;
            applied += 1;
        }
        if let Some((_, value)) = var("LOG_LEVEL") {
            self.logging.level = value;
            applied += 1;
        }
        if let Some((_, value)) = var("LOG_FORMAT") {
            self.logging.format = value.parse()?;
            applied += 1;
        }

        self.validate()?;
        Ok(applied)
    }

    /// Reject values no encoder profile can have
    pub fn validate(&self) -> ArchiverResult<()> {
        if self.encoder.gop_cadence == 0 {
            return Err(ArchiverError::config("encoder.gop_cadence must be at least 1"));
        }
        if !self.probe.tail_window_seconds.is_finite() || self.probe.tail_window_seconds <= 0.0 {
            return Err(ArchiverError::config(
                "probe.tail_window_seconds must be a positive number",
            ));
        }
        self.offset.lead_clip()?;
        Ok(())
    }

    /// Packets the head read requests
    pub fn head_read_frames(&self) -> usize {
        self.encoder.gop_cadence + self.probe.head_margin_frames
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> ArchiverResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ArchiverError::config(format!("invalid value for {}: {:?}", key, value)))
}
