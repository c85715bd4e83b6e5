//! CLI module for TS Archiver
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::adapters::{LogFormat, OffsetStrategy};
use crate::config_initialization::ConfigOverrides;

pub mod args;
pub mod commands;

/// TS Archiver
///
/// Cuts broadcast transport-stream recordings on key-frame boundaries with
/// stream copy, then certifies the GOP cadence and metadata of every output.
#[derive(Parser, Debug)]
#[command(name = "tsarchiver")]
#[command(about = "Key-frame aligned cutting and verification of transport-stream recordings")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Configuration file (default: ./tsarchiver.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging filter directive, e.g. `info` or `ts_archiver=debug`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Frames from one key frame to the next in the source encoder profile
    #[arg(long, global = true)]
    pub gop_cadence: Option<usize>,

    /// Key frames the cutter overshoots an upper bound by
    #[arg(long, global = true)]
    pub keyframe_gap: Option<usize>,

    /// How the base presentation offset is resolved
    #[arg(long, value_enum, global = true)]
    pub offset_strategy: Option<OffsetStrategy>,

    /// ffmpeg executable
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe executable
    #[arg(long, global = true)]
    pub ffprobe: Option<PathBuf>,

    /// mpv executable
    #[arg(long, global = true)]
    pub mpv: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config: self.config.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format,
            gop_cadence: self.gop_cadence,
            keyframe_gap: self.keyframe_gap,
            offset_strategy: self.offset_strategy,
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
            mpv: self.mpv.clone(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cut one segment and certify it
    Cut(args::CutArgs),
    /// Cut every run of selected scenes on key-frame bounds
    Scene(args::SceneArgs),
    /// Run the cuts listed in a YAML batch file
    Batch(args::BatchArgs),
    /// Verify the key-frame cadence (and optionally metadata) of a cut
    Check(args::CheckArgs),
    /// Print the base presentation offset of a recording
    Offset(args::OffsetArgs),
    /// Print program and stream layout of a recording
    Inspect(args::InspectArgs),
    /// Export or import subtitles around a cut
    #[command(subcommand)]
    Subtitle(args::SubtitleCommand),
}
