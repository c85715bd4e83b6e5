//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for the cut command
#[derive(Args, Debug)]
pub struct CutArgs {
    /// Input recording
    pub input: PathBuf,

    /// Output file path (default: `<stem>-cut<suffix>` next to the input)
    pub output: Option<PathBuf>,

    /// Start time relative to the first frame (HH:MM:SS.mmm)
    #[arg(long)]
    pub from: Option<String>,

    /// End time relative to the first frame (HH:MM:SS.mmm)
    #[arg(long)]
    pub to: Option<String>,

    /// Skip the metadata comparison against the input
    #[arg(long)]
    pub no_metadata_check: bool,

    /// Print the cut report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the scene command
#[derive(Args, Debug)]
pub struct SceneArgs {
    /// Input recording
    pub input: PathBuf,

    /// JSON array mapping sample index to seconds since the first frame
    #[arg(long)]
    pub times: PathBuf,

    /// Selected sample indices, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        required_unless_present = "stills",
        conflicts_with = "stills"
    )]
    pub indices: Vec<usize>,

    /// Directory of `<index>.<extension>` stills marking selected samples
    #[arg(long)]
    pub stills: Option<PathBuf>,

    /// File extension of the stills
    #[arg(long, default_value = "jpg")]
    pub extension: String,

    /// Directory receiving the numbered segments (default: working directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Skip the metadata comparison against the input
    #[arg(long)]
    pub no_metadata_check: bool,

    /// Print the scene report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// YAML batch file
    pub file: PathBuf,

    /// Skip the metadata comparison against the input
    #[arg(long)]
    pub no_metadata_check: bool,

    /// Print the cut reports as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// File to verify
    pub file: PathBuf,

    /// Source recording to compare metadata against
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Print the verification report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the offset command
#[derive(Args, Debug)]
pub struct OffsetArgs {
    /// Input recording
    pub file: PathBuf,

    /// Run both strategies and require them to agree
    #[arg(long)]
    pub cross_check: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input recording
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum SubtitleCommand {
    /// Extract the subtitle stream as text
    Export {
        input: PathBuf,
        output: PathBuf,
    },
    /// Mux a retimed subtitle file into a recording
    Import {
        video: PathBuf,
        subtitle: PathBuf,
        output: PathBuf,
        /// Language tag (default: subtitle.language from the config)
        #[arg(long)]
        language: Option<String>,
    },
}
