//! FFmpeg execution adapter
//!
//! Every operation is a lossless stream copy; payloads are never re-encoded.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::adapters::process::ToolCommand;
use crate::domain::model::SeekRange;
use crate::error::{ArchiverError, ArchiverResult};
use crate::ports::RemuxPort;

/// FFmpeg-based remux adapter
#[derive(Debug, Clone)]
pub struct FfmpegAdapter {
    ffmpeg: PathBuf,
}

impl FfmpegAdapter {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Arguments of a stream-copy cut
    pub fn cut_args(input: &Path, range: &SeekRange, output: &Path) -> Vec<String> {
        let mut args = seek_args(range);
        args.push("-i".to_string());
        args.push(path_arg(input));
        args.extend(
            [
                "-map",
                "0",
                "-c",
                "copy",
                "-async",
                "1",
                "-strict",
                "-2",
                "-avoid_negative_ts",
                "1",
                "-y",
            ]
            .map(String::from),
        );
        args.push(path_arg(output));
        args
    }

    /// Arguments of a stream copy with timestamps rebased to zero
    pub fn make_zero_args(input: &Path, range: &SeekRange, output: &Path) -> Vec<String> {
        let mut args = seek_args(range);
        args.extend(
            [
                "-copyts",
                "-start_at_zero",
                "-avoid_negative_ts",
                "make_zero",
                "-i",
            ]
            .map(String::from),
        );
        args.push(path_arg(input));
        args.extend(
            [
                "-map",
                "0",
                "-c",
                "copy",
                "-muxpreload",
                "0",
                "-muxdelay",
                "0",
                "-y",
            ]
            .map(String::from),
        );
        args.push(path_arg(output));
        args
    }

    fn run(&self, args: Vec<String>, input: &Path, output: &Path) -> ArchiverResult<()> {
        if !input.exists() {
            return Err(ArchiverError::source_not_found(input));
        }
        ToolCommand::new(&self.ffmpeg).args(args).run_producing(output)?;
        Ok(())
    }
}

impl RemuxPort for FfmpegAdapter {
    fn cut(&self, input: &Path, range: &SeekRange, output: &Path) -> ArchiverResult<()> {
        info!("Cutting {} ({}) into {}", input.display(), range, output.display());
        self.run(Self::cut_args(input, range, output), input, output)
    }

    fn make_zero(&self, input: &Path, range: &SeekRange, output: &Path) -> ArchiverResult<()> {
        info!("Rebasing {} ({}) to zero into {}", input.display(), range, output.display());
        self.run(Self::make_zero_args(input, range, output), input, output)
    }

    fn export_subtitle(&self, input: &Path, output: &Path) -> ArchiverResult<()> {
        // -fix_sub_duration must precede -i to apply to ARIB captions
        let args = vec![
            "-fix_sub_duration".to_string(),
            "-i".to_string(),
            path_arg(input),
            "-c:s".to_string(),
            "text".to_string(),
            "-y".to_string(),
            path_arg(output),
        ];
        self.run(args, input, output)
    }

    fn import_subtitle(
        &self,
        video: &Path,
        subtitle: &Path,
        language: &str,
        output: &Path,
    ) -> ArchiverResult<()> {
        if !subtitle.exists() {
            return Err(ArchiverError::source_not_found(subtitle));
        }
        let args = vec![
            "-i".to_string(),
            path_arg(video),
            "-i".to_string(),
            path_arg(subtitle),
            "-c".to_string(),
            "copy".to_string(),
            "-c:s".to_string(),
            "mov_text".to_string(),
            "-metadata:s:s:0".to_string(),
            format!("language={}", language),
            "-y".to_string(),
            path_arg(output),
        ];
        self.run(args, video, output)
    }
}

/// `-ss`/`-to` input options; open bounds are omitted
fn seek_args(range: &SeekRange) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(ss) = range.ss() {
        args.push("-ss".to_string());
        args.push(ss.format());
    }
    if let Some(to) = range.to() {
        args.push("-to".to_string());
        args.push(to.format());
    }
    args
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
