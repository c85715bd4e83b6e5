//! FFprobe adapter for media file probing
//!
//! Frame probes stream the prober's CSV output through [`ChildLines`], so a
//! head read never buffers more than the lines it asked for.
//!
//! [`ChildLines`]: crate::adapters::process::ChildLines

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::adapters::process::ToolCommand;
use crate::domain::model::{FrameTimeline, TimeCode};
use crate::error::{ArchiverError, ArchiverResult};
use crate::ports::{ProbePort, ReadWindow};
use crate::probe::MetadataTree;

/// Entries requested for the metadata tree
const METADATA_ENTRIES: &str = "program:stream:program_tags:stream_tags:format_tags";

/// FFprobe-based probe adapter
#[derive(Debug, Clone)]
pub struct FfprobeAdapter {
    ffprobe: PathBuf,
}

impl FfprobeAdapter {
    pub fn new(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }

    /// Arguments of a packet probe over the given window
    pub fn frame_args(&self, path: &Path, window: ReadWindow) -> ArchiverResult<Vec<String>> {
        let mut args: Vec<String> = [
            "-hide_banner",
            "-select_streams",
            "v",
            "-show_entries",
            "packet=pts_time,flags",
            "-output_format",
            "csv",
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect();

        match window {
            ReadWindow::Full => {}
            ReadWindow::Head(frames) => {
                args.push("-read_intervals".to_string());
                args.push(format!("%+#{}", frames));
            }
            ReadWindow::Tail(seconds) => {
                let duration = self.duration(path)?;
                let start = duration.saturating_sub(TimeCode::from_secs_f64(seconds)?);
                args.push("-read_intervals".to_string());
                args.push(format!("{:.6}", start.as_secs_f64()));
            }
        }

        args.push(path.to_string_lossy().to_string());
        Ok(args)
    }
}

impl ProbePort for FfprobeAdapter {
    fn frame_timeline(&self, path: &Path, window: ReadWindow) -> ArchiverResult<FrameTimeline> {
        ensure_exists(path)?;
        let args = self.frame_args(path, window)?;
        let lines = ToolCommand::new(&self.ffprobe).args(args).lines()?;
        let timeline = FrameTimeline::from_lines(lines)?;
        debug!("Probed {} frames from {} ({:?})", timeline.len(), path.display(), window);
        Ok(timeline)
    }

    fn duration(&self, path: &Path) -> ArchiverResult<TimeCode> {
        ensure_exists(path)?;
        let output = ToolCommand::new(&self.ffprobe)
            .args([
                "-show_entries",
                "format=duration",
                "-output_format",
                "default=noprint_wrappers=1:nokey=1",
                "-loglevel",
                "repeat+fatal",
            ])
            .arg(path)
            .run()?;

        let text = output.stdout.trim();
        TimeCode::parse_seconds(text).ok_or_else(|| {
            ArchiverError::tool_failed("ffprobe", format!("unexpected duration output {:?}", text))
        })
    }

    fn metadata(&self, path: &Path) -> ArchiverResult<MetadataTree> {
        ensure_exists(path)?;
        let output = ToolCommand::new(&self.ffprobe)
            .args([
                "-show_entries",
                METADATA_ENTRIES,
                "-output_format",
                "json",
                "-loglevel",
                "repeat+fatal",
            ])
            .arg(path)
            .run()?;
        MetadataTree::from_json(&output.stdout)
    }
}

fn ensure_exists(path: &Path) -> ArchiverResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ArchiverError::source_not_found(path))
    }
}
