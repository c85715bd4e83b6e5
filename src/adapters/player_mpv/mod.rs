//! mpv adapter: base offset as the player's resolved start position

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::adapters::process::ToolCommand;
use crate::domain::model::TimeCode;
use crate::error::{ArchiverError, ArchiverResult};
use crate::ports::OffsetPort;

const TIME_POS_PREFIX: &str = "time-pos=";

/// Loads the file headless without rebasing timestamps and reports the
/// playback position of the first frame.
#[derive(Debug, Clone)]
pub struct MpvOffsetResolver {
    mpv: PathBuf,
}

impl MpvOffsetResolver {
    pub fn new(mpv: impl Into<PathBuf>) -> Self {
        Self { mpv: mpv.into() }
    }

    fn command(&self, path: &Path) -> ToolCommand {
        let mut command = ToolCommand::new(&self.mpv);
        command
            .args([
                "--no-config",
                "--really-quiet",
                "--rebase-start-time=no",
                "--vo=null",
                "--ao=null",
                "--frames=1",
            ])
            .arg(format!("--term-playing-msg={}${{=time-pos}}", TIME_POS_PREFIX))
            .arg(path);
        command
    }
}

impl OffsetPort for MpvOffsetResolver {
    fn resolve(&self, path: &Path) -> ArchiverResult<TimeCode> {
        if !path.exists() {
            return Err(ArchiverError::source_not_found(path));
        }
        let output = self.command(path).run()?;
        let offset = parse_time_pos(&output.stdout)?;
        debug!("mpv reports start position {} for {}", offset, path.display());
        Ok(offset)
    }

    fn strategy_name(&self) -> &'static str {
        "player"
    }
}

/// Extract the reported position from mpv's terminal output
fn parse_time_pos(stdout: &str) -> ArchiverResult<TimeCode> {
    let value = stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix(TIME_POS_PREFIX))
        .ok_or_else(|| ArchiverError::tool_failed("mpv", "playback position was not reported"))?;

    let seconds: f64 = value.trim().parse().map_err(|_| {
        ArchiverError::tool_failed("mpv", format!("playback position unavailable: {:?}", value))
    })?;
    TimeCode::from_secs_f64(seconds)
        .map_err(|_| ArchiverError::tool_failed("mpv", format!("playback position out of range: {}", value)))
}
