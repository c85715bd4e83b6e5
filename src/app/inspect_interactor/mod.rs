// Inspect interactor - Orchestrates media file inspection use case

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::domain::model::TimeCode;
use crate::error::ArchiverResult;
use crate::ports::ProbePort;
use crate::probe::StreamSummary;

/// Stream layout of one recording
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    pub duration: TimeCode,
    pub streams: Vec<StreamSummary>,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.path.display(), self.duration)?;
        for stream in &self.streams {
            write!(
                f,
                "  stream {} [{}]",
                stream.index,
                stream.codec_type.as_deref().unwrap_or("unknown")
            )?;
            match &stream.program {
                Some(program) => writeln!(f, " program {}", program.program_id)?,
                None => writeln!(f, " no program")?,
            }
            for (key, value) in &stream.tags {
                writeln!(f, "    {}: {}", key, value)?;
            }
        }
        Ok(())
    }
}

/// Interactor for media file inspection use case
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    /// Execute media file inspection
    pub fn execute(&self, path: &Path) -> ArchiverResult<InspectReport> {
        let metadata = self.probe_port.metadata(path)?;
        let duration = self.probe_port.duration(path)?;
        Ok(InspectReport {
            path: path.to_path_buf(),
            duration,
            streams: metadata.stream_summaries(),
        })
    }
}
