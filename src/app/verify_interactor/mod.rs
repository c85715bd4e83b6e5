// Verify interactor - Certifies a cut's key-frame alignment and metadata

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::{ArchiverError, ArchiverResult};
use crate::output::{GopCadenceValidator, MetadataDiffer};
use crate::ports::{ProbePort, ReadWindow};

/// Request to verify one output file
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub output: PathBuf,
    /// Source recording to diff metadata against, if any
    pub source: Option<PathBuf>,
}

/// What was verified
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub output: PathBuf,
    pub head_frames: usize,
    pub tail_frames: usize,
    pub metadata_checked: bool,
}

/// Interactor for output verification use case
pub struct VerifyInteractor {
    probe_port: Arc<dyn ProbePort>,
    validator: GopCadenceValidator,
    differ: MetadataDiffer,
    head_read_frames: usize,
    tail_window_seconds: f64,
}

impl VerifyInteractor {
    /// Create new verify interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        validator: GopCadenceValidator,
        head_read_frames: usize,
        tail_window_seconds: f64,
    ) -> Self {
        Self {
            probe_port,
            validator,
            differ: MetadataDiffer::new(),
            head_read_frames: head_read_frames.max(validator.required_head_frames()),
            tail_window_seconds,
        }
    }

    /// Execute output verification
    pub fn execute(&self, request: VerifyRequest) -> ArchiverResult<VerifyReport> {
        let (head_frames, tail_frames) = self.check_cadence(&request.output)?;

        let metadata_checked = match &request.source {
            Some(source) => {
                self.check_metadata(source, &request.output)?;
                true
            }
            None => false,
        };

        Ok(VerifyReport {
            output: request.output,
            head_frames,
            tail_frames,
            metadata_checked,
        })
    }

    /// Start and end cadence checks; returns the probed frame counts
    pub fn check_cadence(&self, output: &Path) -> ArchiverResult<(usize, usize)> {
        if !output.exists() {
            return Err(ArchiverError::source_not_found(output));
        }
        info!("Checking key-frame cadence of {}", output.display());

        let head = self
            .probe_port
            .frame_timeline(output, ReadWindow::Head(self.head_read_frames))?;
        self.validator.check_start(&head)?;

        let tail = self
            .probe_port
            .frame_timeline(output, ReadWindow::Tail(self.tail_window_seconds))?;
        self.validator.check_end(&tail)?;

        Ok((head.len(), tail.len()))
    }

    /// Metadata of `output` must match `source` up to remux-volatile fields
    pub fn check_metadata(&self, source: &Path, output: &Path) -> ArchiverResult<()> {
        info!("Comparing metadata of {} with {}", output.display(), source.display());
        let input = self.probe_port.metadata(source)?;
        let result = self.probe_port.metadata(output)?;
        self.differ.ensure_preserved(&input, &result)
    }
}
