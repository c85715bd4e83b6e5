// Cut interactor - Orchestrates a single key-frame aligned cut

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::app::verify_interactor::VerifyInteractor;
use crate::domain::model::{SeekRange, TimeCode};
use crate::error::{ArchiverError, ArchiverResult};
use crate::ports::{OffsetPort, RemuxPort};

/// Request to cut one segment; bounds are `HH:MM:SS.mmm` relative to the
/// recording's first frame, `None` is open-ended
#[derive(Debug, Clone)]
pub struct CutRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub from: Option<String>,
    pub to: Option<String>,
    pub check_metadata: bool,
}

/// Outcome of a certified cut
#[derive(Debug, Clone, Serialize)]
pub struct CutReport {
    pub output: PathBuf,
    pub base_offset: TimeCode,
    pub range: SeekRange,
}

/// Interactor for the cut use case
pub struct CutInteractor {
    offset_port: Arc<dyn OffsetPort>,
    remux_port: Arc<dyn RemuxPort>,
    verifier: Arc<VerifyInteractor>,
}

impl CutInteractor {
    /// Create new cut interactor with injected ports
    pub fn new(
        offset_port: Arc<dyn OffsetPort>,
        remux_port: Arc<dyn RemuxPort>,
        verifier: Arc<VerifyInteractor>,
    ) -> Self {
        Self {
            offset_port,
            remux_port,
            verifier,
        }
    }

    /// Execute the cut and certify the output
    pub fn execute(&self, request: CutRequest) -> ArchiverResult<CutReport> {
        // Reject bad bounds before any external tool runs
        let relative = SeekRange::from_strings(
            TimeCode::ZERO,
            request.from.as_deref(),
            request.to.as_deref(),
        )?;
        if !request.input.exists() {
            return Err(ArchiverError::source_not_found(&request.input));
        }

        let base_offset = self.offset_port.resolve(&request.input)?;
        let range = relative.shifted(base_offset);
        info!(
            "Cutting {} from {} (base offset {})",
            request.output.display(),
            range,
            base_offset
        );

        self.remux_port.cut(&request.input, &range, &request.output)?;
        self.verifier.check_cadence(&request.output)?;
        if request.check_metadata {
            self.verifier.check_metadata(&request.input, &request.output)?;
        }

        Ok(CutReport {
            output: request.output,
            base_offset,
            range,
        })
    }
}
