// Scene interactor - Cuts every run of selected scenes on key-frame bounds

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::app::verify_interactor::VerifyInteractor;
use crate::domain::model::{SeekRange, TimeCode};
use crate::error::{ArchiverError, ArchiverResult};
use crate::planner::{merge_periods, KeyFrameSnapper, SeekRangeBuilder};
use crate::ports::{OffsetPort, ProbePort, ReadWindow, RemuxPort};
use crate::utils::path::{make_zero_path, numbered_output_path};

/// Request to cut selected scenes out of one recording
#[derive(Debug, Clone)]
pub struct SceneRequest {
    pub input: PathBuf,
    /// Selected sample indices into `time_table`
    pub indices: Vec<usize>,
    /// Sample index to presentation time, relative to the first frame
    pub time_table: Vec<TimeCode>,
    /// Directory receiving `<stem>-<n><suffix>`; defaults to the working directory
    pub output_dir: Option<PathBuf>,
    pub check_metadata: bool,
}

/// One produced segment
#[derive(Debug, Clone, Serialize)]
pub struct SceneCut {
    pub output: PathBuf,
    pub tentative: SeekRange,
    pub range: SeekRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneReport {
    pub base_offset: TimeCode,
    pub cuts: Vec<SceneCut>,
}

/// Interactor for the scene use case
pub struct SceneInteractor {
    probe_port: Arc<dyn ProbePort>,
    remux_port: Arc<dyn RemuxPort>,
    offset_port: Arc<dyn OffsetPort>,
    verifier: Arc<VerifyInteractor>,
    keyframe_gap: usize,
}

impl SceneInteractor {
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        remux_port: Arc<dyn RemuxPort>,
        offset_port: Arc<dyn OffsetPort>,
        verifier: Arc<VerifyInteractor>,
        keyframe_gap: usize,
    ) -> Self {
        Self {
            probe_port,
            remux_port,
            offset_port,
            verifier,
            keyframe_gap,
        }
    }

    /// Plan all tentative ranges up front, then cut and certify in order
    pub fn execute(&self, request: SceneRequest) -> ArchiverResult<SceneReport> {
        if !request.input.exists() {
            return Err(ArchiverError::source_not_found(&request.input));
        }

        let mut indices = request.indices.clone();
        indices.sort_unstable();
        indices.dedup();
        if indices.is_empty() {
            warn!("No scenes selected for {}", request.input.display());
        }

        let base_offset = self.offset_port.resolve(&request.input)?;
        let snapper = self.snapper(&request, base_offset)?;

        let builder = SeekRangeBuilder::new(&request.time_table, base_offset);
        let tentative = builder.build_all(merge_periods(indices))?;

        let output_dir = request.output_dir.clone().unwrap_or_default();
        let mut cuts = Vec::with_capacity(tentative.len());
        for (number, tentative) in tentative.into_iter().enumerate() {
            let range = snapper.snap(&tentative);
            let output = numbered_output_path(&output_dir, &request.input, number + 1);
            info!("Scene {}: {} -> {}", number + 1, range, output.display());

            self.remux_port.cut(&request.input, &range, &output)?;
            self.verifier.check_cadence(&output)?;
            if request.check_metadata {
                self.verifier.check_metadata(&request.input, &output)?;
            }
            cuts.push(SceneCut {
                output,
                tentative,
                range,
            });
        }

        Ok(SceneReport { base_offset, cuts })
    }

    /// Key frames of a zero-based copy, moved back onto the source's clock
    fn snapper(&self, request: &SceneRequest, base_offset: TimeCode) -> ArchiverResult<KeyFrameSnapper> {
        let workspace = tempfile::tempdir()?;
        let rebased = make_zero_path(workspace.path(), &request.input);
        self.remux_port
            .make_zero(&request.input, &SeekRange::unbounded(), &rebased)?;

        let key_frames: Vec<TimeCode> = self
            .probe_port
            .frame_timeline(&rebased, ReadWindow::Full)?
            .key_frame_times()
            .into_iter()
            .map(|time| time + base_offset)
            .collect();
        info!("{} key frames available for snapping", key_frames.len());

        KeyFrameSnapper::new(key_frames, self.keyframe_gap).ok_or_else(|| {
            ArchiverError::NoKeyFrames {
                path: request.input.clone(),
            }
        })
    }
}
