// Offset interactor - Base presentation offset resolution and cross-checking

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::model::{SeekRange, TimeCode};
use crate::error::{ArchiverError, ArchiverResult};
use crate::ports::{OffsetPort, ProbePort, ReadWindow, RemuxPort};
use crate::utils::path::make_zero_path;

/// Rebases a short lead clip to zero and reads the presentation time of its
/// first frame.
pub struct RemuxOffsetResolver {
    probe_port: Arc<dyn ProbePort>,
    remux_port: Arc<dyn RemuxPort>,
    lead_clip: TimeCode,
}

impl RemuxOffsetResolver {
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        remux_port: Arc<dyn RemuxPort>,
        lead_clip: TimeCode,
    ) -> Self {
        Self {
            probe_port,
            remux_port,
            lead_clip,
        }
    }
}

impl OffsetPort for RemuxOffsetResolver {
    fn resolve(&self, path: &Path) -> ArchiverResult<TimeCode> {
        if !path.exists() {
            return Err(ArchiverError::source_not_found(path));
        }

        let workspace = tempfile::tempdir()?;
        let lead = make_zero_path(workspace.path(), path);
        self.remux_port
            .make_zero(path, &SeekRange::new(None, Some(self.lead_clip)), &lead)?;

        let timeline = self.probe_port.frame_timeline(&lead, ReadWindow::Full)?;
        let first = timeline.first().ok_or_else(|| {
            ArchiverError::tool_failed("ffprobe", format!("no frames in {}", lead.display()))
        })?;
        debug!("First frame of rebased lead clip at {}", first.time);

        std::fs::remove_file(&lead)?;
        Ok(first.time)
    }

    fn strategy_name(&self) -> &'static str {
        "remux"
    }
}

/// Offsets reported by both strategies for one file
#[derive(Debug, Clone, Serialize)]
pub struct CrossCheckReport {
    pub path: PathBuf,
    pub remux: TimeCode,
    pub player: TimeCode,
    pub difference: TimeCode,
}

/// Interactor for the offset use case
pub struct OffsetInteractor {
    configured: Arc<dyn OffsetPort>,
    remux: Arc<dyn OffsetPort>,
    player: Arc<dyn OffsetPort>,
    tolerance: TimeCode,
}

impl OffsetInteractor {
    pub fn new(
        configured: Arc<dyn OffsetPort>,
        remux: Arc<dyn OffsetPort>,
        player: Arc<dyn OffsetPort>,
        tolerance: TimeCode,
    ) -> Self {
        Self {
            configured,
            remux,
            player,
            tolerance,
        }
    }

    /// Base offset using the configured strategy
    pub fn resolve(&self, path: &Path) -> ArchiverResult<TimeCode> {
        let offset = self.configured.resolve(path)?;
        info!(
            "Base offset of {} is {} ({})",
            path.display(),
            offset,
            self.configured.strategy_name()
        );
        Ok(offset)
    }

    /// Run both strategies and require them to agree within the tolerance
    pub fn cross_check(&self, path: &Path) -> ArchiverResult<CrossCheckReport> {
        let remux = self.remux.resolve(path)?;
        let player = self.player.resolve(path)?;
        let difference = remux.abs_diff(player);

        if difference > self.tolerance {
            warn!("Offset strategies differ by {}", difference);
            return Err(ArchiverError::OffsetStrategiesDisagree {
                remux: remux.to_string(),
                player: player.to_string(),
                tolerance_ms: self.tolerance.as_micros() / 1_000,
            });
        }

        Ok(CrossCheckReport {
            path: path.to_path_buf(),
            remux,
            player,
            difference,
        })
    }

    /// The strategy callers get through `resolve`
    pub fn configured(&self) -> Arc<dyn OffsetPort> {
        Arc::clone(&self.configured)
    }
}
