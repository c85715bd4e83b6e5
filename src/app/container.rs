use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{AppConfig, FfmpegAdapter, FfprobeAdapter, MpvOffsetResolver, OffsetStrategy};
use crate::app::{
    batch_interactor::BatchInteractor, cut_interactor::CutInteractor,
    inspect_interactor::InspectInteractor, offset_interactor::OffsetInteractor,
    offset_interactor::RemuxOffsetResolver, scene_interactor::SceneInteractor,
    subtitle_interactor::SubtitleInteractor, verify_interactor::VerifyInteractor,
};
use crate::domain::model::TimeCode;
use crate::error::ArchiverResult;
use crate::output::GopCadenceValidator;
use crate::ports::{OffsetPort, ProbePort, RemuxPort};

pub trait AppContainer: Send + Sync {
    fn cut_interactor(&self) -> Arc<CutInteractor>;
    fn scene_interactor(&self) -> Arc<SceneInteractor>;
    fn batch_interactor(&self) -> Arc<BatchInteractor>;
    fn verify_interactor(&self) -> Arc<VerifyInteractor>;
    fn offset_interactor(&self) -> Arc<OffsetInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
    fn subtitle_interactor(&self) -> Arc<SubtitleInteractor>;
}

pub struct DefaultAppContainer {
    cut_interactor: Arc<CutInteractor>,
    scene_interactor: Arc<SceneInteractor>,
    batch_interactor: Arc<BatchInteractor>,
    verify_interactor: Arc<VerifyInteractor>,
    offset_interactor: Arc<OffsetInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
    subtitle_interactor: Arc<SubtitleInteractor>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg/ffprobe/mpv adapters described by `config`
    pub fn new(config: &AppConfig) -> ArchiverResult<Self> {
        let probe_port: Arc<dyn ProbePort> =
            Arc::new(FfprobeAdapter::new(resolve_tool(&config.tools.ffprobe)));
        let remux_port: Arc<dyn RemuxPort> =
            Arc::new(FfmpegAdapter::new(resolve_tool(&config.tools.ffmpeg)));

        Self::with_ports(config, probe_port, remux_port)
    }

    /// Wire the interactors around caller-supplied probe and remux ports
    pub fn with_ports(
        config: &AppConfig,
        probe_port: Arc<dyn ProbePort>,
        remux_port: Arc<dyn RemuxPort>,
    ) -> ArchiverResult<Self> {
        let player: Arc<dyn OffsetPort> =
            Arc::new(MpvOffsetResolver::new(resolve_tool(&config.tools.mpv)));
        Self::with_offset_ports(config, probe_port, remux_port, player)
    }

    /// Full injection point; the remux strategy is always built from
    /// `probe_port` and `remux_port`
    pub fn with_offset_ports(
        config: &AppConfig,
        probe_port: Arc<dyn ProbePort>,
        remux_port: Arc<dyn RemuxPort>,
        player: Arc<dyn OffsetPort>,
    ) -> ArchiverResult<Self> {
        config.validate()?;

        let remux: Arc<dyn OffsetPort> = Arc::new(RemuxOffsetResolver::new(
            Arc::clone(&probe_port),
            Arc::clone(&remux_port),
            config.offset.lead_clip()?,
        ));
        let configured = match config.offset.strategy {
            OffsetStrategy::Remux => Arc::clone(&remux),
            OffsetStrategy::Player => Arc::clone(&player),
        };
        debug!("Offset strategy: {}", configured.strategy_name());

        let verify_interactor = Arc::new(VerifyInteractor::new(
            Arc::clone(&probe_port),
            GopCadenceValidator::new(config.encoder.gop_cadence),
            config.head_read_frames(),
            config.probe.tail_window_seconds,
        ));

        let cut_interactor = Arc::new(CutInteractor::new(
            Arc::clone(&configured),
            Arc::clone(&remux_port),
            Arc::clone(&verify_interactor),
        ));

        let scene_interactor = Arc::new(SceneInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&remux_port),
            Arc::clone(&configured),
            Arc::clone(&verify_interactor),
            config.encoder.keyframe_gap,
        ));

        let batch_interactor = Arc::new(BatchInteractor::new(Arc::clone(&cut_interactor)));

        let offset_interactor = Arc::new(OffsetInteractor::new(
            configured,
            remux,
            player,
            TimeCode::from_millis(config.offset.cross_check_tolerance_ms),
        ));

        let inspect_interactor = Arc::new(InspectInteractor::new(Arc::clone(&probe_port)));

        let subtitle_interactor = Arc::new(SubtitleInteractor::new(
            remux_port,
            config.subtitle.language.clone(),
        ));

        Ok(Self {
            cut_interactor,
            scene_interactor,
            batch_interactor,
            verify_interactor,
            offset_interactor,
            inspect_interactor,
            subtitle_interactor,
        })
    }
}

/// Absolute path of `tool` on `PATH`, or `tool` itself so that a missing
/// executable surfaces as `ToolNotFound` when it is first spawned
fn resolve_tool(tool: &Path) -> PathBuf {
    match which::which(tool) {
        Ok(found) => {
            debug!("Resolved {} to {}", tool.display(), found.display());
            found
        }
        Err(_) => tool.to_path_buf(),
    }
}

impl AppContainer for DefaultAppContainer {
    fn cut_interactor(&self) -> Arc<CutInteractor> {
        Arc::clone(&self.cut_interactor)
    }

    fn scene_interactor(&self) -> Arc<SceneInteractor> {
        Arc::clone(&self.scene_interactor)
    }

    fn batch_interactor(&self) -> Arc<BatchInteractor> {
        Arc::clone(&self.batch_interactor)
    }

    fn verify_interactor(&self) -> Arc<VerifyInteractor> {
        Arc::clone(&self.verify_interactor)
    }

    fn offset_interactor(&self) -> Arc<OffsetInteractor> {
        Arc::clone(&self.offset_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }

    fn subtitle_interactor(&self) -> Arc<SubtitleInteractor> {
        Arc::clone(&self.subtitle_interactor)
    }
}
