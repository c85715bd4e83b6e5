use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::TempDir;
use ts_archiver::adapters::{AppConfig, BatchConfig, OffsetStrategy};
use ts_archiver::app::*;
use ts_archiver::output::GopCadenceValidator;
use ts_archiver::ports::{OffsetPort, ProbePort, ReadWindow, RemuxPort};
use ts_archiver::probe::MetadataTree;
use ts_archiver::*;

/// In-memory stand-ins for the external tools
mod test_utils {
    use super::*;

    pub const CADENCE: usize = 14;
    const FRAME_MICROS: u64 = 33_367;

    /// Frames with key frames every `CADENCE` positions, starting at `start`
    pub fn gop_timeline(len: usize, start: TimeCode) -> FrameTimeline {
        (0..len)
            .map(|i| {
                FrameRecord::new(
                    start + TimeCode::from_micros(i as u64 * FRAME_MICROS),
                    i % CADENCE == 0,
                )
            })
            .collect()
    }

    /// Timeline of a zero-based copy with one key frame per second
    pub fn one_key_per_second(seconds: u64, start: TimeCode) -> FrameTimeline {
        (0..seconds * 2)
            .map(|half| {
                FrameRecord::new(start + TimeCode::from_millis(half * 500), half % 2 == 0)
            })
            .collect()
    }

    pub fn broadcast_metadata(service: &str) -> MetadataTree {
        MetadataTree::new(json!({
            "programs": [{
                "program_id": 1024,
                "pcr_pid": 256,
                "tags": {"service_name": service, "service_provider": ""},
                "streams": [{"index": 0, "codec_type": "video", "codec_name": "mpeg2video"}]
            }],
            "streams": [{
                "index": 0,
                "codec_type": "video",
                "codec_name": "mpeg2video",
                "bit_rate": "15000000",
                "tags": {"language": "jpn"}
            }]
        }))
    }

    pub struct FakeProbe {
        pub head: FrameTimeline,
        pub tail: FrameTimeline,
        pub full: FrameTimeline,
        pub metadata: MetadataTree,
        pub overrides: Mutex<HashMap<PathBuf, MetadataTree>>,
    }

    impl FakeProbe {
        pub fn healthy() -> Self {
            Self {
                head: gop_timeline(CADENCE + 2, TimeCode::ZERO),
                tail: gop_timeline(2 * CADENCE + 1, TimeCode::ZERO),
                full: one_key_per_second(13, TimeCode::ZERO),
                metadata: broadcast_metadata("NHK"),
                overrides: Mutex::new(HashMap::new()),
            }
        }

        pub fn set_metadata(&self, path: &Path, tree: MetadataTree) {
            self.overrides
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), tree);
        }
    }

    impl ProbePort for FakeProbe {
        fn frame_timeline(&self, _path: &Path, window: ReadWindow) -> ArchiverResult<FrameTimeline> {
            Ok(match window {
                ReadWindow::Head(n) => self.head.frames().iter().take(n).copied().collect(),
                ReadWindow::Tail(_) => self.tail.clone(),
                ReadWindow::Full => self.full.clone(),
            })
        }

        fn duration(&self, _path: &Path) -> ArchiverResult<TimeCode> {
            Ok(TimeCode::from_millis(60_000))
        }

        fn metadata(&self, path: &Path) -> ArchiverResult<MetadataTree> {
            let overrides = self.overrides.lock().unwrap();
            Ok(overrides
                .get(path)
                .cloned()
                .unwrap_or_else(|| self.metadata.clone()))
        }
    }

    /// Records every call and writes empty output files
    #[derive(Default)]
    pub struct FakeRemux {
        pub cuts: Mutex<Vec<(SeekRange, PathBuf)>>,
        pub zeros: Mutex<Vec<SeekRange>>,
        pub imports: Mutex<Vec<String>>,
        /// 1-based cut that fails, if any
        pub fail_on_cut: Option<usize>,
    }

    impl RemuxPort for FakeRemux {
        fn cut(&self, _input: &Path, range: &SeekRange, output: &Path) -> ArchiverResult<()> {
            let mut cuts = self.cuts.lock().unwrap();
            if self.fail_on_cut == Some(cuts.len() + 1) {
                return Err(ArchiverError::tool_failed("ffmpeg", "simulated failure"));
            }
            std::fs::write(output, b"")?;
            cuts.push((*range, output.to_path_buf()));
            Ok(())
        }

        fn make_zero(&self, _input: &Path, range: &SeekRange, output: &Path) -> ArchiverResult<()> {
            std::fs::write(output, b"")?;
            self.zeros.lock().unwrap().push(*range);
            Ok(())
        }

        fn export_subtitle(&self, _input: &Path, output: &Path) -> ArchiverResult<()> {
            std::fs::write(output, b"caption")?;
            Ok(())
        }

        fn import_subtitle(
            &self,
            _video: &Path,
            _subtitle: &Path,
            language: &str,
            output: &Path,
        ) -> ArchiverResult<()> {
            std::fs::write(output, b"")?;
            self.imports.lock().unwrap().push(language.to_string());
            Ok(())
        }
    }

    pub struct FixedOffset(pub TimeCode, pub &'static str);

    impl OffsetPort for FixedOffset {
        fn resolve(&self, _path: &Path) -> ArchiverResult<TimeCode> {
            Ok(self.0)
        }

        fn strategy_name(&self) -> &'static str {
            self.1
        }
    }

    pub fn seconds(s: u64) -> TimeCode {
        TimeCode::from_millis(s * 1_000)
    }

    pub fn recording(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("recording.ts");
        std::fs::write(&path, b"").unwrap();
        path
    }

    pub fn verifier(probe: &Arc<FakeProbe>) -> Arc<VerifyInteractor> {
        Arc::new(VerifyInteractor::new(
            Arc::clone(probe) as Arc<dyn ProbePort>,
            GopCadenceValidator::new(CADENCE),
            CADENCE + 2,
            2.0,
        ))
    }

    pub fn cut_interactor(
        probe: &Arc<FakeProbe>,
        remux: &Arc<FakeRemux>,
        offset: TimeCode,
    ) -> CutInteractor {
        CutInteractor::new(
            Arc::new(FixedOffset(offset, "fixed")),
            Arc::clone(remux) as Arc<dyn RemuxPort>,
            verifier(probe),
        )
    }
}

use test_utils::*;

#[test]
fn test_cut_applies_base_offset_and_certifies() {
    let dir = TempDir::new().unwrap();
    let input = recording(&dir);
    let output = dir.path().join("recording-cut.ts");
    let probe = Arc::new(FakeProbe::healthy());
    let remux = Arc::new(FakeRemux::default());

    let report = cut_interactor(&probe, &remux, seconds(10))
        .execute(CutRequest {
            input,
            output: output.clone(),
            from: Some("00:00:05.000".to_string()),
            to: Some("00:00:20.000".to_string()),
            check_metadata: true,
        })
        .unwrap();

    assert_eq!(report.base_offset, seconds(10));
    assert_eq!(report.range, SeekRange::new(Some(seconds(15)), Some(seconds(30))));
    assert!(output.exists());
    assert_eq!(remux.cuts.lock().unwrap().len(), 1);
}

#[test]
fn test_cut_rejects_malformed_time_before_running_tools() {
    let dir = TempDir::new().unwrap();
    let input = recording(&dir);
    let probe = Arc::new(FakeProbe::healthy());
    let remux = Arc::new(FakeRemux::default());

    let err = cut_interactor(&probe, &remux, seconds(10))
        .execute(CutRequest {
            input,
            output: dir.path().join("out.ts"),
            from: Some("5".to_string()),
            to: None,
            check_metadata: true,
        })
        .unwrap_err();

    assert!(matches!(err, ArchiverError::MalformedTimeString { .. }));
    assert!(remux.cuts.lock().unwrap().is_empty());
}

#[test]
fn test_cut_missing_source() {
    let dir = TempDir::new().unwrap();
    let probe = Arc::new(FakeProbe::healthy());
    let remux = Arc::new(FakeRemux::default());

    let err = cut_interactor(&probe, &remux, TimeCode::ZERO)
        .execute(CutRequest {
            input: dir.path().join("absent.ts"),
            output: dir.path().join("out.ts"),
            from: None,
            to: None,
            check_metadata: false,
        })
        .unwrap_err();

    assert!(matches!(err, ArchiverError::SourceNotFound { .. }));
}

#[test]
fn test_cut_off_key_frame_fails_start_check() {
    let dir = TempDir::new().unwrap();
    let input = recording(&dir);
    let mut probe = FakeProbe::healthy();
    probe.head = (0..16)
        .map(|i| FrameRecord::new(TimeCode::from_millis(i * 33), i == 0 || i == 13))
        .collect();
    let probe = Arc::new(probe);
    let remux = Arc::new(FakeRemux::default());

    let err = cut_interactor(&probe, &remux, TimeCode::ZERO)
        .execute(CutRequest {
            input,
            output: dir.path().join("out.ts"),
            from: None,
            to: Some("00:00:10.000".to_string()),
            check_metadata: false,
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ArchiverError::KeyFrameCadenceViolation {
            phase: CadencePhase::Start,
            frame_index: 13,
            ..
        }
    ));
}

#[test]
fn test_cut_reports_lost_metadata() {
    let dir = TempDir::new().unwrap();
    let input = recording(&dir);
    let output = dir.path().join("out.ts");
    let probe = Arc::new(FakeProbe::healthy());
    probe.set_metadata(&output, broadcast_metadata("NHK E"));
    let remux = Arc::new(FakeRemux::default());

    let err = cut_interactor(&probe, &remux, TimeCode::ZERO)
        .execute(CutRequest {
            input,
            output,
            from: None,
            to: None,
            check_metadata: true,
        })
        .unwrap_err();

    match err {
        ArchiverError::MetadataNotPreserved(report) => {
            let paths: Vec<&str> = report.paths().collect();
            assert_eq!(paths, vec!["root['programs'][0]['tags']['service_name']"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_cut_skips_metadata_when_disabled() {
    let dir = TempDir::new().unwrap();
    let input = recording(&dir);
    let output = dir.path().join("out.ts");
    let probe = Arc::new(FakeProbe::healthy());
    probe.set_metadata(&output, broadcast_metadata("other"));
    let remux = Arc::new(FakeRemux::default());

    cut_interactor(&probe, &remux, TimeCode::ZERO)
        .execute(CutRequest {
            input,
            output,
            from: None,
            to: None,
            check_metadata: false,
        })
        .unwrap();
}

fn scene_interactor(probe: &Arc<FakeProbe>, remux: &Arc<FakeRemux>) -> SceneInteractor {
    SceneInteractor::new(
        Arc::clone(probe) as Arc<dyn ProbePort>,
        Arc::clone(remux) as Arc<dyn RemuxPort>,
        Arc::new(FixedOffset(seconds(10), "fixed")),
        verifier(probe),
        3,
    )
}

fn time_table() -> Vec<TimeCode> {
    (0..10).map(|i| TimeCode::from_millis(i * 1_200)).collect()
}

#[test]
fn test_scene_merges_and_snaps_in_absolute_time() {
    let dir = TempDir::new().unwrap();
    let input = recording(&dir);
    let probe = Arc::new(FakeProbe::healthy());
    let remux = Arc::new(FakeRemux::default());

    let report = scene_interactor(&probe, &remux)
        .execute(SceneRequest {
            input,
            indices: vec![7, 0, 1, 2, 3, 5, 6, 3],
            time_table: time_table(),
            output_dir: Some(dir.path().to_path_buf()),
            check_metadata: true,
        })
        .unwrap();

    assert_eq!(report.base_offset, seconds(10));
    assert_eq!(report.cuts.len(), 2);

    let first = &report.cuts[0];
    assert_eq!(
        first.tentative,
        SeekRange::new(Some(seconds(10)), Some(TimeCode::from_millis(14_800)))
    );
    assert_eq!(first.range, SeekRange::new(Some(seconds(10)), Some(seconds(17))));
    assert_eq!(first.output, dir.path().join("recording-1.ts"));

    let second = &report.cuts[1];
    assert_eq!(second.range, SeekRange::new(Some(seconds(15)), Some(seconds(22))));
    assert_eq!(second.output, dir.path().join("recording-2.ts"));

    assert_eq!(remux.cuts.lock().unwrap().len(), 2);
    assert_eq!(*remux.zeros.lock().unwrap(), vec![SeekRange::unbounded()]);
}

#[test]
fn test_scene_index_outside_time_table() {
    let dir = TempDir::new().unwrap();
    let input = recording(&dir);
    let probe = Arc::new(FakeProbe::healthy());
    let remux = Arc::new(FakeRemux::default());

    let err = scene_interactor(&probe, &remux)
        .execute(SceneRequest {
            input,
            indices: vec![42],
            time_table: time_table(),
            output_dir: Some(dir.path().to_path_buf()),
            check_metadata: false,
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ArchiverError::TimeTableIndexOutOfRange { index: 42, .. }
    ));
    assert!(remux.cuts.lock().unwrap().is_empty());
}

#[test]
fn test_scene_without_key_frames() {
    let dir = TempDir::new().unwrap();
    let input = recording(&dir);
    let mut probe = FakeProbe::healthy();
    probe.full = FrameTimeline::default();
    let probe = Arc::new(probe);
    let remux = Arc::new(FakeRemux::default());

    let err = scene_interactor(&probe, &remux)
        .execute(SceneRequest {
            input: input.clone(),
            indices: vec![0],
            time_table: time_table(),
            output_dir: None,
            check_metadata: false,
        })
        .unwrap_err();

    match err {
        ArchiverError::NoKeyFrames { path } => assert_eq!(path, input),
        other => panic!("unexpected error: {other}"),
    }
}

fn batch_config(dir: &TempDir) -> BatchConfig {
    recording(dir);
    BatchConfig::from_yaml_str(&format!(
        "path: {}\nname: recording.ts\ncut:\n  - name: opening talk\n    from: 1.5\n    to: 12.25\n  - name: weather\n    from: 30\n    to: 45.0004\n  - name: close\n    from: 50\n    to: 59\n",
        dir.path().display()
    ))
    .unwrap()
}

#[test]
fn test_batch_runs_entries_in_order() {
    let dir = TempDir::new().unwrap();
    let config = batch_config(&dir);
    let probe = Arc::new(FakeProbe::healthy());
    let remux = Arc::new(FakeRemux::default());
    let batch = BatchInteractor::new(Arc::new(cut_interactor(&probe, &remux, seconds(1))));

    let reports = batch.execute(&config, true).unwrap();

    let outputs: Vec<_> = reports.iter().map(|r| r.output.clone()).collect();
    assert_eq!(
        outputs,
        vec![
            dir.path().join("recording-opening-talk.ts"),
            dir.path().join("recording-weather.ts"),
            dir.path().join("recording-close.ts"),
        ]
    );
    assert_eq!(
        reports[0].range,
        SeekRange::new(
            Some(TimeCode::from_millis(2_500)),
            Some(TimeCode::from_millis(13_250))
        )
    );
    assert_eq!(reports[1].range.to(), Some(TimeCode::from_millis(46_000)));
}

#[test]
fn test_batch_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let config = batch_config(&dir);
    let probe = Arc::new(FakeProbe::healthy());
    let remux = Arc::new(FakeRemux {
        fail_on_cut: Some(2),
        ..Default::default()
    });
    let batch = BatchInteractor::new(Arc::new(cut_interactor(&probe, &remux, TimeCode::ZERO)));

    let err = batch.execute(&config, false).unwrap_err();

    assert!(matches!(err, ArchiverError::ExternalToolFailure { .. }));
    assert_eq!(remux.cuts.lock().unwrap().len(), 1);
    assert!(!dir.path().join("recording-close.ts").exists());
}

#[test]
fn test_verify_with_and_without_source() {
    let dir = TempDir::new().unwrap();
    let file = recording(&dir);
    let probe = Arc::new(FakeProbe::healthy());
    let verifier = verifier(&probe);

    let report = verifier
        .execute(VerifyRequest {
            output: file.clone(),
            source: None,
        })
        .unwrap();
    assert!(!report.metadata_checked);
    assert_eq!(report.head_frames, CADENCE + 2);
    assert_eq!(report.tail_frames, 2 * CADENCE + 1);

    let report = verifier
        .execute(VerifyRequest {
            output: file.clone(),
            source: Some(file),
        })
        .unwrap();
    assert!(report.metadata_checked);
}

#[test]
fn test_verify_reordered_tail() {
    let dir = TempDir::new().unwrap();
    let file = recording(&dir);
    let mut probe = FakeProbe::healthy();
    let mut frames = probe.tail.frames().to_vec();
    let late = frames.last().unwrap().time + TimeCode::from_millis(100);
    frames.push(FrameRecord::new(late, false));
    probe.tail = FrameTimeline::new(frames);
    let probe = Arc::new(probe);

    let err = verifier(&probe)
        .execute(VerifyRequest {
            output: file,
            source: None,
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ArchiverError::ReorderingDetected {
            offset_from_end: 1,
            ..
        }
    ));
}

#[test]
fn test_offset_cross_check_within_tolerance() {
    let interactor = OffsetInteractor::new(
        Arc::new(FixedOffset(seconds(10), "remux")),
        Arc::new(FixedOffset(seconds(10), "remux")),
        Arc::new(FixedOffset(TimeCode::from_millis(10_020), "player")),
        TimeCode::from_millis(50),
    );

    let report = interactor.cross_check(Path::new("recording.ts")).unwrap();
    assert_eq!(report.difference, TimeCode::from_millis(20));
    assert_eq!(interactor.resolve(Path::new("recording.ts")).unwrap(), seconds(10));
}

#[test]
fn test_offset_cross_check_disagreement() {
    let interactor = OffsetInteractor::new(
        Arc::new(FixedOffset(seconds(10), "remux")),
        Arc::new(FixedOffset(seconds(10), "remux")),
        Arc::new(FixedOffset(TimeCode::from_millis(10_200), "player")),
        TimeCode::from_millis(50),
    );

    let err = interactor.cross_check(Path::new("recording.ts")).unwrap_err();
    assert!(matches!(
        err,
        ArchiverError::OffsetStrategiesDisagree {
            tolerance_ms: 50,
            ..
        }
    ));
}

#[test]
fn test_remux_offset_reads_first_frame_of_lead_clip() {
    let dir = TempDir::new().unwrap();
    let input = recording(&dir);
    let mut probe = FakeProbe::healthy();
    probe.full = one_key_per_second(1, TimeCode::from_millis(1_400));
    let probe = Arc::new(probe);
    let remux = Arc::new(FakeRemux::default());

    let resolver = RemuxOffsetResolver::new(
        Arc::clone(&probe) as Arc<dyn ProbePort>,
        Arc::clone(&remux) as Arc<dyn RemuxPort>,
        seconds(1),
    );

    assert_eq!(resolver.resolve(&input).unwrap(), TimeCode::from_millis(1_400));
    assert_eq!(
        *remux.zeros.lock().unwrap(),
        vec![SeekRange::new(None, Some(seconds(1)))]
    );
}

#[test]
fn test_container_uses_configured_offset_strategy() {
    let dir = TempDir::new().unwrap();
    let input = recording(&dir);
    let mut config = AppConfig::default();
    config.offset.strategy = OffsetStrategy::Player;
    config.subtitle.language = "eng".to_string();

    let probe = Arc::new(FakeProbe::healthy());
    let remux = Arc::new(FakeRemux::default());
    let container = DefaultAppContainer::with_offset_ports(
        &config,
        Arc::clone(&probe) as Arc<dyn ProbePort>,
        Arc::clone(&remux) as Arc<dyn RemuxPort>,
        Arc::new(FixedOffset(seconds(7), "player")),
    )
    .unwrap();

    assert_eq!(
        container.offset_interactor().configured().strategy_name(),
        "player"
    );
    let report = container
        .cut_interactor()
        .execute(CutRequest {
            input: input.clone(),
            output: dir.path().join("out.ts"),
            from: Some("00:00:01.000".to_string()),
            to: None,
            check_metadata: true,
        })
        .unwrap();
    assert_eq!(report.range.ss(), Some(seconds(8)));

    let subtitle = dir.path().join("captions.txt");
    container
        .subtitle_interactor()
        .export(&input, &subtitle)
        .unwrap();
    container
        .subtitle_interactor()
        .import(&input, &subtitle, &dir.path().join("subbed.ts"), None)
        .unwrap();
    assert_eq!(*remux.imports.lock().unwrap(), vec!["eng".to_string()]);
}

#[test]
fn test_inspect_reports_program_association() {
    let probe = Arc::new(FakeProbe::healthy());
    let report = InspectInteractor::new(probe)
        .execute(Path::new("recording.ts"))
        .unwrap();

    assert_eq!(report.duration, seconds(60));
    assert_eq!(report.streams.len(), 1);
    let program = report.streams[0].program.as_ref().unwrap();
    assert_eq!(program.program_id, 1024);
    assert!(report.to_string().contains("language: jpn"));
}
