//! Key-frame cadence verification of cut output

use tracing::{debug, info};

use crate::domain::model::{FrameRecord, FrameTimeline};
use crate::error::{ArchiverError, ArchiverResult, CadencePhase};

/// Key-to-key distance, in frames, of the default encoder profile.
///
/// A profile with 14 non-key frames between key frames (a 15-frame GOP) needs
/// a cadence of 15.
pub const DEFAULT_GOP_CADENCE: usize = 14;

/// Checks that the first and last GOP of a stream-copied file look exactly
/// like the source encoder's GOP: a key frame, `cadence - 1` non-key frames,
/// then the next key frame.
#[derive(Debug, Clone, Copy)]
pub struct GopCadenceValidator {
    cadence: usize,
}

impl Default for GopCadenceValidator {
    fn default() -> Self {
        Self::new(DEFAULT_GOP_CADENCE)
    }
}

impl GopCadenceValidator {
    pub fn new(cadence: usize) -> Self {
        Self {
            cadence: cadence.max(1),
        }
    }

    pub fn cadence(&self) -> usize {
        self.cadence
    }

    /// Frames the start check looks at
    pub fn required_head_frames(&self) -> usize {
        self.cadence + 1
    }

    /// Validate the head of a timeline read from the start of the file
    pub fn check_start(&self, timeline: &FrameTimeline) -> ArchiverResult<()> {
        let frames = timeline.frames();
        let required = self.required_head_frames();
        if frames.len() < required {
            return Err(ArchiverError::InsufficientFrames {
                phase: CadencePhase::Start,
                required,
                available: frames.len(),
            });
        }

        self.check_gop_shape(frames, 0, CadencePhase::Start)?;
        info!("Start of output is cut on a key frame");
        Ok(())
    }

    /// Validate the tail of a timeline read up to the end of the file.
    ///
    /// Frames decoded after the last key frame may be presented before it;
    /// they must never be presented after it.
    pub fn check_end(&self, timeline: &FrameTimeline) -> ArchiverResult<()> {
        let frames = timeline.frames();
        let len = frames.len();
        let window = self.cadence;

        let offset_from_end = (1..=window.min(len))
            .find(|k| frames[len - k].is_key)
            .ok_or(ArchiverError::KeyFrameNotFoundInTail { window })?;
        let key_index = len - offset_from_end;
        let key_frame = frames[key_index];
        debug!(
            "Last key frame at {} ({} from the end)",
            key_frame.time, offset_from_end
        );

        for back in 1..offset_from_end {
            let frame = frames[len - back];
            if frame.time > key_frame.time {
                return Err(ArchiverError::ReorderingDetected {
                    key_frame_time: key_frame.time.to_string(),
                    frame_time: frame.time.to_string(),
                    offset_from_end: back,
                });
            }
        }

        if key_index < self.cadence {
            return Err(ArchiverError::InsufficientFrames {
                phase: CadencePhase::End,
                required: self.cadence + offset_from_end,
                available: len,
            });
        }

        self.check_gop_shape(frames, key_index - self.cadence, CadencePhase::End)?;
        info!("End of output is cut on a key frame");
        Ok(())
    }

    /// Run both windows
    pub fn check(&self, head: &FrameTimeline, tail: &FrameTimeline) -> ArchiverResult<()> {
        self.check_start(head)?;
        self.check_end(tail)
    }

    /// One full GOP starting at `start`: key, non-key run, key
    fn check_gop_shape(
        &self,
        frames: &[FrameRecord],
        start: usize,
        phase: CadencePhase,
    ) -> ArchiverResult<()> {
        for offset in 0..=self.cadence {
            let index = start + offset;
            let expected_key = offset == 0 || offset == self.cadence;
            if frames[index].is_key != expected_key {
                return Err(ArchiverError::KeyFrameCadenceViolation {
                    phase,
                    frame_index: index,
                    expected_key,
                });
            }
        }
        Ok(())
    }
}
