//! Key-frame snapping of tentative seek ranges

use tracing::debug;

use crate::domain::model::{SeekRange, TimeCode};

/// Key frames the cutter's `-to` overshoots by, for the default encoder profile
pub const DEFAULT_KEYFRAME_GAP: usize = 3;

/// Moves range bounds outward onto real key frames.
///
/// The cutter does not stop at the key frame nearest its `-to` argument but
/// `gap` key frames later, so the upper bound is advanced by that amount.
#[derive(Debug, Clone)]
pub struct KeyFrameSnapper {
    key_frames: Vec<TimeCode>,
    gap: usize,
}

impl KeyFrameSnapper {
    /// `key_frames` must be ascending; see `FrameTimeline::key_frame_times`.
    /// Returns `None` when there is nothing to snap to.
    pub fn new(key_frames: Vec<TimeCode>, gap: usize) -> Option<Self> {
        if key_frames.is_empty() {
            return None;
        }
        Some(Self { key_frames, gap })
    }

    pub fn key_frames(&self) -> &[TimeCode] {
        &self.key_frames
    }

    /// Key frame just before the first key frame at or after `threshold`
    pub fn snap_lower(&self, threshold: TimeCode) -> TimeCode {
        match self.key_frames.iter().position(|key| *key >= threshold) {
            Some(0) => self.key_frames[0],
            Some(index) => self.key_frames[index - 1],
            None => self.last(),
        }
    }

    /// Key frame `gap` positions after the last key frame at or before
    /// `threshold`, clamped to the final key frame
    pub fn snap_upper(&self, threshold: TimeCode) -> TimeCode {
        match self.key_frames.iter().rposition(|key| *key <= threshold) {
            Some(index) => {
                let target = (index + self.gap).min(self.key_frames.len() - 1);
                self.key_frames[target]
            }
            None => self.key_frames[0],
        }
    }

    /// Snap both bounds; open bounds stay open
    pub fn snap(&self, range: &SeekRange) -> SeekRange {
        let snapped = SeekRange::new(
            range.ss().map(|ss| self.snap_lower(ss)),
            range.to().map(|to| self.snap_upper(to)),
        );
        debug!("Snapped {} -> {}", range, snapped);
        snapped
    }

    fn last(&self) -> TimeCode {
        self.key_frames[self.key_frames.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds(s: f64) -> TimeCode {
        TimeCode::from_secs_f64(s).unwrap()
    }

    fn snapper() -> KeyFrameSnapper {
        let keys = (0..=12).map(|s| seconds(s as f64)).collect();
        KeyFrameSnapper::new(keys, DEFAULT_KEYFRAME_GAP).unwrap()
    }

    #[test]
    fn test_snap_lower_worked_example() {
        assert_eq!(snapper().snap_lower(seconds(6.2)), seconds(6.0));
    }

    #[test]
    fn test_snap_upper_worked_example() {
        assert_eq!(snapper().snap_upper(seconds(6.5)), seconds(9.0));
    }

    #[test]
    fn test_snap_lower_on_exact_key_frame_steps_back() {
        assert_eq!(snapper().snap_lower(seconds(7.0)), seconds(6.0));
    }

    #[test]
    fn test_snap_lower_edges() {
        let snapper = snapper();
        assert_eq!(snapper.snap_lower(TimeCode::ZERO), seconds(0.0));
        assert_eq!(snapper.snap_lower(seconds(60.0)), seconds(12.0));
    }

    #[test]
    fn test_snap_upper_clamps_to_last_key_frame() {
        let snapper = snapper();
        assert_eq!(snapper.snap_upper(seconds(11.0)), seconds(12.0));
        assert_eq!(snapper.snap_upper(seconds(99.0)), seconds(12.0));
    }

    #[test]
    fn test_snap_upper_before_first_key_frame() {
        let keys = vec![seconds(1.0), seconds(2.0)];
        let snapper = KeyFrameSnapper::new(keys, 3).unwrap();
        assert_eq!(snapper.snap_upper(seconds(0.5)), seconds(1.0));
    }

    #[test]
    fn test_snap_range_keeps_open_bounds() {
        let range = SeekRange::new(Some(seconds(3.4)), None);
        let snapped = snapper().snap(&range);
        assert_eq!(snapped.ss(), Some(seconds(3.0)));
        assert_eq!(snapped.to(), None);
    }

    #[test]
    fn test_empty_key_frames_rejected() {
        assert!(KeyFrameSnapper::new(vec![], 3).is_none());
    }
}
