//! Probe output interpretation
//!
//! The prober reports one packet per CSV line, `kind,pts_time,flags`. Lines
//! that cannot describe a frame are reported as [`ProbeLine::Skipped`] rather
//! than as errors, so building a [`FrameTimeline`] is a plain fold over lines.

use tracing::trace;

use crate::domain::model::{FrameRecord, FrameTimeline, TimeCode};
use crate::error::ArchiverResult;

pub mod metadata;

pub use metadata::{MetadataTree, StreamSummary};

/// Sentinel the prober prints when a packet carries no timestamp
pub const PTS_UNAVAILABLE: &str = "N/A";

/// Prefix of the flags field that marks a key frame (`K__`, `K_D`, ...)
pub const KEY_FRAME_FLAG: char = 'K';

/// Why a probe line did not yield a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than two fields, e.g. a stray `\r` from a renamed `.m2ts`
    TooFewFields,
    /// `pts_time` was `N/A`
    PtsUnavailable,
    /// `pts_time` was present but not a non-negative decimal
    UnparsablePts,
}

/// Result of interpreting a single probe line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeLine {
    Frame(FrameRecord),
    Skipped(SkipReason),
}

impl ProbeLine {
    /// Interpret one raw line from the prober
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut fields = line.split(',');
        let _kind = fields.next();
        let Some(pts_time) = fields.next() else {
            return ProbeLine::Skipped(SkipReason::TooFewFields);
        };
        let pts_time = pts_time.trim();
        if pts_time == PTS_UNAVAILABLE {
            return ProbeLine::Skipped(SkipReason::PtsUnavailable);
        }
        let Some(time) = TimeCode::parse_seconds(pts_time) else {
            return ProbeLine::Skipped(SkipReason::UnparsablePts);
        };

        let is_key = fields
            .next()
            .is_some_and(|flags| flags.trim_start().starts_with(KEY_FRAME_FLAG));

        ProbeLine::Frame(FrameRecord::new(time, is_key))
    }

    pub fn frame(self) -> Option<FrameRecord> {
        match self {
            ProbeLine::Frame(frame) => Some(frame),
            ProbeLine::Skipped(_) => None,
        }
    }
}

impl FrameTimeline {
    /// Fold prober output lines into a timeline, skipping unusable lines.
    ///
    /// The first line-source error (a failed read or a non-zero exit) aborts.
    pub fn from_lines<I, S>(lines: I) -> ArchiverResult<Self>
    where
        I: IntoIterator<Item = ArchiverResult<S>>,
        S: AsRef<str>,
    {
        let mut frames = Vec::new();
        let mut skipped = 0usize;

        for line in lines {
            let line = line?;
            let line = line.as_ref();
            trace!("{}", line.trim());
            match ProbeLine::parse(line) {
                ProbeLine::Frame(frame) => frames.push(frame),
                ProbeLine::Skipped(_) => skipped += 1,
            }
        }

        trace!("Parsed {} frames, skipped {} probe lines", frames.len(), skipped);
        Ok(FrameTimeline::new(frames))
    }
}
