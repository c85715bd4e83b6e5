// Domain models - Core types and data structures

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::{ArchiverError, ArchiverResult};

const MICROS_PER_MILLI: u64 = 1_000;
const MICROS_PER_SECOND: u64 = 1_000_000;
/// Exclusive upper bound of anything built from operator seconds; the
/// two-digit hour field cannot show more.
const MAX_TEXT_SECONDS: f64 = 100.0 * 3_600.0;

/// Non-negative stream time with microsecond precision.
///
/// Text boundaries always use the fixed-width `HH:MM:SS.mmm` form; the extra
/// precision is only carried for probe-reported frame timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeCode {
    micros: u64,
}

impl TimeCode {
    pub const ZERO: TimeCode = TimeCode { micros: 0 };

    /// Create from whole microseconds
    pub fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    /// Create from whole milliseconds, saturating at the largest time code
    pub fn from_millis(millis: u64) -> Self {
        Self {
            micros: millis.saturating_mul(MICROS_PER_MILLI),
        }
    }

    /// Create from floating-point seconds, rounded to the microsecond.
    ///
    /// Anything outside `[0, 100h)` is rejected so the result always formats
    /// as `HH:MM:SS.mmm`.
    pub fn from_secs_f64(seconds: f64) -> ArchiverResult<Self> {
        if !seconds.is_finite() || seconds < 0.0 || seconds >= MAX_TEXT_SECONDS {
            return Err(ArchiverError::MalformedTimeString {
                input: seconds.to_string(),
            });
        }
        Ok(Self {
            micros: (seconds * MICROS_PER_SECOND as f64).round() as u64,
        })
    }

    /// Create from floating-point seconds, rounded to the millisecond
    pub fn from_secs_f64_millis(seconds: f64) -> ArchiverResult<Self> {
        let precise = Self::from_secs_f64(seconds)?;
        let millis = (precise.micros as f64 / MICROS_PER_MILLI as f64).round() as u64;
        if millis >= (MAX_TEXT_SECONDS as u64) * 1_000 {
            return Err(ArchiverError::MalformedTimeString {
                input: seconds.to_string(),
            });
        }
        Ok(Self::from_millis(millis))
    }

    /// Parse the fixed `HH:MM:SS.mmm` form
    pub fn parse(input: &str) -> ArchiverResult<Self> {
        let malformed = || ArchiverError::MalformedTimeString {
            input: input.to_string(),
        };

        let bytes = input.as_bytes();
        if bytes.len() != 12 || bytes[2] != b':' || bytes[5] != b':' || bytes[8] != b'.' {
            return Err(malformed());
        }

        let field = |range: std::ops::Range<usize>| -> ArchiverResult<u64> {
            let digits = &input[range];
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            digits.parse::<u64>().map_err(|_| malformed())
        };

        let hours = field(0..2)?;
        let minutes = field(3..5)?;
        let seconds = field(6..8)?;
        let millis = field(9..12)?;

        if minutes >= 60 || seconds >= 60 {
            return Err(malformed());
        }

        Ok(Self::from_millis(
            ((hours * 60 + minutes) * 60 + seconds) * 1_000 + millis,
        ))
    }

    /// Parse an optional bound; `None` stays an open bound
    pub fn parse_optional(input: Option<&str>) -> ArchiverResult<Option<Self>> {
        input.map(Self::parse).transpose()
    }

    /// Parse probe-style decimal seconds such as `12.345678`
    pub fn parse_seconds(input: &str) -> Option<Self> {
        let (whole, fraction) = match input.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (input, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let whole: u64 = whole.parse().ok()?;
        let mut micros_text: String = fraction.chars().take(6).collect();
        while micros_text.len() < 6 {
            micros_text.push('0');
        }
        let fraction_micros: u64 = micros_text.parse().ok()?;

        Some(Self {
            micros: whole.checked_mul(MICROS_PER_SECOND)?.checked_add(fraction_micros)?,
        })
    }

    /// Fixed-width `HH:MM:SS.mmm`; sub-millisecond precision is truncated
    pub fn format(&self) -> String {
        let total_millis = self.micros / MICROS_PER_MILLI;
        let millis = total_millis % 1_000;
        let total_seconds = total_millis / 1_000;
        let seconds = total_seconds % 60;
        let minutes = (total_seconds / 60) % 60;
        let hours = total_seconds / 3_600;
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }

    pub fn as_micros(&self) -> u64 {
        self.micros
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.micros as f64 / MICROS_PER_SECOND as f64
    }

    pub fn to_duration(&self) -> Duration {
        Duration::from_micros(self.micros)
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self {
            micros: duration.as_micros() as u64,
        }
    }

    /// Addition, `None` on overflow
    pub fn checked_add(self, other: TimeCode) -> Option<TimeCode> {
        self.micros.checked_add(other.micros).map(Self::from_micros)
    }

    /// Subtraction clamped at zero
    pub fn saturating_sub(self, other: TimeCode) -> TimeCode {
        TimeCode {
            micros: self.micros.saturating_sub(other.micros),
        }
    }

    /// Distance between two time codes regardless of order
    pub fn abs_diff(self, other: TimeCode) -> TimeCode {
        TimeCode {
            micros: self.micros.abs_diff(other.micros),
        }
    }
}

impl Add for TimeCode {
    type Output = TimeCode;

    /// Saturates at the largest time code
    fn add(self, rhs: TimeCode) -> TimeCode {
        TimeCode {
            micros: self.micros.saturating_add(rhs.micros),
        }
    }
}

impl Sub for TimeCode {
    type Output = TimeCode;

    fn sub(self, rhs: TimeCode) -> TimeCode {
        self.saturating_sub(rhs)
    }
}

impl FromStr for TimeCode {
    type Err = ArchiverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Offset-adjusted cut bounds handed to the remuxer. `None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeekRange {
    ss: Option<TimeCode>,
    to: Option<TimeCode>,
}

impl SeekRange {
    /// Create from already-absolute bounds
    pub fn new(ss: Option<TimeCode>, to: Option<TimeCode>) -> Self {
        Self { ss, to }
    }

    /// Whole file
    pub fn unbounded() -> Self {
        Self { ss: None, to: None }
    }

    /// Build from operator time strings: `absolute = parse(input) + base_offset`
    pub fn from_strings(
        base_offset: TimeCode,
        from: Option<&str>,
        to: Option<&str>,
    ) -> ArchiverResult<Self> {
        let ss = TimeCode::parse_optional(from)?;
        let to = TimeCode::parse_optional(to)?;
        Ok(Self { ss, to }.shifted(base_offset))
    }

    /// Both bounds moved later by `offset`
    pub fn shifted(self, offset: TimeCode) -> Self {
        Self {
            ss: self.ss.map(|t| t + offset),
            to: self.to.map(|t| t + offset),
        }
    }

    pub fn ss(&self) -> Option<TimeCode> {
        self.ss
    }

    pub fn to(&self) -> Option<TimeCode> {
        self.to
    }
}

impl fmt::Display for SeekRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |t: Option<TimeCode>| t.map(|t| t.format()).unwrap_or_else(|| "-".to_string());
        write!(f, "{} to {}", bound(self.ss), bound(self.to))
    }
}

/// One probed packet: presentation time and key flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameRecord {
    pub time: TimeCode,
    pub is_key: bool,
}

impl FrameRecord {
    pub fn new(time: TimeCode, is_key: bool) -> Self {
        Self { time, is_key }
    }
}

/// Frames of one probe invocation, in the order the prober reported them.
///
/// Key frames arrive in ascending presentation order; non-key frames near the
/// tail may be reordered, which the end-window cadence check detects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameTimeline {
    frames: Vec<FrameRecord>,
}

impl FrameTimeline {
    pub fn new(frames: Vec<FrameRecord>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn first(&self) -> Option<&FrameRecord> {
        self.frames.first()
    }

    /// Presentation times of key frames, ascending
    pub fn key_frame_times(&self) -> Vec<TimeCode> {
        let mut times: Vec<TimeCode> = self
            .frames
            .iter()
            .filter(|frame| frame.is_key)
            .map(|frame| frame.time)
            .collect();
        times.sort_unstable();
        times.dedup();
        times
    }
}

impl FromIterator<FrameRecord> for FrameTimeline {
    fn from_iter<I: IntoIterator<Item = FrameRecord>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

/// Inclusive run of consecutive selected sample indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsecutivePeriod {
    pub start_index: usize,
    pub end_index: usize,
}

impl ConsecutivePeriod {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    /// Number of indices in the run
    pub fn len(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}
