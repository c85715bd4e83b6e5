//! Cut planning: period merging, seek ranges and key-frame snapping

pub mod periods;
pub mod seek_range;
pub mod snapper;

pub use periods::{merge_periods, ConsecutivePeriods};
pub use seek_range::SeekRangeBuilder;
pub use snapper::{KeyFrameSnapper, DEFAULT_KEYFRAME_GAP};
