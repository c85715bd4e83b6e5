// Ports - Interface definitions (contracts)

use std::path::Path;

use crate::domain::model::{FrameTimeline, SeekRange, TimeCode};
use crate::error::ArchiverResult;
use crate::probe::MetadataTree;

/// Portion of a file a frame probe reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadWindow {
    /// Every packet of the file
    Full,
    /// Only the first `n` packets
    Head(usize),
    /// Packets from `seconds` before the file's end to the end
    Tail(f64),
}

/// Port for media probing
pub trait ProbePort: Send + Sync {
    /// Probe video packet times and key flags inside the given window
    fn frame_timeline(&self, path: &Path, window: ReadWindow) -> ArchiverResult<FrameTimeline>;

    /// Container duration as reported by the prober
    fn duration(&self, path: &Path) -> ArchiverResult<TimeCode>;

    /// Program/stream structure and tags
    fn metadata(&self, path: &Path) -> ArchiverResult<MetadataTree>;
}

/// Port for stream-copy remuxing
pub trait RemuxPort: Send + Sync {
    /// Stream-copy `range` of `input` into `output`, keeping every stream
    fn cut(&self, input: &Path, range: &SeekRange, output: &Path) -> ArchiverResult<()>;

    /// Stream-copy `range` of `input` into `output` with timestamps shifted so
    /// the first packet starts at zero
    fn make_zero(&self, input: &Path, range: &SeekRange, output: &Path) -> ArchiverResult<()>;

    /// Extract the first subtitle stream as text
    fn export_subtitle(&self, input: &Path, output: &Path) -> ArchiverResult<()>;

    /// Mux a text subtitle file into a copy of `video`
    fn import_subtitle(
        &self,
        video: &Path,
        subtitle: &Path,
        language: &str,
        output: &Path,
    ) -> ArchiverResult<()>;
}

/// Port for resolving a recording's true first presentation timestamp
pub trait OffsetPort: Send + Sync {
    /// Base offset of `path`; repeated calls on the same file agree
    fn resolve(&self, path: &Path) -> ArchiverResult<TimeCode>;

    /// Short name used in logs and cross-check reports
    fn strategy_name(&self) -> &'static str;
}
