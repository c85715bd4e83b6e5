//! TS Archiver Library
//!
//! Plans, executes and certifies stream-copy cuts of broadcast transport-stream
//! recordings so that every output starts and ends on a whole GOP of the source
//! encoder and keeps the source's program and stream metadata.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use domain::model::{ConsecutivePeriod, FrameRecord, FrameTimeline, SeekRange, TimeCode};
pub use domain::rules::MetadataIgnoreRules;
pub use error::{ArchiverError, ArchiverResult, CadencePhase};
