// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod player_mpv;
pub mod probe_ffprobe;
pub mod process;
pub mod toml_config;
pub mod tracing_log;
pub mod yaml_batch;

// Re-export adapters
pub use exec_ffmpeg::FfmpegAdapter;
pub use player_mpv::MpvOffsetResolver;
pub use probe_ffprobe::FfprobeAdapter;
pub use toml_config::{AppConfig, LogFormat, OffsetStrategy};
pub use tracing_log::init_logging;
pub use yaml_batch::{BatchConfig, BatchCut};
