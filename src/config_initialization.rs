//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adapters::toml_config::DEFAULT_CONFIG_FILE;
use crate::adapters::{AppConfig, LogFormat, OffsetStrategy};
use crate::error::{ArchiverError, ArchiverResult};

/// Configuration values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub gop_cadence: Option<usize>,
    pub keyframe_gap: Option<usize>,
    pub offset_strategy: Option<OffsetStrategy>,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    pub mpv: Option<PathBuf>,
}

/// Where the resolved configuration came from.
///
/// Configuration is resolved before the subscriber exists, so the caller
/// reports this once logging is up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    pub file: Option<PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: usize,
}

impl ConfigSources {
    pub fn log(&self) {
        match &self.file {
            Some(path) => info!("Loaded configuration from: {}", path.display()),
            None => debug!("No configuration file, using defaults"),
        }
        if self.env_overrides > 0 {
            info!("Applied {} environment variable overrides", self.env_overrides);
        }
        if self.cli_overrides > 0 {
            info!("Applied {} CLI configuration overrides", self.cli_overrides);
        }
    }
}

/// Resolve configuration from the process environment and working directory
pub fn initialize_configuration(
    overrides: &ConfigOverrides,
) -> ArchiverResult<(AppConfig, ConfigSources)> {
    let cwd = std::env::current_dir()?;
    initialize_configuration_with(overrides, |key| std::env::var(key).ok(), &cwd)
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_with<F>(
    overrides: &ConfigOverrides,
    env: F,
    cwd: &Path,
) -> ArchiverResult<(AppConfig, ConfigSources)>
where
    F: Fn(&str) -> Option<String>,
{
    // Step 1 and 2: defaults, then the config file when one is found
    let file = config_file(overrides, cwd)?;
    let mut config = match &file {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    // Step 3: environment variables
    let env_overrides = config.apply_env(env)?;

    // Step 4: command-line arguments
    let cli_overrides = apply_cli_overrides(&mut config, overrides);

    config.validate()?;
    Ok((
        config,
        ConfigSources {
            file,
            env_overrides,
            cli_overrides,
        },
    ))
}

/// An explicit `--config` must exist; the working-directory default is optional
fn config_file(overrides: &ConfigOverrides, cwd: &Path) -> ArchiverResult<Option<PathBuf>> {
    if let Some(path) = &overrides.config {
        if !path.is_file() {
            return Err(ArchiverError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path.clone()));
    }

    let default = cwd.join(DEFAULT_CONFIG_FILE);
    Ok(default.is_file().then_some(default))
}

fn apply_cli_overrides(config: &mut AppConfig, overrides: &ConfigOverrides) -> usize {
    let mut applied = 0;

    if let Some(level) = &overrides.log_level {
        config.logging.level = level.clone();
        applied += 1;
    }
    if let Some(format) = overrides.log_format {
        config.logging.format = format;
        applied += 1;
    }
    if let Some(cadence) = overrides.gop_cadence {
        config.encoder.gop_cadence = cadence;
        applied += 1;
    }
    if let Some(gap) = overrides.keyframe_gap {
        config.encoder.keyframe_gap = gap;
        applied += 1;
    }
    if let Some(strategy) = overrides.offset_strategy {
        config.offset.strategy = strategy;
        applied += 1;
    }
    if let Some(ffmpeg) = &overrides.ffmpeg {
        config.tools.ffmpeg = ffmpeg.clone();
        applied += 1;
    }
    if let Some(ffprobe) = &overrides.ffprobe {
        config.tools.ffprobe = ffprobe.clone();
        applied += 1;
    }
    if let Some(mpv) = &overrides.mpv {
        config.tools.mpv = mpv.clone();
        applied += 1;
    }

    applied
}
