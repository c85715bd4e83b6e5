//! TS Archiver CLI
//!
//! Cuts broadcast transport-stream recordings on key-frame boundaries with
//! stream copy and certifies each output.
//!
//! # Features
//!
//! - Offset-adjusted cuts from `HH:MM:SS.mmm` bounds
//! - Scene cuts snapped to the source's key frames
//! - GOP cadence checks on both ends of every output
//! - Program and stream metadata comparison against the source
//!
//! # Usage
//!
//! ```bash
//! tsarchiver cut recording.ts --from 00:01:00.000 --to 00:02:00.000
//! tsarchiver scene recording.ts --times times.json --stills selected/
//! tsarchiver batch cuts.yaml
//! tsarchiver check recording-cut.ts --source recording.ts
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ts_archiver::adapters::init_logging;
use ts_archiver::app::DefaultAppContainer;
use ts_archiver::cli::{commands, Cli};
use ts_archiver::config_initialization::initialize_configuration;

/// Main entry point for the TS Archiver CLI application
fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = initialize_configuration(&cli.global.overrides())
        .context("Failed to load configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;

    info!("Starting TS Archiver");
    sources.log();
    let container =
        DefaultAppContainer::new(&config).context("Failed to initialize application")?;

    commands::execute(&container, cli.command)?;

    info!("TS Archiver completed successfully");
    Ok(())
}
