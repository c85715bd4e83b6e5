//! Command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::adapters::BatchConfig;
use crate::app::{AppContainer, CutRequest, SceneRequest, VerifyRequest};
use crate::cli::args::{
    BatchArgs, CheckArgs, CutArgs, InspectArgs, OffsetArgs, SceneArgs, SubtitleCommand,
};
use crate::cli::Commands;
use crate::utils::path::{collect_scene_indices, default_cut_output};
use crate::utils::time::load_time_table;

/// Dispatch a parsed command against the wired application
pub fn execute(container: &dyn AppContainer, command: Commands) -> Result<()> {
    match command {
        Commands::Cut(args) => cut(container, args),
        Commands::Scene(args) => scene(container, args),
        Commands::Batch(args) => batch(container, args),
        Commands::Check(args) => check(container, args),
        Commands::Offset(args) => offset(container, args),
        Commands::Inspect(args) => inspect(container, args),
        Commands::Subtitle(command) => subtitle(container, command),
    }
}

/// Execute the cut command
pub fn cut(container: &dyn AppContainer, args: CutArgs) -> Result<()> {
    let output = args
        .output
        .unwrap_or_else(|| default_cut_output(&args.input));
    info!("Cutting {} into {}", args.input.display(), output.display());

    let report = container
        .cut_interactor()
        .execute(CutRequest {
            input: args.input.clone(),
            output,
            from: args.from,
            to: args.to,
            check_metadata: !args.no_metadata_check,
        })
        .with_context(|| format!("Cut of {} failed", args.input.display()))?;

    if args.json {
        print_json(&report)?;
    }
    Ok(())
}

/// Execute the scene command
pub fn scene(container: &dyn AppContainer, args: SceneArgs) -> Result<()> {
    let indices = match &args.stills {
        Some(dir) => collect_scene_indices(dir, &args.extension)
            .with_context(|| format!("Failed to read stills from {}", dir.display()))?,
        None => args.indices.clone(),
    };
    let time_table = load_time_table(&args.times)
        .with_context(|| format!("Failed to load time table {}", args.times.display()))?;

    let report = container
        .scene_interactor()
        .execute(SceneRequest {
            input: args.input.clone(),
            indices,
            time_table,
            output_dir: args.output_dir,
            check_metadata: !args.no_metadata_check,
        })
        .with_context(|| format!("Scene cut of {} failed", args.input.display()))?;

    if args.json {
        print_json(&report)?;
    }
    Ok(())
}

/// Execute the batch command
pub fn batch(container: &dyn AppContainer, args: BatchArgs) -> Result<()> {
    let config = BatchConfig::load(&args.file)
        .with_context(|| format!("Failed to load batch file {}", args.file.display()))?;

    let reports = container
        .batch_interactor()
        .execute(&config, !args.no_metadata_check)
        .with_context(|| format!("Batch {} failed", args.file.display()))?;

    if args.json {
        print_json(&reports)?;
    }
    Ok(())
}

/// Execute the check command
pub fn check(container: &dyn AppContainer, args: CheckArgs) -> Result<()> {
    let report = container
        .verify_interactor()
        .execute(VerifyRequest {
            output: args.file.clone(),
            source: args.source,
        })
        .with_context(|| format!("Verification of {} failed", args.file.display()))?;

    if args.json {
        print_json(&report)?;
    }
    Ok(())
}

/// Execute the offset command
pub fn offset(container: &dyn AppContainer, args: OffsetArgs) -> Result<()> {
    let interactor = container.offset_interactor();

    if args.cross_check {
        let report = interactor
            .cross_check(&args.file)
            .with_context(|| format!("Offset cross-check of {} failed", args.file.display()))?;
        if args.json {
            print_json(&report)?;
        } else {
            println!("remux  {}", report.remux);
            println!("player {}", report.player);
            println!("diff   {}", report.difference);
        }
        return Ok(());
    }

    let offset = interactor
        .resolve(&args.file)
        .with_context(|| format!("Failed to resolve offset of {}", args.file.display()))?;
    if args.json {
        print_json(&offset)?;
    } else {
        println!("{}", offset);
    }
    Ok(())
}

/// Execute the inspect command
pub fn inspect(container: &dyn AppContainer, args: InspectArgs) -> Result<()> {
    let report = container
        .inspect_interactor()
        .execute(&args.file)
        .with_context(|| format!("Failed to inspect {}", args.file.display()))?;

    if args.json {
        print_json(&report)?;
    } else {
        print!("{}", report);
    }
    Ok(())
}

/// Execute a subtitle subcommand
pub fn subtitle(container: &dyn AppContainer, command: SubtitleCommand) -> Result<()> {
    let interactor = container.subtitle_interactor();
    match command {
        SubtitleCommand::Export { input, output } => interactor
            .export(&input, &output)
            .with_context(|| format!("Subtitle export from {} failed", input.display())),
        SubtitleCommand::Import {
            video,
            subtitle,
            output,
            language,
        } => interactor
            .import(&video, &subtitle, &output, language.as_deref())
            .with_context(|| format!("Subtitle import into {} failed", video.display())),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
