//! Crownmap - tree crown georeferencing CLI tool.
//!
//! This crate maps crowns found by an aerial-image detection model onto
//! WGS84 coordinates and filters them against a municipal tree inventory.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod detect;
pub mod error;
pub mod frames;
pub mod inventory;
pub mod output;
pub mod pipeline;
pub mod spatial;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, RunArgs};
use config::{
    Config, DataPaths, TableFormat, config_file_path, load_config_file, load_default_config,
    save_default_config, validate_config,
};
use constants::table_filenames;
use detect::build_detector;
use frames::load_frame_metadata;
use inventory::load_inventory;
use output::{CrownTableWriter, CsvCrownWriter, GeoJsonCrownWriter};
use pipeline::{BatchOptions, BatchSummary, FrameFilter, PipelineMode, ProcessOptions, run_batch};
use spatial::BoundaryMask;
use std::path::Path;
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for crownmap CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Mask(args) => run_command(PipelineMode::Mask, &args.run, args.tolerance, cli.quiet),
        Command::Fuse(args) => run_command(PipelineMode::Fuse, &args, None, cli.quiet),
        Command::Config { action } => handle_config_command(action),
    }
}

/// Resolve configuration for a pipeline command and run it.
fn run_command(
    mode: PipelineMode,
    args: &RunArgs,
    tolerance: Option<f64>,
    quiet: bool,
) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => load_default_config()?,
    };
    apply_overrides(&mut config, args, tolerance)?;

    let paths = DataPaths::new(
        args.inventory.clone(),
        args.metadata.clone(),
        args.base_dir.clone(),
        args.output_dir.clone(),
    );
    let batch = BatchOptions {
        fail_fast: args.fail_fast,
        progress: !quiet && !args.no_progress,
    };

    run_pipeline(mode, &config, &paths, batch)?;
    Ok(())
}

/// Apply command line overrides on top of the loaded configuration.
///
/// Model and prediction paths given on the command line are made absolute
/// so they are not re-resolved against the image base directory.
fn apply_overrides(config: &mut Config, args: &RunArgs, tolerance: Option<f64>) -> Result<()> {
    if let Some(tolerance) = tolerance {
        config.mask.tolerance = tolerance;
    }

    let detection = &mut config.detection;
    if let Some(backend) = args.backend {
        detection.backend = backend;
    }
    if let Some(path) = &args.predictions {
        detection.predictions_path = Some(std::path::absolute(path)?);
    }
    if let Some(path) = &args.model {
        detection.model_path = Some(std::path::absolute(path)?);
    }
    if let Some(threshold) = args.score_threshold {
        detection.score_threshold = threshold;
    }
    if let Some(size) = args.patch_size {
        detection.patch_size = size;
    }
    if let Some(overlap) = args.patch_overlap {
        detection.patch_overlap = overlap;
    }
    if let Some(threshold) = args.iou_threshold {
        detection.iou_threshold = threshold;
    }

    if let Some(formats) = &args.format {
        config.output.formats.clone_from(formats);
    }
    if let Some(extension) = &args.image_extension {
        config.output.image_extension.clone_from(extension);
    }

    Ok(())
}

/// Run the masking or fusion pipeline over every frame.
///
/// Loads the inventory, builds the boundary mask once (mask mode), loads the
/// frame metadata and detector, then processes every frame and writes the
/// run-wide crown tables into the output directory.
///
/// # Errors
///
/// Dataset-level failures (configuration, inventory, metadata, detector,
/// output directory, crown tables) abort the run. Per-frame failures are
/// skipped unless `batch.fail_fast` is set.
pub fn run_pipeline(
    mode: PipelineMode,
    config: &Config,
    paths: &DataPaths,
    batch: BatchOptions,
) -> Result<BatchSummary> {
    validate_config(config)?;

    info!("Loading inventory: {}", paths.inventory.display());
    let inventory = load_inventory(&paths.inventory, &config.inventory)?;

    let boundary;
    let (filter, prefix, inventory_columns) = match mode {
        PipelineMode::Mask => {
            boundary = BoundaryMask::from_inventory(&inventory, config.mask.tolerance)?;
            info!(
                "Boundary mask built with {:.6} degree tolerance",
                boundary.tolerance()
            );
            (FrameFilter::Mask(&boundary), &config.output.mask_prefix, None)
        }
        PipelineMode::Fuse => {
            if inventory.is_empty() {
                warn!("Inventory is empty, no crowns can be matched");
            }
            (
                FrameFilter::Fuse(&inventory),
                &config.output.fuse_prefix,
                Some(inventory.columns().to_vec()),
            )
        }
    };

    info!("Loading frame metadata: {}", paths.metadata.display());
    let frames = load_frame_metadata(&paths.metadata)?;

    let mut detector = build_detector(&config.detection, &paths.base_dir)?;

    std::fs::create_dir_all(&paths.output_dir).map_err(|e| Error::OutputDirCreateFailed {
        path: paths.output_dir.clone(),
        source: e,
    })?;

    let mut writers = create_table_writers(
        mode,
        &config.output.formats,
        &paths.output_dir,
        inventory_columns.as_deref(),
    )?;

    let options = ProcessOptions {
        base_dir: paths.base_dir.clone(),
        output_dir: paths.output_dir.clone(),
        image_extension: config.output.image_extension.clone(),
        prefix: prefix.clone(),
        line_width: config.output.line_width,
        params: config.detection.params(),
    };

    info!("Running {} pipeline", mode);
    run_batch(
        &frames,
        &options,
        &filter,
        detector.as_mut(),
        &mut writers,
        batch,
    )
}

/// Create one crown table writer per requested format.
fn create_table_writers(
    mode: PipelineMode,
    formats: &[TableFormat],
    output_dir: &Path,
    inventory_columns: Option<&[String]>,
) -> Result<Vec<Box<dyn CrownTableWriter>>> {
    let mut writers: Vec<Box<dyn CrownTableWriter>> = Vec::with_capacity(formats.len());

    for format in formats {
        let file_name = match (mode, format) {
            (PipelineMode::Mask, TableFormat::Csv) => table_filenames::MASK_CSV,
            (PipelineMode::Mask, TableFormat::GeoJson) => table_filenames::MASK_GEOJSON,
            (PipelineMode::Fuse, TableFormat::Csv) => table_filenames::FUSE_CSV,
            (PipelineMode::Fuse, TableFormat::GeoJson) => table_filenames::FUSE_GEOJSON,
        };
        let path = output_dir.join(file_name);
        info!("Writing {} crown table: {}", format, path.display());

        let columns = inventory_columns.map(<[String]>::to_vec);
        let writer: Box<dyn CrownTableWriter> = match format {
            TableFormat::Csv => Box::new(CsvCrownWriter::new(&path, columns)?),
            TableFormat::GeoJson => Box::new(GeoJsonCrownWriter::new(&path, columns)),
        };
        writers.push(writer);
    }

    Ok(writers)
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt().with_env_filter(filter).init();
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let config = Config::default();
                let saved_path = save_default_config(&config)?;
                println!("Created configuration file: {}", saved_path.display());
                println!("\nNext steps:");
                println!(
                    "  crownmap mask --inventory trees.csv --metadata frames.csv --predictions predictions.csv"
                );
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            println!("{config:#?}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
