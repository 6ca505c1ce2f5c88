//! CLI argument definitions.

use crate::config::{DetectorBackend, TableFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Georeference tree-crown detections and filter them against a tree inventory.
#[derive(Debug, Parser)]
#[command(name = "crownmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output and informational logging.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Keep crowns inside the buffered inventory boundary.
    Mask(MaskArgs),
    /// Keep crowns containing inventory trees and join their attributes.
    Fuse(RunArgs),
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for the mask command.
#[derive(Debug, Args)]
pub struct MaskArgs {
    /// Common run options.
    #[command(flatten)]
    pub run: RunArgs,

    /// Boundary buffer in degrees around the inventory hull.
    #[arg(short, long, value_parser = parse_tolerance, env = "CROWNMAP_TOLERANCE")]
    pub tolerance: Option<f64>,
}

/// Arguments shared by the mask and fuse commands.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Tree inventory CSV with latitude/longitude columns.
    #[arg(short, long, env = "CROWNMAP_INVENTORY")]
    pub inventory: PathBuf,

    /// Frame metadata CSV (image_name,tr_lat,tr_lon,bl_lat,bl_lon).
    #[arg(short, long, env = "CROWNMAP_METADATA")]
    pub metadata: PathBuf,

    /// Directory images are resolved against (default: metadata directory).
    #[arg(short, long, env = "CROWNMAP_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Output directory (default: base directory).
    #[arg(short, long, env = "CROWNMAP_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Configuration file (default: platform config file).
    #[arg(long, env = "CROWNMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Detection backend (table, onnx).
    #[arg(long, env = "CROWNMAP_BACKEND")]
    pub backend: Option<DetectorBackend>,

    /// Prediction table exported by the crown model.
    #[arg(short, long, env = "CROWNMAP_PREDICTIONS")]
    pub predictions: Option<PathBuf>,

    /// ONNX crown model file.
    #[arg(long, env = "CROWNMAP_MODEL")]
    pub model: Option<PathBuf>,

    /// Minimum crown score (0.0-1.0).
    #[arg(short = 'c', long, value_parser = parse_unit_interval, env = "CROWNMAP_SCORE_THRESHOLD")]
    pub score_threshold: Option<f32>,

    /// Patch edge in pixels for tiled inference.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..), env = "CROWNMAP_PATCH_SIZE")]
    pub patch_size: Option<u32>,

    /// Fractional overlap between patches (0.0-<1.0).
    #[arg(long, value_parser = parse_overlap, env = "CROWNMAP_PATCH_OVERLAP")]
    pub patch_overlap: Option<f32>,

    /// IoU threshold for merging crowns across patches (0.0-1.0).
    #[arg(long, value_parser = parse_unit_interval, env = "CROWNMAP_IOU_THRESHOLD")]
    pub iou_threshold: Option<f32>,

    /// Crown table formats (comma-separated: csv,geojson).
    #[arg(short, long, value_delimiter = ',', env = "CROWNMAP_FORMAT")]
    pub format: Option<Vec<TableFormat>>,

    /// Extension for image identifiers that have none.
    #[arg(long, env = "CROWNMAP_IMAGE_EXTENSION")]
    pub image_extension: Option<String>,

    /// Stop on first failed frame.
    #[arg(long)]
    pub fail_fast: bool,

    /// Disable the progress bar.
    #[arg(long)]
    pub no_progress: bool,
}

/// Parse a value in the closed unit interval.
fn parse_unit_interval(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(0.0..=1.0).contains(&value) {
        return Err(format!("value must be between 0.0 and 1.0, got {value}"));
    }

    Ok(value)
}

/// Parse and validate patch overlap.
fn parse_overlap(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(0.0..1.0).contains(&value) {
        return Err(format!(
            "patch overlap must be at least 0.0 and below 1.0, got {value}"
        ));
    }

    Ok(value)
}

/// Parse and validate boundary tolerance.
fn parse_tolerance(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !value.is_finite() || value < 0.0 {
        return Err(format!(
            "tolerance must be a non-negative number of degrees, got {value}"
        ));
    }

    Ok(value)
}
