//! Configuration type definitions.

use crate::constants::{
    DEFAULT_IMAGE_EXTENSION, DEFAULT_LATITUDE_COLUMN, DEFAULT_LONGITUDE_COLUMN,
    DEFAULT_MASK_TOLERANCE, annotate, detection,
};
use crate::detect::DetectionParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inventory table settings.
    #[serde(default)]
    pub inventory: InventoryConfig,

    /// Boundary mask settings.
    #[serde(default)]
    pub mask: MaskConfig,

    /// Detection model settings.
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Inventory table column names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Column holding latitude.
    pub latitude_column: String,

    /// Column holding longitude.
    pub longitude_column: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            latitude_column: DEFAULT_LATITUDE_COLUMN.to_string(),
            longitude_column: DEFAULT_LONGITUDE_COLUMN.to_string(),
        }
    }
}

/// Boundary mask settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Buffer around the inventory hull, in degrees.
    pub tolerance: f64,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_MASK_TOLERANCE,
        }
    }
}

/// Detection backend selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    /// Crowns read from a prediction table exported by the model.
    #[default]
    Table,
    /// Crowns predicted by an ONNX model (requires the `onnx` feature).
    Onnx,
}

impl std::fmt::Display for DetectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Onnx => write!(f, "onnx"),
        }
    }
}

impl std::str::FromStr for DetectorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "csv" => Ok(Self::Table),
            "onnx" => Ok(Self::Onnx),
            other => Err(format!("unknown detector backend: {other}")),
        }
    }
}

/// Detection model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Backend used to obtain crowns.
    pub backend: DetectorBackend,

    /// ONNX model file (onnx backend).
    pub model_path: Option<PathBuf>,

    /// Prediction table (table backend).
    pub predictions_path: Option<PathBuf>,

    /// Minimum crown score.
    pub score_threshold: f32,

    /// Patch edge in pixels for tiled inference.
    pub patch_size: u32,

    /// Fractional overlap between patches.
    pub patch_overlap: f32,

    /// IoU threshold for merging crowns across patches.
    pub iou_threshold: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::default(),
            model_path: None,
            predictions_path: None,
            score_threshold: detection::DEFAULT_SCORE_THRESHOLD,
            patch_size: detection::DEFAULT_PATCH_SIZE,
            patch_overlap: detection::DEFAULT_PATCH_OVERLAP,
            iou_threshold: detection::DEFAULT_IOU_THRESHOLD,
        }
    }
}

impl DetectionConfig {
    /// Model tuning parameters.
    pub const fn params(&self) -> DetectionParams {
        DetectionParams {
            score_threshold: self.score_threshold,
            patch_size: self.patch_size,
            patch_overlap: self.patch_overlap,
            iou_threshold: self.iou_threshold,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Crown table formats.
    pub formats: Vec<TableFormat>,

    /// Annotated image prefix for the masking pipeline.
    pub mask_prefix: String,

    /// Annotated image prefix for the fusion pipeline.
    pub fuse_prefix: String,

    /// Extension appended to image identifiers without one.
    pub image_extension: String,

    /// Crown outline thickness in pixels.
    pub line_width: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: vec![TableFormat::Csv],
            mask_prefix: annotate::MASK_PREFIX.to_string(),
            fuse_prefix: annotate::FUSE_PREFIX.to_string(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            line_width: annotate::DEFAULT_LINE_WIDTH,
        }
    }
}

/// Supported crown table formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// CSV with a WKT geometry column.
    Csv,
    /// GeoJSON feature collection.
    GeoJson,
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::GeoJson => write!(f, "geojson"),
        }
    }
}

impl std::str::FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "geojson" | "json" => Ok(Self::GeoJson),
            other => Err(format!("unknown table format: {other}")),
        }
    }
}
