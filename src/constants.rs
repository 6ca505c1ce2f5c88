//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "crownmap";

/// Default buffer around the inventory hull, in degrees.
///
/// Roughly 55 m at the equator. Absorbs GPS and inventory positional noise.
pub const DEFAULT_MASK_TOLERANCE: f64 = 0.0005;

/// Number of vertices used to approximate the buffer disc.
pub const BUFFER_SEGMENTS: usize = 64;

/// Default extension appended to image identifiers that have none.
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Default inventory latitude column.
pub const DEFAULT_LATITUDE_COLUMN: &str = "Latitude";

/// Default inventory longitude column.
pub const DEFAULT_LONGITUDE_COLUMN: &str = "Longitude";

/// Detection model tuning defaults.
pub mod detection {
    /// Minimum crown score kept from the model.
    pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;

    /// Square patch edge, in pixels, for tiled inference.
    pub const DEFAULT_PATCH_SIZE: u32 = 400;

    /// Fractional overlap between neighbouring patches.
    pub const DEFAULT_PATCH_OVERLAP: f32 = 0.1;

    /// IoU above which overlapping crowns from adjacent patches are merged.
    pub const DEFAULT_IOU_THRESHOLD: f32 = 0.15;

    /// Label assigned when the model does not report one.
    pub const DEFAULT_LABEL: &str = "Tree";
}

/// Annotated image conventions.
pub mod annotate {
    /// Prefix for images written by the masking pipeline.
    pub const MASK_PREFIX: &str = "MASKED";

    /// Prefix for images written by the fusion pipeline.
    pub const FUSE_PREFIX: &str = "FUSED";

    /// Outline colour for surviving crowns.
    pub const OUTLINE_RGB: [u8; 3] = [0, 255, 0];

    /// Outline thickness in pixels.
    pub const DEFAULT_LINE_WIDTH: u32 = 2;
}

/// Crown table file names.
pub mod table_filenames {
    /// Masking pipeline CSV table.
    pub const MASK_CSV: &str = "masked_crowns.csv";
    /// Masking pipeline GeoJSON table.
    pub const MASK_GEOJSON: &str = "masked_crowns.geojson";
    /// Fusion pipeline CSV table.
    pub const FUSE_CSV: &str = "fused_crowns.csv";
    /// Fusion pipeline GeoJSON table.
    pub const FUSE_GEOJSON: &str = "fused_crowns.geojson";
}

/// Decimal places used for coordinates in text output.
pub const COORD_DECIMAL_PLACES: usize = 8;

/// Decimal places used for scores in text output.
pub const SCORE_DECIMAL_PLACES: usize = 4;
