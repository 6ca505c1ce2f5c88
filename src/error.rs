//! Error types for crownmap.

use std::path::PathBuf;

/// Result type alias for crownmap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for crownmap.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Inventory or frame metadata table is missing or malformed.
    #[error("failed to load '{path}': {reason}")]
    DataLoad {
        /// Path to the table.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Inventory has no points, so no boundary can be built.
    #[error("inventory contains no points, cannot build a boundary mask")]
    EmptyInventory,

    /// Frame georeferencing inputs span no usable extent.
    #[error("degenerate frame: {reason}")]
    DegenerateFrame {
        /// Description of the degenerate input.
        reason: String,
    },

    /// Detection model failed.
    #[error("model inference failed: {reason}")]
    ModelInference {
        /// Description of the inference failure.
        reason: String,
    },

    /// Failed to build the detection backend.
    #[error("failed to build detector: {reason}")]
    DetectorBuild {
        /// Description of the build failure.
        reason: String,
    },

    /// Image file does not exist.
    #[error("image file not found: {path}")]
    ImageNotFound {
        /// Expected image path.
        path: PathBuf,
    },

    /// Failed to read or decode an image.
    #[error("failed to read image '{path}'")]
    ImageRead {
        /// Path to the image.
        path: PathBuf,
        /// Underlying image error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode or write an image.
    #[error("failed to write image '{path}'")]
    ImageWrite {
        /// Path to the image.
        path: PathBuf,
        /// Underlying image error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a crown table.
    #[error("failed to write crown table '{path}'")]
    TableWrite {
        /// Path to the table.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Whether the error only concerns the frame being processed.
    ///
    /// Frame-local errors are logged and the batch moves on to the next
    /// frame. Everything else aborts the run.
    pub const fn is_frame_local(&self) -> bool {
        matches!(
            self,
            Self::DegenerateFrame { .. }
                | Self::ModelInference { .. }
                | Self::ImageNotFound { .. }
                | Self::ImageRead { .. }
                | Self::ImageWrite { .. }
        )
    }
}
