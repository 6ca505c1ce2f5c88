//! Crown detection model boundary.
//!
//! The model is an external collaborator: given an image it returns zero or
//! more pixel boxes with scores. Two backends sit behind [`CrownDetector`]:
//! a prediction table exported by the model, and (with the `onnx` feature)
//! an ONNX crown model run patch by patch.

pub mod nms;
#[cfg(feature = "onnx")]
mod onnx;
mod table;
pub mod tiling;
mod types;

#[cfg(feature = "onnx")]
pub use onnx::OnnxDetector;
pub use table::PredictionTable;
pub use types::{Detection, DetectionParams, PixelBox};

use crate::config::{DetectionConfig, DetectorBackend};
use crate::error::{Error, Result};
use std::path::Path;
use tracing::info;

/// Something that finds tree crowns in an image.
pub trait CrownDetector {
    /// Short backend name for logging.
    fn name(&self) -> &'static str;

    /// Detect crowns in the image at `image_path`.
    ///
    /// An empty result is a valid outcome. Failures are reported as
    /// [`Error::ModelInference`].
    fn detect(&mut self, image_path: &Path, params: &DetectionParams) -> Result<Vec<Detection>>;
}

/// Build the configured detection backend.
///
/// Relative model and prediction paths are resolved against `base_dir`.
pub fn build_detector(config: &DetectionConfig, base_dir: &Path) -> Result<Box<dyn CrownDetector>> {
    match config.backend {
        DetectorBackend::Table => {
            let path = config
                .predictions_path
                .as_ref()
                .ok_or_else(|| Error::ConfigValidation {
                    message: "table backend requires a predictions file (--predictions)".to_string(),
                })?;
            let path = base_dir.join(path);
            info!("Loading prediction table: {}", path.display());
            Ok(Box::new(PredictionTable::load(&path)?))
        }
        DetectorBackend::Onnx => build_onnx(config, base_dir),
    }
}

#[cfg(feature = "onnx")]
fn build_onnx(config: &DetectionConfig, base_dir: &Path) -> Result<Box<dyn CrownDetector>> {
    let path = config
        .model_path
        .as_ref()
        .ok_or_else(|| Error::ConfigValidation {
            message: "onnx backend requires a model file (--model)".to_string(),
        })?;
    let path = base_dir.join(path);
    info!("Loading crown model: {}", path.display());
    Ok(Box::new(OnnxDetector::load(&path)?))
}

#[cfg(not(feature = "onnx"))]
fn build_onnx(_config: &DetectionConfig, _base_dir: &Path) -> Result<Box<dyn CrownDetector>> {
    Err(Error::DetectorBuild {
        reason: "crownmap was built without the `onnx` feature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_backend_requires_predictions() {
        let config = DetectionConfig::default();
        let result = build_detector(&config, Path::new("."));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_table_backend_missing_file() {
        let config = DetectionConfig {
            predictions_path: Some("/nonexistent/predictions.csv".into()),
            ..DetectionConfig::default()
        };
        let result = build_detector(&config, Path::new("."));
        assert!(matches!(result, Err(Error::DataLoad { .. })));
    }
}
