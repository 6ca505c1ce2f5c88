//! ONNX crown model backend.
//!
//! Expects a RetinaNet-style export taking a `[1, 3, H, W]` RGB tensor in
//! `0.0..=1.0` and returning `boxes [N, 4]` (xmin, ymin, xmax, ymax in patch
//! pixels) followed by `scores [N]`.

use crate::detect::nms::suppress;
use crate::detect::tiling::compute_windows;
use crate::detect::{CrownDetector, Detection, DetectionParams, PixelBox};
use crate::error::{Error, Result};
use image::RgbImage;
use ort::session::Session;
use std::path::Path;
use tracing::debug;

/// Crown detector running an ONNX model over image patches.
pub struct OnnxDetector {
    session: Session,
}

impl OnnxDetector {
    /// Load a model from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DetectorBuild {
                reason: format!("model file does not exist: {}", path.display()),
            });
        }

        let builder = Session::builder().map_err(|e| Error::DetectorBuild {
            reason: e.to_string(),
        })?;
        let session = builder
            .commit_from_file(path)
            .map_err(|e| Error::DetectorBuild {
                reason: e.to_string(),
            })?;

        Ok(Self { session })
    }

    fn infer_patch(&mut self, patch: &RgbImage) -> Result<Vec<Detection>> {
        let (width, height) = (patch.width() as usize, patch.height() as usize);
        let plane = width * height;

        // HWC u8 -> CHW f32
        let mut data = vec![0.0_f32; 3 * plane];
        for (x, y, pixel) in patch.enumerate_pixels() {
            let idx = y as usize * width + x as usize;
            for channel in 0..3 {
                data[channel * plane + idx] = f32::from(pixel[channel]) / 255.0;
            }
        }

        let shape = [1_usize, 3, height, width];
        let input = ort::value::Value::from_array((shape.as_slice(), data.into_boxed_slice()))
            .map_err(inference_error)?;

        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(inference_error)?;

        let (_, boxes) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(inference_error)?;
        let (_, scores) = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(inference_error)?;

        if boxes.len() != scores.len() * 4 {
            return Err(Error::ModelInference {
                reason: format!(
                    "model returned {} box values for {} scores",
                    boxes.len(),
                    scores.len()
                ),
            });
        }

        Ok(boxes
            .chunks_exact(4)
            .zip(scores.iter())
            .map(|(b, &score)| {
                Detection::new(
                    PixelBox::new(
                        f64::from(b[0]),
                        f64::from(b[1]),
                        f64::from(b[2]),
                        f64::from(b[3]),
                    ),
                    score,
                )
            })
            .collect())
    }
}

impl CrownDetector for OnnxDetector {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn detect(&mut self, image_path: &Path, params: &DetectionParams) -> Result<Vec<Detection>> {
        let image = image::open(image_path)
            .map_err(|e| Error::ImageRead {
                path: image_path.to_path_buf(),
                source: e,
            })?
            .to_rgb8();

        let windows = compute_windows(
            image.width(),
            image.height(),
            params.patch_size,
            params.patch_overlap,
        );
        debug!("Running crown model on {} patch(es)", windows.len());

        let mut crowns = Vec::new();
        for window in windows {
            let patch =
                image::imageops::crop_imm(&image, window.x, window.y, window.width, window.height)
                    .to_image();

            crowns.extend(
                self.infer_patch(&patch)?
                    .into_iter()
                    .filter(|d| d.score >= params.score_threshold)
                    .map(|mut d| {
                        d.bbox = d
                            .bbox
                            .translate(f64::from(window.x), f64::from(window.y));
                        d
                    }),
            );
        }

        Ok(suppress(crowns, params.iou_threshold))
    }
}

fn inference_error(e: impl std::fmt::Display) -> Error {
    Error::ModelInference {
        reason: e.to_string(),
    }
}
