//! Configuration validation.

use crate::config::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_mask(config)?;
    validate_detection(config)?;
    validate_output(config)?;
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::ConfigValidation { message }
}

fn validate_mask(config: &Config) -> Result<()> {
    let tolerance = config.mask.tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(invalid(format!(
            "mask tolerance must be a non-negative number of degrees, got {tolerance}"
        )));
    }
    Ok(())
}

fn validate_detection(config: &Config) -> Result<()> {
    let detection = &config.detection;

    if !(0.0..=1.0).contains(&detection.score_threshold) {
        return Err(invalid(format!(
            "score_threshold must be between 0.0 and 1.0, got {}",
            detection.score_threshold
        )));
    }

    if !(0.0..=1.0).contains(&detection.iou_threshold) {
        return Err(invalid(format!(
            "iou_threshold must be between 0.0 and 1.0, got {}",
            detection.iou_threshold
        )));
    }

    if detection.patch_size == 0 {
        return Err(invalid("patch_size must be at least 1".to_string()));
    }

    if !(0.0..1.0).contains(&detection.patch_overlap) {
        return Err(invalid(format!(
            "patch_overlap must be in [0.0, 1.0), got {}",
            detection.patch_overlap
        )));
    }

    Ok(())
}

fn validate_output(config: &Config) -> Result<()> {
    let output = &config.output;

    if output.line_width == 0 {
        return Err(invalid("line_width must be at least 1".to_string()));
    }

    if output.image_extension.trim_start_matches('.').is_empty() {
        return Err(invalid("image_extension must not be empty".to_string()));
    }

    for (name, prefix) in [("mask_prefix", &output.mask_prefix), ("fuse_prefix", &output.fuse_prefix)] {
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            return Err(invalid(format!(
                "{name} must be a non-empty file name prefix, got '{prefix}'"
            )));
        }
    }

    Ok(())
}
