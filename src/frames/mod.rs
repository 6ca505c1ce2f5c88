//! Per-image georeferencing metadata.
//!
//! The metadata table lists each aerial image with the lat/lon of its
//! top-right and bottom-left corners:
//!
//! ```text
//! image_name,tr_lat,tr_lon,bl_lat,bl_lon
//! park_01,22.301,114.171,22.299,114.169
//! ```

use crate::error::{Error, Result};
use crate::spatial::LatLon;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Internal record for CSV deserialization.
#[derive(Debug, Deserialize)]
struct FrameRecord {
    image_name: String,
    tr_lat: f64,
    tr_lon: f64,
    bl_lat: f64,
    bl_lon: f64,
}

/// Georeferencing metadata for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMetadata {
    /// Image identifier, with or without extension.
    pub image_name: String,
    /// Top-right corner position.
    pub top_right: LatLon,
    /// Bottom-left corner position.
    pub bottom_left: LatLon,
}

impl FrameMetadata {
    /// Image file name, appending `default_extension` when the identifier has none.
    pub fn image_file_name(&self, default_extension: &str) -> String {
        if Path::new(&self.image_name).extension().is_some() {
            self.image_name.clone()
        } else {
            format!(
                "{}.{}",
                self.image_name,
                default_extension.trim_start_matches('.')
            )
        }
    }

    /// Full image path under `base_dir`.
    pub fn image_path(&self, base_dir: &Path, default_extension: &str) -> PathBuf {
        base_dir.join(self.image_file_name(default_extension))
    }
}

/// Load the frame metadata table at `path`.
///
/// Corner validity is not checked here; degenerate frames are rejected
/// individually when their transform is built.
///
/// # Errors
///
/// Returns [`Error::DataLoad`] if the file cannot be read or a row is malformed.
pub fn load_frame_metadata(path: &Path) -> Result<Vec<FrameMetadata>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::DataLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut frames = Vec::new();

    for (line_num, result) in reader.deserialize::<FrameRecord>().enumerate() {
        let record = result.map_err(|e| Error::DataLoad {
            path: path.to_path_buf(),
            reason: format!("line {}: {e}", line_num + 2),
        })?;

        frames.push(FrameMetadata {
            image_name: record.image_name,
            top_right: LatLon::new(record.tr_lat, record.tr_lon),
            bottom_left: LatLon::new(record.bl_lat, record.bl_lon),
        });
    }

    info!("Loaded metadata for {} image(s)", frames.len());

    Ok(frames)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn frame(name: &str) -> FrameMetadata {
        FrameMetadata {
            image_name: name.to_string(),
            top_right: LatLon::new(22.301, 114.171),
            bottom_left: LatLon::new(22.299, 114.169),
        }
    }

    #[test]
    fn test_image_file_name_appends_extension() {
        assert_eq!(frame("park_01").image_file_name("jpg"), "park_01.jpg");
        assert_eq!(frame("park_01").image_file_name(".png"), "park_01.png");
    }

    #[test]
    fn test_image_file_name_keeps_extension() {
        assert_eq!(frame("park_01.tif").image_file_name("jpg"), "park_01.tif");
    }

    #[test]
    fn test_image_path_under_base_dir() {
        let path = frame("park_01").image_path(Path::new("/data/flights"), "jpg");
        assert_eq!(path, PathBuf::from("/data/flights/park_01.jpg"));
    }

    #[test]
    fn test_load_frame_metadata() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "image_name,tr_lat,tr_lon,bl_lat,bl_lon\n\
             park_01,22.301,114.171,22.299,114.169\n\
             park_02.jpg,22.311,114.181,22.309,114.179"
        )
        .unwrap();

        let frames = load_frame_metadata(file.path()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], frame("park_01"));
        assert_eq!(frames[1].image_name, "park_02.jpg");
    }

    #[test]
    fn test_load_frame_metadata_malformed_row() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "image_name,tr_lat,tr_lon,bl_lat,bl_lon\n\
             park_01,north,114.171,22.299,114.169"
        )
        .unwrap();

        let err = load_frame_metadata(file.path()).unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_frame_metadata_missing_file() {
        let result = load_frame_metadata(Path::new("/nonexistent/photo_metadata.csv"));
        assert!(matches!(result, Err(Error::DataLoad { .. })));
    }
}
