//! Prediction table backend.
//!
//! Reads crowns exported by the detection model as CSV, one crown per row:
//!
//! ```text
//! xmin,ymin,xmax,ymax,label,score,image_path
//! 40,40,60,60,Tree,0.91,park_01.jpg
//! ```
//!
//! A row whose `image_path` has a directory part is matched to the image
//! whose path ends with it, so `a/park.jpg` and `b/park.jpg` stay apart.
//! Bare names match by file name. A directory row is also matched by file
//! name alone when no other directory row shares that name.

use crate::detect::{CrownDetector, Detection, DetectionParams, PixelBox};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Internal record for CSV deserialization.
#[derive(Debug, Deserialize)]
struct PredictionRecord {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    score: f32,
    #[serde(default)]
    label: Option<String>,
    image_path: String,
}

/// Crowns predicted ahead of time, keyed by image path.
#[derive(Debug, Default)]
pub struct PredictionTable {
    by_path: HashMap<PathBuf, Vec<Detection>>,
    by_name: HashMap<String, Vec<Detection>>,
}

impl PredictionTable {
    /// Load a prediction table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLoad`] if the file cannot be read or a row is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| Error::DataLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut table = Self::default();

        for (line_num, result) in reader.deserialize::<PredictionRecord>().enumerate() {
            let record = result.map_err(|e| Error::DataLoad {
                path: path.to_path_buf(),
                reason: format!("line {}: {e}", line_num + 2),
            })?;

            let mut detection = Detection::new(
                PixelBox::new(record.xmin, record.ymin, record.xmax, record.ymax),
                record.score,
            );
            if let Some(label) = record.label.filter(|l| !l.is_empty()) {
                detection.label = label;
            }

            table.insert(&record.image_path, detection);
        }

        debug!("Prediction table covers {} image(s)", table.image_count());

        Ok(table)
    }

    /// Insert a crown for an image.
    pub fn insert(&mut self, image_name: &str, detection: Detection) {
        let key = normalize(Path::new(image_name));
        if key.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
            self.by_path.entry(key).or_default().push(detection);
        } else {
            self.by_name
                .entry(image_key(&key))
                .or_default()
                .push(detection);
        }
    }

    /// Number of images with at least one crown.
    pub fn image_count(&self) -> usize {
        self.by_path.len() + self.by_name.len()
    }

    /// Crowns recorded for the image at `image_path`.
    fn lookup(&self, image_path: &Path) -> Option<&[Detection]> {
        // Longest matching directory key wins.
        if let Some((_, crowns)) = self
            .by_path
            .iter()
            .filter(|(key, _)| image_path.ends_with(key))
            .max_by_key(|(key, _)| key.components().count())
        {
            return Some(crowns.as_slice());
        }

        let name = image_key(image_path);
        if let Some(crowns) = self.by_name.get(&name) {
            return Some(crowns.as_slice());
        }

        let mut same_name = self
            .by_path
            .iter()
            .filter(|(key, _)| image_key(key) == name);
        match (same_name.next(), same_name.next()) {
            (Some((_, crowns)), None) => Some(crowns.as_slice()),
            (Some(_), Some(_)) => {
                debug!(
                    "Several prediction paths end in {name}, none matches {}",
                    image_path.display()
                );
                None
            }
            _ => None,
        }
    }
}

impl CrownDetector for PredictionTable {
    fn name(&self) -> &'static str {
        "table"
    }

    fn detect(&mut self, image_path: &Path, params: &DetectionParams) -> Result<Vec<Detection>> {
        let detections = self
            .lookup(image_path)
            .map(|crowns| {
                crowns
                    .iter()
                    .filter(|d| d.score >= params.score_threshold)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(detections)
    }
}

/// Drop `.` components so `./a/park.jpg` and `a/park.jpg` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn image_key(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
        .into_owned()
}
