//! Non-maximum suppression across overlapping patches.

use crate::detect::Detection;

/// Keep the highest-scoring crown among each group of overlapping crowns.
///
/// Crowns whose IoU with an already kept crown exceeds `iou_threshold` are
/// dropped. Output is ordered by descending score.
pub fn suppress(detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    let mut sorted = detections;
    sorted.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let threshold = f64::from(iou_threshold);
    let mut keep: Vec<Detection> = Vec::with_capacity(sorted.len());

    for candidate in sorted {
        if keep
            .iter()
            .all(|kept| kept.bbox.iou(&candidate.bbox) <= threshold)
        {
            keep.push(candidate);
        }
    }

    keep
}
