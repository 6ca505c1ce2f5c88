//! Detection type definitions.

/// Axis-aligned box in image pixel space.
///
/// Pixel `x` grows to the right and `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBox {
    /// Left edge.
    pub xmin: f64,
    /// Top edge.
    pub ymin: f64,
    /// Right edge.
    pub xmax: f64,
    /// Bottom edge.
    pub ymax: f64,
}

impl PixelBox {
    /// Create a box, sorting each axis so that min <= max.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            xmin: x1.min(x2),
            ymin: y1.min(y2),
            xmax: x1.max(x2),
            ymax: y1.max(y2),
        }
    }

    /// Box width in pixels.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Box height in pixels.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Box area in square pixels.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Shift the box by a pixel offset.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            xmin: self.xmin + dx,
            ymin: self.ymin + dy,
            xmax: self.xmax + dx,
            ymax: self.ymax + dy,
        }
    }

    /// Intersection over union with another box.
    pub fn iou(&self, other: &Self) -> f64 {
        let inter_w = (self.xmax.min(other.xmax) - self.xmin.max(other.xmin)).max(0.0);
        let inter_h = (self.ymax.min(other.ymax) - self.ymin.max(other.ymin)).max(0.0);
        let inter = inter_w * inter_h;
        let union = self.area() + other.area() - inter;

        if union > 0.0 { inter / union } else { 0.0 }
    }
}

/// A single crown predicted by the detection model.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Crown bounding box in pixels.
    pub bbox: PixelBox,
    /// Model confidence (0.0 - 1.0).
    pub score: f32,
    /// Class label reported by the model.
    pub label: String,
}

impl Detection {
    /// Create a detection with the default tree label.
    pub fn new(bbox: PixelBox, score: f32) -> Self {
        Self {
            bbox,
            score,
            label: crate::constants::detection::DEFAULT_LABEL.to_string(),
        }
    }
}

/// Tuning parameters passed to the detection model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Minimum score for a crown to be reported.
    pub score_threshold: f32,
    /// Square patch edge in pixels for tiled inference.
    pub patch_size: u32,
    /// Fractional overlap between neighbouring patches (0.0 - <1.0).
    pub patch_overlap: f32,
    /// IoU above which crowns from overlapping patches are merged.
    pub iou_threshold: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        use crate::constants::detection::{
            DEFAULT_IOU_THRESHOLD, DEFAULT_PATCH_OVERLAP, DEFAULT_PATCH_SIZE,
            DEFAULT_SCORE_THRESHOLD,
        };

        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            patch_size: DEFAULT_PATCH_SIZE,
            patch_overlap: DEFAULT_PATCH_OVERLAP,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_box_new_sorts_axes() {
        let bbox = PixelBox::new(60.0, 60.0, 40.0, 40.0);
        assert_eq!(bbox.xmin, 40.0);
        assert_eq!(bbox.ymin, 40.0);
        assert_eq!(bbox.xmax, 60.0);
        assert_eq!(bbox.ymax, 60.0);
    }

    #[test]
    fn test_iou_identical() {
        let a = PixelBox::new(0.0, 0.0, 10.0, 10.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_iou_disjoint() {
        let a = PixelBox::new(0.0, 0.0, 10.0, 10.0);
        let b = PixelBox::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_half_overlap() {
        let a = PixelBox::new(0.0, 0.0, 10.0, 10.0);
        let b = PixelBox::new(5.0, 0.0, 15.0, 10.0);
        // 50 / (100 + 100 - 50)
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_translate() {
        let a = PixelBox::new(1.0, 2.0, 3.0, 4.0).translate(10.0, 20.0);
        assert_eq!(a, PixelBox::new(11.0, 22.0, 13.0, 24.0));
    }

    #[test]
    fn test_default_params() {
        let params = DetectionParams::default();
        assert_eq!(params.score_threshold, 0.5);
        assert_eq!(params.patch_size, 400);
        assert_eq!(params.patch_overlap, 0.1);
    }
}
