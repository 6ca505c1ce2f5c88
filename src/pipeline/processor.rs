//! Single frame processing pipeline.

use crate::detect::{CrownDetector, DetectionParams, PixelBox};
use crate::error::{Error, Result};
use crate::frames::FrameMetadata;
use crate::inventory::InventoryPointSet;
use crate::output::{annotate_image, annotated_path};
use crate::spatial::{
    AffineTransform, BoundaryMask, CrownMatch, GeoDetection, convert, fuse, mask, to_pixels,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Options shared by every frame of a run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Directory images are resolved against.
    pub base_dir: PathBuf,
    /// Directory annotated images are written to.
    pub output_dir: PathBuf,
    /// Extension appended to image identifiers that have none.
    pub image_extension: String,
    /// Annotated image file name prefix.
    pub prefix: String,
    /// Outline thickness in pixels.
    pub line_width: u32,
    /// Parameters handed to the detector.
    pub params: DetectionParams,
}

/// The geometric filter applied to each frame's crowns.
#[derive(Debug, Clone, Copy)]
pub enum FrameFilter<'a> {
    /// Keep crowns touching the boundary mask.
    Mask(&'a BoundaryMask),
    /// Keep crowns containing at least one inventory tree.
    Fuse(&'a InventoryPointSet),
}

/// Result of processing a single frame.
#[derive(Debug)]
pub struct FrameResult {
    /// Resolved image file name.
    pub image_file: String,
    /// Crowns that survived the filter, in detection order.
    pub crowns: Vec<GeoDetection>,
    /// Crown/tree pairs (fusion only), indexing into `crowns`.
    pub matches: Vec<CrownMatch>,
    /// Number of crowns the detector reported before filtering.
    pub detections_total: usize,
    /// Written annotated image.
    pub output_path: PathBuf,
}

/// Detect, georeference, filter and annotate one frame.
///
/// A model failure is logged and the frame is treated as having no crowns,
/// so its unchanged image is still written.
///
/// # Errors
///
/// Frame-local errors ([`Error::is_frame_local`]) for a missing or unreadable
/// image, degenerate corners, or a failed image write.
pub fn process_frame(
    frame: &FrameMetadata,
    options: &ProcessOptions,
    filter: &FrameFilter<'_>,
    detector: &mut dyn CrownDetector,
) -> Result<FrameResult> {
    let image_file = frame.image_file_name(&options.image_extension);
    let image_path = options.base_dir.join(&image_file);

    info!("Processing: {}", image_path.display());

    if !image_path.is_file() {
        return Err(Error::ImageNotFound { path: image_path });
    }

    let (width, height) =
        image::image_dimensions(&image_path).map_err(|e| Error::ImageRead {
            path: image_path.clone(),
            source: e,
        })?;

    let transform = AffineTransform::from_corners(width, height, frame.top_right, frame.bottom_left)?;
    debug!(
        "{image_file}: {width}x{height} px, {:.3e} deg/px lon, {:.3e} deg/px lat",
        transform.lon_per_pixel(),
        transform.lat_per_pixel()
    );

    let detections = match detector.detect(&image_path, &options.params) {
        Ok(detections) => detections,
        Err(e @ Error::ModelInference { .. }) => {
            warn!("{image_file}: {e}, continuing with no crowns");
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    let detections_total = detections.len();

    let geo: Vec<GeoDetection> = detections.iter().map(|d| convert(d, &transform)).collect();

    let (crowns, matches) = match filter {
        FrameFilter::Mask(boundary) => (mask(geo, boundary), Vec::new()),
        FrameFilter::Fuse(inventory) => matched_crowns(geo, inventory),
    };

    for crown in &crowns {
        debug!(
            "{image_file}: kept crown score={:.3} lon=[{:.7}, {:.7}] lat=[{:.7}, {:.7}]",
            crown.detection.score,
            crown.rect.min().x,
            crown.rect.max().x,
            crown.rect.min().y,
            crown.rect.max().y
        );
    }

    let boxes: Vec<PixelBox> = crowns
        .iter()
        .map(|crown| to_pixels(&crown.rect, &transform))
        .collect();

    let output_path = annotated_path(&options.output_dir, &options.prefix, &image_file);
    annotate_image(&image_path, &output_path, &boxes, options.line_width)?;

    info!(
        "{image_file}: {} of {} crowns kept, {} tree matches",
        crowns.len(),
        detections_total,
        matches.len()
    );

    Ok(FrameResult {
        image_file,
        crowns,
        matches,
        detections_total,
        output_path,
    })
}

/// Keep crowns with at least one contained tree, re-indexing the matches.
fn matched_crowns(
    geo: Vec<GeoDetection>,
    inventory: &InventoryPointSet,
) -> (Vec<GeoDetection>, Vec<CrownMatch>) {
    let all_matches = fuse(&geo, inventory);

    let mut slots: Vec<Option<GeoDetection>> = geo.into_iter().map(Some).collect();
    let mut crowns = Vec::new();
    let mut matches = Vec::with_capacity(all_matches.len());

    for m in all_matches {
        if let Some(crown) = slots.get_mut(m.crown).and_then(Option::take) {
            crowns.push(crown);
        }
        matches.push(CrownMatch {
            crown: crowns.len() - 1,
            record: m.record,
        });
    }

    (crowns, matches)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::detect::Detection;
    use crate::inventory::InventoryRecord;
    use crate::spatial::LatLon;
    use image::{Rgb, RgbImage};
    use std::path::Path;
    use tempfile::tempdir;

    struct FixedDetector(Result<Vec<Detection>>);

    impl CrownDetector for FixedDetector {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn detect(&mut self, _image_path: &Path, _params: &DetectionParams) -> Result<Vec<Detection>> {
            match &self.0 {
                Ok(detections) => Ok(detections.clone()),
                Err(_) => Err(Error::ModelInference {
                    reason: "session failed".to_string(),
                }),
            }
        }
    }

    fn frame(name: &str) -> FrameMetadata {
        FrameMetadata {
            image_name: name.to_string(),
            top_right: LatLon::new(22.3010, 114.1710),
            bottom_left: LatLon::new(22.2990, 114.1690),
        }
    }

    fn options(dir: &Path) -> ProcessOptions {
        ProcessOptions {
            base_dir: dir.to_path_buf(),
            output_dir: dir.to_path_buf(),
            image_extension: "png".to_string(),
            prefix: "FUSED".to_string(),
            line_width: 2,
            params: DetectionParams::default(),
        }
    }

    fn banyan_inventory() -> InventoryPointSet {
        InventoryPointSet::new(
            vec!["Species".to_string()],
            vec![
                InventoryRecord::new(22.3000, 114.1700, vec!["Banyan".to_string()]),
                InventoryRecord::new(22.2995, 114.1695, vec!["Palm".to_string()]),
            ],
        )
    }

    #[test]
    fn test_fuse_frame_keeps_matched_crown() {
        let dir = tempdir().unwrap();
        RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]))
            .save(dir.path().join("park_01.png"))
            .unwrap();

        let inventory = banyan_inventory();
        let mut detector = FixedDetector(Ok(vec![
            Detection::new(PixelBox::new(40.0, 40.0, 60.0, 60.0), 0.9),
            Detection::new(PixelBox::new(0.0, 0.0, 10.0, 10.0), 0.8),
        ]));

        let result = process_frame(
            &frame("park_01"),
            &options(dir.path()),
            &FrameFilter::Fuse(&inventory),
            &mut detector,
        )
        .unwrap();

        assert_eq!(result.image_file, "park_01.png");
        assert_eq!(result.detections_total, 2);
        assert_eq!(result.crowns.len(), 1);
        assert_eq!(result.matches, vec![CrownMatch { crown: 0, record: 0 }]);
        assert!(dir.path().join("FUSED_park_01.png").exists());
    }

    #[test]
    fn test_frame_in_subdirectory_is_written() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("flight2")).unwrap();
        RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]))
            .save(dir.path().join("flight2").join("park_01.png"))
            .unwrap();

        let inventory = banyan_inventory();
        let mut detector = FixedDetector(Ok(vec![Detection::new(
            PixelBox::new(40.0, 40.0, 60.0, 60.0),
            0.9,
        )]));
        let mut opts = options(dir.path());
        opts.output_dir = dir.path().join("out");

        let result = process_frame(
            &frame("flight2/park_01"),
            &opts,
            &FrameFilter::Fuse(&inventory),
            &mut detector,
        )
        .unwrap();

        assert_eq!(result.crowns.len(), 1);
        assert_eq!(
            result.output_path,
            dir.path().join("out").join("flight2").join("FUSED_park_01.png")
        );
        assert!(result.output_path.exists());
    }

    #[test]
    fn test_missing_image_is_frame_local() {
        let dir = tempdir().unwrap();
        let inventory = banyan_inventory();
        let mut detector = FixedDetector(Ok(Vec::new()));

        let err = process_frame(
            &frame("absent"),
            &options(dir.path()),
            &FrameFilter::Fuse(&inventory),
            &mut detector,
        )
        .unwrap_err();

        assert!(matches!(err, Error::ImageNotFound { .. }));
        assert!(err.is_frame_local());
    }

    #[test]
    fn test_model_failure_writes_unchanged_image() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("park_02.png");
        RgbImage::from_pixel(20, 20, Rgb([5, 5, 5])).save(&source).unwrap();

        let boundary = BoundaryMask::build([LatLon::new(22.3, 114.17)], 0.0005).unwrap();
        let mut detector = FixedDetector(Err(Error::ModelInference {
            reason: String::new(),
        }));
        let mut opts = options(dir.path());
        opts.prefix = "MASKED".to_string();

        let result = process_frame(
            &frame("park_02"),
            &opts,
            &FrameFilter::Mask(&boundary),
            &mut detector,
        )
        .unwrap();

        assert!(result.crowns.is_empty());
        assert_eq!(
            std::fs::read(&source).unwrap(),
            std::fs::read(&result.output_path).unwrap()
        );
    }

    #[test]
    fn test_matched_crowns_reindexes() {
        let inventory = banyan_inventory();
        let transform = AffineTransform::from_corners(
            100,
            100,
            LatLon::new(22.3010, 114.1710),
            LatLon::new(22.2990, 114.1690),
        )
        .unwrap();
        let geo = vec![
            convert(&Detection::new(PixelBox::new(0.0, 0.0, 5.0, 5.0), 0.7), &transform),
            convert(&Detection::new(PixelBox::new(20.0, 20.0, 80.0, 80.0), 0.9), &transform),
        ];

        let (crowns, matches) = matched_crowns(geo, &inventory);

        assert_eq!(crowns.len(), 1);
        assert_eq!(
            matches,
            vec![
                CrownMatch { crown: 0, record: 0 },
                CrownMatch { crown: 0, record: 1 },
            ]
        );
    }
}
